//! Visitor pattern for AST nodes.

use crate::ast::*;

pub trait Visitor<'ast>: Sized {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program);
    }
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }
    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
    fn visit_function(&mut self, function: &'ast Function) {
        walk_function(self, function);
    }
    fn visit_ident(&mut self, _ident: &'ast Ident) {}
}

/// Iteratively visit all statements in a `Vec<Stmt>`.
macro_rules! visit_stmt_list {
    ($visitor: expr, $body: expr) => {
        for stmt in $body {
            Visitor::visit_stmt($visitor, stmt);
        }
    };
}

pub fn walk_program<'ast>(visitor: &mut impl Visitor<'ast>, program: &'ast Program) {
    visit_stmt_list!(visitor, &program.body);
}

pub fn walk_block<'ast>(visitor: &mut impl Visitor<'ast>, block: &'ast Block) {
    visit_stmt_list!(visitor, &block.stmts);
}

pub fn walk_function<'ast>(visitor: &mut impl Visitor<'ast>, function: &'ast Function) {
    for param in &function.params {
        visitor.visit_ident(param);
    }
    visitor.visit_block(&function.body);
}

pub fn walk_stmt<'ast>(visitor: &mut impl Visitor<'ast>, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Empty | StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Block(block) => visitor.visit_block(block),
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::If(if_stmt) => {
            // else-if chains are walked in a loop
            let mut if_stmt = if_stmt;
            loop {
                visitor.visit_expr(&if_stmt.cond);
                visitor.visit_block(&if_stmt.then_branch);
                match &if_stmt.else_branch {
                    Some(ElseBranch::If(nested)) => if_stmt = nested.as_ref(),
                    Some(ElseBranch::Block(block)) => {
                        visitor.visit_block(block);
                        break;
                    }
                    None => break,
                }
            }
        }
        StmtKind::While { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_block(body);
        }
        StmtKind::DoWhile { body, cond } => {
            visitor.visit_block(body);
            visitor.visit_expr(cond);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            visitor.visit_expr(init);
            visitor.visit_expr(cond);
            visitor.visit_expr(step);
            visitor.visit_block(body);
        }
        StmtKind::Foreach {
            key,
            value,
            iterable,
            body,
        } => {
            visitor.visit_ident(key);
            visitor.visit_ident(value);
            visitor.visit_expr(iterable);
            visitor.visit_block(body);
        }
        StmtKind::Return(expr) => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
        StmtKind::VarDecl(declarators) => {
            for declarator in declarators {
                visitor.visit_ident(&declarator.name);
                if let Some(init) = &declarator.init {
                    visitor.visit_expr(init);
                }
            }
        }
        StmtKind::Function { name, function } => {
            visitor.visit_ident(name);
            visitor.visit_function(function);
        }
    }
}

pub fn walk_expr<'ast>(visitor: &mut impl Visitor<'ast>, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident(_) => {}
        ExprKind::Function(function) => visitor.visit_function(function),
        ExprKind::Unary { op: _, operand } => visitor.visit_expr(operand),
        ExprKind::Binary { lhs, op: _, rhs } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        ExprKind::Assign {
            target,
            op: _,
            value,
        } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then_expr);
            visitor.visit_expr(else_expr);
        }
        ExprKind::Subscript { object, index } => {
            visitor.visit_expr(object);
            visitor.visit_expr(index);
        }
        ExprKind::Call { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Member {
            object,
            member,
            access: _,
        } => {
            visitor.visit_expr(object);
            visitor.visit_ident(member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[derive(Default)]
    struct IdentCollector<'ast> {
        idents: Vec<&'ast str>,
    }

    impl<'ast> Visitor<'ast> for IdentCollector<'ast> {
        fn visit_expr(&mut self, expr: &'ast Expr) {
            if let ExprKind::Ident(name) = &expr.kind {
                self.idents.push(name);
            }
            walk_expr(self, expr);
        }

        fn visit_ident(&mut self, ident: &'ast Ident) {
            self.idents.push(&ident.name);
        }
    }

    #[test]
    fn test_visit_order() {
        let program = Parser::new()
            .parse(
                &"function f(a) { return a.b; }
                  if x { y; } else if z { w; } else { v; }
                  foreach k as v in t { g(k, v); }"
                    .into(),
            )
            .unwrap();

        let mut collector = IdentCollector::default();
        collector.visit_program(&program);
        assert_eq!(
            collector.idents,
            ["f", "a", "a", "b", "x", "y", "z", "w", "v", "k", "v", "t", "g", "k", "v"]
        );
    }
}
