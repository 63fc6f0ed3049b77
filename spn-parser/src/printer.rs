//! Source printer.
//!
//! Every compound expression is parenthesized, so the printed program parses back to the same tree.

use crate::ast::*;
use crate::visitor::Visitor;

const INDENT: &str = "    ";

/// Prints `program` back to source.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new();
    printer.visit_program(program);
    printer.into_inner()
}

/// Prints a single expression.
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.visit_expr(expr);
    printer.into_inner()
}

#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> String {
        self.out
    }

    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn print_if(&mut self, if_stmt: &IfStmt) {
        let mut if_stmt = if_stmt;
        loop {
            self.out.push_str("if ");
            self.visit_expr(&if_stmt.cond);
            self.out.push(' ');
            self.visit_block(&if_stmt.then_branch);
            match &if_stmt.else_branch {
                Some(ElseBranch::If(nested)) => {
                    self.out.push_str(" else ");
                    if_stmt = nested.as_ref();
                }
                Some(ElseBranch::Block(block)) => {
                    self.out.push_str(" else ");
                    self.visit_block(block);
                    break;
                }
                None => break,
            }
        }
    }

    fn print_params(&mut self, function: &Function) {
        self.out.push('(');
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name);
        }
        self.out.push_str(") ");
        self.visit_block(&function.body);
    }

    fn print_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Nil => self.out.push_str("nil"),
            Literal::Bool(val) => self.out.push_str(if *val { "true" } else { "false" }),
            Literal::Int(val) => self.out.push_str(&val.to_string()),
            Literal::Float(val) if val.is_nan() => self.out.push_str("nan"),
            // overflows back to infinity when lexed
            Literal::Float(val) if val.is_infinite() => self.out.push_str("1e999"),
            Literal::Float(val) => self.out.push_str(&format!("{:?}", val)),
            Literal::Str(val) => self.print_string(val),
        }
    }

    fn print_string(&mut self, val: &str) {
        self.out.push('"');
        for c in val.chars() {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                '\0' => self.out.push_str("\\0"),
                c if c.is_ascii_control() => self.out.push_str(&format!("\\x{:02x}", c as u32)),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

impl<'ast> Visitor<'ast> for Printer {
    fn visit_program(&mut self, program: &'ast Program) {
        for stmt in &program.body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_block(&mut self, block: &'ast Block) {
        self.out.push_str("{\n");
        self.indent += 1;
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        self.indent -= 1;
        self.line_start();
        self.out.push('}');
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        self.line_start();
        match &stmt.kind {
            StmtKind::Empty => self.out.push(';'),
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::Expr(expr) => {
                self.visit_expr(expr);
                self.out.push(';');
            }
            StmtKind::If(if_stmt) => self.print_if(if_stmt),
            StmtKind::While { cond, body } => {
                self.out.push_str("while ");
                self.visit_expr(cond);
                self.out.push(' ');
                self.visit_block(body);
            }
            StmtKind::DoWhile { body, cond } => {
                self.out.push_str("do ");
                self.visit_block(body);
                self.out.push_str(" while ");
                self.visit_expr(cond);
                self.out.push(';');
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.out.push_str("for ");
                self.visit_expr(init);
                self.out.push_str("; ");
                self.visit_expr(cond);
                self.out.push_str("; ");
                self.visit_expr(step);
                self.out.push(' ');
                self.visit_block(body);
            }
            StmtKind::Foreach {
                key,
                value,
                iterable,
                body,
            } => {
                self.out.push_str(&format!("foreach {} as {} in ", key.name, value.name));
                self.visit_expr(iterable);
                self.out.push(' ');
                self.visit_block(body);
            }
            StmtKind::Break => self.out.push_str("break;"),
            StmtKind::Continue => self.out.push_str("continue;"),
            StmtKind::Return(None) => self.out.push_str("return;"),
            StmtKind::Return(Some(expr)) => {
                self.out.push_str("return ");
                self.visit_expr(expr);
                self.out.push(';');
            }
            StmtKind::VarDecl(declarators) => {
                self.out.push_str("var ");
                for (i, declarator) in declarators.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&declarator.name.name);
                    if let Some(init) = &declarator.init {
                        self.out.push_str(" = ");
                        self.visit_expr(init);
                    }
                }
                self.out.push(';');
            }
            StmtKind::Function { name, function } => {
                self.out.push_str(&format!("function {}", name.name));
                self.print_params(function);
            }
        }
        self.out.push('\n');
    }

    fn visit_function(&mut self, function: &'ast Function) {
        self.out.push_str("function ");
        self.print_params(function);
    }

    fn visit_ident(&mut self, ident: &'ast Ident) {
        self.out.push_str(&ident.name);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Literal(literal) => self.print_literal(literal),
            ExprKind::Ident(name) => self.out.push_str(name),
            kind => {
                self.out.push('(');
                self.print_compound(kind);
                self.out.push(')');
            }
        }
    }
}

impl Printer {
    /// Prints an expression that is neither a literal nor an identifier, without its enclosing parentheses.
    fn print_compound(&mut self, kind: &ExprKind) {
        match kind {
            ExprKind::Literal(literal) => self.print_literal(literal),
            ExprKind::Ident(name) => self.out.push_str(name),
            ExprKind::Function(function) => self.visit_function(function),
            ExprKind::Unary { op, operand } if op.is_postfix() => {
                self.visit_expr(operand);
                self.out.push_str(op.symbol());
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.symbol());
                if matches!(op, UnaryOp::Sizeof | UnaryOp::Typeof) {
                    self.out.push(' ');
                }
                self.visit_expr(operand);
            }
            ExprKind::Binary { lhs, op, rhs } => {
                self.visit_expr(lhs);
                self.out.push_str(&format!(" {} ", op.symbol()));
                self.visit_expr(rhs);
            }
            ExprKind::Assign { target, op, value } => {
                self.visit_expr(target);
                self.out.push_str(&format!(" {} ", op.symbol()));
                self.visit_expr(value);
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.visit_expr(cond);
                self.out.push_str(" ? ");
                self.visit_expr(then_expr);
                self.out.push_str(" : ");
                self.visit_expr(else_expr);
            }
            ExprKind::Subscript { object, index } => {
                self.visit_expr(object);
                self.out.push('[');
                self.visit_expr(index);
                self.out.push(']');
            }
            ExprKind::Call { callee, args } => {
                self.visit_expr(callee);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.visit_expr(arg);
                }
                self.out.push(')');
            }
            ExprKind::Member {
                object,
                member,
                access,
            } => {
                self.visit_expr(object);
                self.out.push_str(match access {
                    MemberAccess::Dot => ".",
                    MemberAccess::Arrow => "->",
                });
                self.visit_ident(member);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use insta::assert_snapshot;

    fn reprint(source: &str) -> String {
        print_program(&Parser::new().parse(&source.into()).unwrap())
    }

    #[test]
    fn test_print_expressions() {
        assert_snapshot!(reprint("a = b + c * d;").trim_end(), @"(a = (b + (c * d)));");
        assert_snapshot!(reprint("x = -y++ .. z[0];").trim_end(), @"(x = ((-(y++)) .. (z[0])));");
        assert_snapshot!(reprint("sizeof #1;").trim_end(), @"(sizeof (#1));");
        assert_snapshot!(reprint("o->m(1, nil).n;").trim_end(), @"(((o->m)(1, nil)).n);");
        assert_snapshot!(reprint("c ? 1.5 : nan;").trim_end(), @"(c ? 1.5 : nan);");
        assert_snapshot!(
            reprint(r#"s = "a\"b\\c\n\x01";"#).trim_end(),
            @r#"(s = "a\"b\\c\n\x01");"#
        );
    }

    #[test]
    fn test_print_single_expr() {
        let program = Parser::new().parse(&"f(1e300, 1.0);".into()).unwrap();
        match &program.body[0].kind {
            StmtKind::Expr(expr) => assert_eq!(print_expr(expr), "(f(1e300, 1.0))"),
            kind => panic!("expected expression statement, got {:?}", kind),
        }
    }

    #[test]
    fn test_print_statements() {
        let source = "function f(a, b) { if a { return; } else if b { ; } else { var x = 1, y; } }
            foreach k as v in (function () { return t; })() { continue; }
            do { break; } while x;";
        assert_eq!(
            reprint(source),
            "function f(a, b) {
    if a {
        return;
    } else if b {
        ;
    } else {
        var x = 1, y;
    }
}
foreach k as v in ((function () {
    return t;
})()) {
    continue;
}
do {
    break;
} while x;
"
        );
    }

    #[test]
    fn test_print_for() {
        assert_eq!(
            reprint("for i = 0; i < 10; ++i { }").trim_end(),
            "for (i = 0); (i < 10); (++i) {\n}"
        );
    }
}
