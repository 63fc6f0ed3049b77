//! Uniform node view of the syntax tree.
//!
//! Every [`Node`] has the same shape: a kind, a line, up to two children, an optional name and an optional literal
//! value. Sequences are encoded as cons cells. A [`Node`] tree is built from the typed AST with [`From`]:
//!
//! - statement lists: a left-nested `COMPOUND` chain whose top cell is retagged `PROGRAM` or `BLOCK`; a single
//!   statement is wrapped instead, an empty block is `EMPTY` and an empty program is a childless `PROGRAM`;
//! - `IF(cond, BRANCHES(then, else?))` and `CONDEXPR(cond, BRANCHES(then, else))`;
//! - `WHILE(cond, body)` and `DO(cond, body)`;
//! - `FOR`/`FOREACH(FORHEADER(a, FORHEADER(b, FORHEADER(c))), body)`;
//! - `VARDECL` chains linked through `right`, `DECLARGS` chains linked through `left`;
//! - call arguments as `CALLARGS(previous_cell?, arg)`, the last argument outermost.

use std::fmt;

use crate::ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // structural
    Program,
    Block,
    Compound,
    Empty,
    Branches,
    ForHeader,
    CallArgs,
    DeclArgs,
    VarDecl,
    // statements
    If,
    While,
    Do,
    For,
    Foreach,
    Break,
    Continue,
    Return,
    FuncStmt,
    FuncExpr,
    // binary
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,
    AssignAnd,
    AssignOr,
    AssignXor,
    AssignShl,
    AssignShr,
    AssignConcat,
    Concat,
    CondExpr,
    LogOr,
    LogAnd,
    Equal,
    NotEq,
    Less,
    Greater,
    Leq,
    Geq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // prefix
    PreIncrmt,
    PreDecrmt,
    UnPlus,
    UnMinus,
    LogNot,
    BitNot,
    Sizeof,
    Typeof,
    NthArg,
    // postfix and primary
    PostIncrmt,
    PostDecrmt,
    ArrSub,
    FuncCall,
    MemberOf,
    Ident,
    Literal,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Program => "PROGRAM",
            NodeKind::Block => "BLOCK",
            NodeKind::Compound => "COMPOUND",
            NodeKind::Empty => "EMPTY",
            NodeKind::Branches => "BRANCHES",
            NodeKind::ForHeader => "FORHEADER",
            NodeKind::CallArgs => "CALLARGS",
            NodeKind::DeclArgs => "DECLARGS",
            NodeKind::VarDecl => "VARDECL",
            NodeKind::If => "IF",
            NodeKind::While => "WHILE",
            NodeKind::Do => "DO",
            NodeKind::For => "FOR",
            NodeKind::Foreach => "FOREACH",
            NodeKind::Break => "BREAK",
            NodeKind::Continue => "CONTINUE",
            NodeKind::Return => "RETURN",
            NodeKind::FuncStmt => "FUNCSTMT",
            NodeKind::FuncExpr => "FUNCEXPR",
            NodeKind::Assign => "ASSIGN",
            NodeKind::AssignAdd => "ASSIGN_ADD",
            NodeKind::AssignSub => "ASSIGN_SUB",
            NodeKind::AssignMul => "ASSIGN_MUL",
            NodeKind::AssignDiv => "ASSIGN_DIV",
            NodeKind::AssignMod => "ASSIGN_MOD",
            NodeKind::AssignAnd => "ASSIGN_AND",
            NodeKind::AssignOr => "ASSIGN_OR",
            NodeKind::AssignXor => "ASSIGN_XOR",
            NodeKind::AssignShl => "ASSIGN_SHL",
            NodeKind::AssignShr => "ASSIGN_SHR",
            NodeKind::AssignConcat => "ASSIGN_CONCAT",
            NodeKind::Concat => "CONCAT",
            NodeKind::CondExpr => "CONDEXPR",
            NodeKind::LogOr => "LOGOR",
            NodeKind::LogAnd => "LOGAND",
            NodeKind::Equal => "EQUAL",
            NodeKind::NotEq => "NOTEQ",
            NodeKind::Less => "LESS",
            NodeKind::Greater => "GREATER",
            NodeKind::Leq => "LEQ",
            NodeKind::Geq => "GEQ",
            NodeKind::BitOr => "BITOR",
            NodeKind::BitXor => "BITXOR",
            NodeKind::BitAnd => "BITAND",
            NodeKind::Shl => "SHL",
            NodeKind::Shr => "SHR",
            NodeKind::Add => "ADD",
            NodeKind::Sub => "SUB",
            NodeKind::Mul => "MUL",
            NodeKind::Div => "DIV",
            NodeKind::Mod => "MOD",
            NodeKind::PreIncrmt => "PREINCRMT",
            NodeKind::PreDecrmt => "PREDECRMT",
            NodeKind::UnPlus => "UNPLUS",
            NodeKind::UnMinus => "UNMINUS",
            NodeKind::LogNot => "LOGNOT",
            NodeKind::BitNot => "BITNOT",
            NodeKind::Sizeof => "SIZEOF",
            NodeKind::Typeof => "TYPEOF",
            NodeKind::NthArg => "NTHARG",
            NodeKind::PostIncrmt => "POSTINCRMT",
            NodeKind::PostDecrmt => "POSTDECRMT",
            NodeKind::ArrSub => "ARRSUB",
            NodeKind::FuncCall => "FUNCCALL",
            NodeKind::MemberOf => "MEMBEROF",
            NodeKind::Ident => "IDENT",
            NodeKind::Literal => "LITERAL",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl UnaryOp {
    pub fn node_kind(self) -> NodeKind {
        match self {
            UnaryOp::PreIncrement => NodeKind::PreIncrmt,
            UnaryOp::PreDecrement => NodeKind::PreDecrmt,
            UnaryOp::Plus => NodeKind::UnPlus,
            UnaryOp::Minus => NodeKind::UnMinus,
            UnaryOp::LogicalNot => NodeKind::LogNot,
            UnaryOp::BitNot => NodeKind::BitNot,
            UnaryOp::Sizeof => NodeKind::Sizeof,
            UnaryOp::Typeof => NodeKind::Typeof,
            UnaryOp::NthArg => NodeKind::NthArg,
            UnaryOp::PostIncrement => NodeKind::PostIncrmt,
            UnaryOp::PostDecrement => NodeKind::PostDecrmt,
        }
    }
}

impl BinaryOp {
    pub fn node_kind(self) -> NodeKind {
        match self {
            BinaryOp::Concat => NodeKind::Concat,
            BinaryOp::LogicalOr => NodeKind::LogOr,
            BinaryOp::LogicalAnd => NodeKind::LogAnd,
            BinaryOp::Equal => NodeKind::Equal,
            BinaryOp::NotEqual => NodeKind::NotEq,
            BinaryOp::Less => NodeKind::Less,
            BinaryOp::Greater => NodeKind::Greater,
            BinaryOp::LessEqual => NodeKind::Leq,
            BinaryOp::GreaterEqual => NodeKind::Geq,
            BinaryOp::BitOr => NodeKind::BitOr,
            BinaryOp::BitXor => NodeKind::BitXor,
            BinaryOp::BitAnd => NodeKind::BitAnd,
            BinaryOp::ShiftLeft => NodeKind::Shl,
            BinaryOp::ShiftRight => NodeKind::Shr,
            BinaryOp::Add => NodeKind::Add,
            BinaryOp::Sub => NodeKind::Sub,
            BinaryOp::Mul => NodeKind::Mul,
            BinaryOp::Div => NodeKind::Div,
            BinaryOp::Mod => NodeKind::Mod,
        }
    }
}

impl AssignOp {
    pub fn node_kind(self) -> NodeKind {
        match self {
            AssignOp::Assign => NodeKind::Assign,
            AssignOp::Add => NodeKind::AssignAdd,
            AssignOp::Sub => NodeKind::AssignSub,
            AssignOp::Mul => NodeKind::AssignMul,
            AssignOp::Div => NodeKind::AssignDiv,
            AssignOp::Mod => NodeKind::AssignMod,
            AssignOp::BitAnd => NodeKind::AssignAnd,
            AssignOp::BitOr => NodeKind::AssignOr,
            AssignOp::BitXor => NodeKind::AssignXor,
            AssignOp::ShiftLeft => NodeKind::AssignShl,
            AssignOp::ShiftRight => NodeKind::AssignShr,
            AssignOp::Concat => NodeKind::AssignConcat,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
    /// Identifier, member, function, declared variable or parameter name.
    pub name: Option<String>,
    /// Only set on `LITERAL` nodes.
    pub value: Option<Literal>,
}

impl Node {
    /// Creates a node without children, name or value.
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            left: None,
            right: None,
            name: None,
            value: None,
        }
    }

    fn with_children(kind: NodeKind, line: usize, left: Option<Node>, right: Option<Node>) -> Self {
        Self {
            left: left.map(Box::new),
            right: right.map(Box::new),
            ..Self::new(kind, line)
        }
    }

    fn named(kind: NodeKind, ident: &Ident) -> Self {
        Self {
            name: Some(ident.name.clone()),
            ..Self::new(kind, ident.line)
        }
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    /// Structural equality ignoring line numbers. NaN literals compare equal to each other.
    pub fn shape_eq(&self, other: &Node) -> bool {
        fn child_eq(a: Option<&Node>, b: Option<&Node>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.shape_eq(b),
                (None, None) => true,
                _ => false,
            }
        }

        let value_eq = match (&self.value, &other.value) {
            (Some(Literal::Float(a)), Some(Literal::Float(b))) => a == b || (a.is_nan() && b.is_nan()),
            (a, b) => a == b,
        };

        self.kind == other.kind
            && self.name == other.name
            && value_eq
            && child_eq(self.left(), other.left())
            && child_eq(self.right(), other.right())
    }
}

/// Renders the node as an S-expression, e.g. `(ADD (IDENT a) (LITERAL 1))`.
/// An absent left child is written `_` when a right child follows.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.kind)?;
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        match &self.value {
            Some(Literal::Nil) => f.write_str(" nil")?,
            Some(Literal::Bool(val)) => write!(f, " {}", val)?,
            Some(Literal::Int(val)) => write!(f, " {}", val)?,
            Some(Literal::Float(val)) => write!(f, " {:?}", val)?,
            Some(Literal::Str(val)) => write!(f, " {:?}", val)?,
            None => {}
        }
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => write!(f, " {} {}", left, right)?,
            (Some(left), None) => write!(f, " {}", left)?,
            (None, Some(right)) => write!(f, " _ {}", right)?,
            (None, None) => {}
        }
        f.write_str(")")
    }
}

/// Folds a statement list into the `COMPOUND` encoding and tags its top with `marker`.
fn lower_stmt_list(marker: NodeKind, line: usize, stmts: &[Stmt]) -> Node {
    let mut stmts = stmts.iter();
    let mut list = match stmts.next() {
        Some(first) => Node::from(first),
        None => return Node::new(marker, line),
    };

    let mut is_compound = false;
    for stmt in stmts {
        list = Node::with_children(NodeKind::Compound, stmt.line, Some(list), Some(Node::from(stmt)));
        is_compound = true;
    }

    if is_compound {
        list.kind = marker;
        list
    } else {
        Node::with_children(marker, line, Some(list), None)
    }
}

fn expr_child(expr: &Expr) -> Option<Node> {
    Some(Node::from(expr))
}

fn lower_for_header(line: usize, first: Node, second: Node, third: Node) -> Node {
    let third = Node::with_children(NodeKind::ForHeader, line, Some(third), None);
    let second = Node::with_children(NodeKind::ForHeader, line, Some(second), Some(third));
    Node::with_children(NodeKind::ForHeader, line, Some(first), Some(second))
}

fn lower_if(if_stmt: &IfStmt) -> Node {
    let else_branch = match &if_stmt.else_branch {
        Some(ElseBranch::Block(block)) => Some(Node::from(block)),
        Some(ElseBranch::If(nested)) => Some(lower_if(nested)),
        None => None,
    };
    let branches = Node::with_children(
        NodeKind::Branches,
        if_stmt.line,
        Some(Node::from(&if_stmt.then_branch)),
        else_branch,
    );
    Node::with_children(NodeKind::If, if_stmt.line, Some(Node::from(&if_stmt.cond)), Some(branches))
}

fn lower_function(kind: NodeKind, name: Option<&Ident>, function: &Function, line: usize) -> Node {
    let params = function.params.iter().rev().fold(None, |next, param| {
        Some(Node {
            left: next.map(Box::new),
            ..Node::named(NodeKind::DeclArgs, param)
        })
    });
    Node {
        name: name.map(|ident| ident.name.clone()),
        ..Node::with_children(kind, line, params, Some(Node::from(&function.body)))
    }
}

impl From<&Program> for Node {
    fn from(program: &Program) -> Self {
        lower_stmt_list(NodeKind::Program, 1, &program.body)
    }
}

impl From<&Block> for Node {
    fn from(block: &Block) -> Self {
        if block.stmts.is_empty() {
            Node::new(NodeKind::Empty, block.line)
        } else {
            lower_stmt_list(NodeKind::Block, block.line, &block.stmts)
        }
    }
}

impl From<&Stmt> for Node {
    fn from(stmt: &Stmt) -> Self {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Empty => Node::new(NodeKind::Empty, line),
            StmtKind::Block(block) => Node::from(block),
            StmtKind::Expr(expr) => Node::from(expr),
            StmtKind::If(if_stmt) => lower_if(if_stmt),
            StmtKind::While { cond, body } => {
                Node::with_children(NodeKind::While, line, Some(cond.into()), Some(body.into()))
            }
            StmtKind::DoWhile { body, cond } => {
                Node::with_children(NodeKind::Do, line, Some(cond.into()), Some(body.into()))
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let header = lower_for_header(line, init.into(), cond.into(), step.into());
                Node::with_children(NodeKind::For, line, Some(header), Some(body.into()))
            }
            StmtKind::Foreach {
                key,
                value,
                iterable,
                body,
            } => {
                let header = lower_for_header(
                    line,
                    Node::named(NodeKind::Ident, key),
                    Node::named(NodeKind::Ident, value),
                    iterable.into(),
                );
                Node::with_children(NodeKind::Foreach, line, Some(header), Some(body.into()))
            }
            StmtKind::Break => Node::new(NodeKind::Break, line),
            StmtKind::Continue => Node::new(NodeKind::Continue, line),
            StmtKind::Return(expr) => {
                Node::with_children(NodeKind::Return, line, expr.as_ref().map(Node::from), None)
            }
            StmtKind::VarDecl(declarators) => declarators
                .iter()
                .rev()
                .fold(None, |next, declarator| {
                    Some(Node {
                        left: declarator.init.as_ref().map(|init| Box::new(Node::from(init))),
                        right: next.map(Box::new),
                        ..Node::named(NodeKind::VarDecl, &declarator.name)
                    })
                })
                .unwrap_or_else(|| Node::new(NodeKind::Empty, line)),
            StmtKind::Function { name, function } => {
                lower_function(NodeKind::FuncStmt, Some(name), function, line)
            }
        }
    }
}

impl From<&Expr> for Node {
    fn from(expr: &Expr) -> Self {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Literal(literal) => Node {
                value: Some(literal.clone()),
                ..Node::new(NodeKind::Literal, line)
            },
            ExprKind::Ident(name) => Node {
                name: Some(name.clone()),
                ..Node::new(NodeKind::Ident, line)
            },
            ExprKind::Function(function) => lower_function(NodeKind::FuncExpr, None, function, line),
            ExprKind::Unary { op, operand } => {
                Node::with_children(op.node_kind(), line, expr_child(operand), None)
            }
            ExprKind::Binary { lhs, op, rhs } => Node::with_children(
                op.node_kind(),
                line,
                expr_child(lhs),
                expr_child(rhs),
            ),
            ExprKind::Assign { target, op, value } => Node::with_children(
                op.node_kind(),
                line,
                expr_child(target),
                expr_child(value),
            ),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let branches = Node::with_children(
                    NodeKind::Branches,
                    line,
                    expr_child(then_expr),
                    expr_child(else_expr),
                );
                Node::with_children(NodeKind::CondExpr, line, expr_child(cond), Some(branches))
            }
            ExprKind::Subscript { object, index } => Node::with_children(
                NodeKind::ArrSub,
                line,
                expr_child(object),
                expr_child(index),
            ),
            ExprKind::Call { callee, args } => {
                let args = args.iter().fold(None, |prev, arg| {
                    Some(Node::with_children(NodeKind::CallArgs, arg.line, prev, Some(arg.into())))
                });
                Node::with_children(NodeKind::FuncCall, line, expr_child(callee), args)
            }
            ExprKind::Member { object, member, .. } => Node::with_children(
                NodeKind::MemberOf,
                line,
                expr_child(object),
                Some(Node::named(NodeKind::Ident, member)),
            ),
        }
    }
}
