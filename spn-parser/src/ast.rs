//! Typed syntax tree produced by [`crate::parser::Parser`].
//!
//! Every node carries the source line of the token that starts it.

/// A whole translation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// A brace-delimited statement list (`{ ... }`).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A lone `;`.
    Empty,
    Block(Block),
    /// An expression followed by `;`.
    Expr(Expr),
    If(IfStmt),
    /// `while cond { ... }`
    While { cond: Expr, body: Block },
    /// `do { ... } while cond;`
    DoWhile { body: Block, cond: Expr },
    /// `for init; cond; step { ... }`. All three header expressions are mandatory.
    For {
        init: Expr,
        cond: Expr,
        step: Expr,
        body: Block,
    },
    /// `foreach key as value in iterable { ... }`
    Foreach {
        key: Ident,
        value: Ident,
        iterable: Expr,
        body: Block,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    /// `var a = 1, b;` with one entry per declarator, in source order.
    VarDecl(Vec<VarDeclarator>),
    /// A named function statement. Only accepted at file scope.
    Function { name: Ident, function: Function },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Block,
    pub else_branch: Option<ElseBranch>,
    pub line: usize,
}

/// `else` may only be followed by a block or by another `if`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(Block),
    If(Box<IfStmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub name: Ident,
    pub init: Option<Expr>,
}

/// Parameter list and body shared by function statements and function expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub params: Vec<Ident>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// An identifier (e.g. `foo`).
    Ident(String),
    /// An anonymous function (e.g. `function (a) { return a; }`).
    Function(Box<Function>),
    /// A prefix or postfix unary expression (e.g. `-a`, `a++`).
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A binary expression (e.g. `1 + 1`).
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
    /// A plain or compound assignment (e.g. `a += 1`).
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    /// `cond ? then_expr : else_expr`
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `object[index]`
    Subscript { object: Box<Expr>, index: Box<Expr> },
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `object.member` or `object->member`
    Member {
        object: Box<Expr>,
        member: Ident,
        access: MemberAccess,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAccess {
    /// `.`
    Dot,
    /// `->`
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PreIncrement,
    PreDecrement,
    Plus,
    Minus,
    LogicalNot,
    BitNot,
    Sizeof,
    Typeof,
    /// `#n`, the n-th argument of the enclosing function.
    NthArg,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::LogicalNot => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Sizeof => "sizeof",
            UnaryOp::Typeof => "typeof",
            UnaryOp::NthArg => "#",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Concat,
    LogicalOr,
    LogicalAnd,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    BitOr,
    BitXor,
    BitAnd,
    ShiftLeft,
    ShiftRight,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Concat => "..",
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Concat,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::ShiftLeft => "<<=",
            AssignOp::ShiftRight => ">>=",
            AssignOp::Concat => "..=",
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize) -> Self {
        Self { kind, line }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Self { kind, line }
    }
}
