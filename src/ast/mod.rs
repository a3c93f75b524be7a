pub mod printer;

use serde::Serialize;

use crate::scanner::token::{Literal, Span, TokenKind};

/// A whole program: the statements between `BEGIN CODE` and `END CODE`.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// The type named in a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DeclaredType {
    Int,
    Float,
    Char,
    Bool,
    String,
}

impl DeclaredType {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Int => Some(Self::Int),
            TokenKind::Float => Some(Self::Float),
            TokenKind::Char => Some(Self::Char),
            TokenKind::Bool => Some(Self::Bool),
            TokenKind::String => Some(Self::String),
            _ => None,
        }
    }

    /// Whether a literal initializer can be stored in a variable of this type.
    pub fn accepts(self, literal: &LiteralValue) -> bool {
        matches!(
            (self, literal),
            (Self::Int, LiteralValue::Int(_))
                | (Self::Float, LiteralValue::Float(_))
                | (Self::Char, LiteralValue::Char(_))
                | (Self::Bool, LiteralValue::Bool(_))
                | (Self::String, LiteralValue::Str(_))
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Expression(ExprStmt),
    Print(PrintStmt),
    Scan(ScanStmt),
    Var(VarDecl),
    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Self::Expression(s) => s.span,
            Self::Print(s) => s.span,
            Self::Scan(s) => s.span,
            Self::Var(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExprStmt {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintStmt {
    pub expression: Expr,
    pub span: Span,
}

/// `SCAN: a, b` binds the fields of one input line to `targets` in order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStmt {
    pub targets: Vec<VariableExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct VarDecl {
    pub name: String,
    /// Location of `name` itself; `span` starts at the shared type keyword.
    pub name_span: Span,
    pub declared_type: DeclaredType,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Literal(LiteralExpr),
    Grouping(GroupingExpr),
    Variable(VariableExpr),
    Assign(AssignExpr),
    Logical(LogicalExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Literal(e) => e.span,
            Self::Grouping(e) => e.span,
            Self::Variable(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Logical(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "&")]
    Concat,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "<>")]
    NotEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "+")]
    Identity,
    #[strum(serialize = "NOT")]
    Not,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Int(i32),
    Float(f64),
    Char(char),
    Str(String),
    Bool(bool),
    Nil,
}

impl LiteralValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "INT",
            Self::Float(_) => "FLOAT",
            Self::Char(_) => "CHAR",
            Self::Str(_) => "STRING",
            Self::Bool(_) => "BOOL",
            Self::Nil => "NIL",
        }
    }
}

impl From<Literal> for LiteralValue {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Int(n) => Self::Int(n),
            Literal::Float(n) => Self::Float(n),
            Literal::Char(c) => Self::Char(c),
            Literal::Str(s) => Self::Str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupingExpr {
    pub expression: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignExpr {
    pub name: String,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogicalExpr {
    pub left: Box<Expr>,
    pub operator: LogicalOp,
    pub right: Box<Expr>,
    pub span: Span,
}
