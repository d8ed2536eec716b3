//! Expression and statement trees.
//!
//! Every node carries the source line it came from; the runtime reports
//! errors and builds stack traces from these lines.
use std::rc::Rc;

/// Identifiers and member names are shared with the runtime without copying.
pub type Name = Rc<str>;

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDef {
    /// `None` for anonymous closures.
    pub name: Option<Name>,
    pub params: Box<[Name]>,
    pub body: Box<[Stmt]>,
    pub line: u32,
}

impl FuncDef {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous closure)")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Global(Box<[Name]>),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    For(Box<ForStmt>),
    ForEach(Box<ForEachStmt>),
    Return(Option<Expr>),
    Break,
    Continue,
    Block(Box<[Stmt]>),
    Try(Box<TryStmt>),
    Throw(Expr),
}

/// `if` followed by any number of `elsif` arms, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub branches: Box<[(Expr, Box<[Stmt]>)]>,
    pub else_branch: Option<Box<[Stmt]>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Option<Expr>,
    pub cond: Option<Expr>,
    pub post: Option<Expr>,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForEachStmt {
    pub var: Name,
    pub iter: Expr,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStmt {
    pub body: Box<[Stmt]>,
    pub catch: Option<CatchClause>,
    pub finally: Option<Box<[Stmt]>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub var: Name,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Rc<str>),
    Ident(Name),
    Null,
    Assign(Box<AssignExpr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Minus(Box<Expr>),
    Call(Box<CallExpr>),
    Array(Box<[Expr]>),
    Index(Box<IndexExpr>),
    IncDec {
        op: IncDecOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Member(Box<MemberExpr>),
    Closure(Rc<FuncDef>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignExpr {
    pub op: AssignOp,
    pub target: Expr,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Box<[Expr]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub array: Expr,
    pub index: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub object: Expr,
    pub member: Name,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    /// The binary operator a compound assignment applies.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}
