//! Constructors for assembling syntax trees by hand.
//!
//! Nodes start at line 0; chain `.at(line)` to attach a source line.
use std::rc::Rc;

use crate::*;

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, line: 0 }
    }

    pub fn at(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self { kind, line: 0 }
    }

    pub fn at(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}

fn names(list: &[&str]) -> Box<[Name]> {
    list.iter().map(|n| Rc::from(*n)).collect()
}

// Expressions

pub fn boolean(v: bool) -> Expr {
    Expr::new(ExprKind::Bool(v))
}

pub fn int(v: i64) -> Expr {
    Expr::new(ExprKind::Int(v))
}

pub fn double(v: f64) -> Expr {
    Expr::new(ExprKind::Double(v))
}

pub fn string(s: &str) -> Expr {
    Expr::new(ExprKind::Str(Rc::from(s)))
}

pub fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(Rc::from(name)))
}

pub fn null() -> Expr {
    Expr::new(ExprKind::Null)
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    assign_op(AssignOp::Set, target, value)
}

pub fn assign_op(op: AssignOp, target: Expr, value: Expr) -> Expr {
    let line = target.line;
    Expr::new(ExprKind::Assign(Box::new(AssignExpr { op, target, value }))).at(line)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let line = left.line;
    Expr::new(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
    .at(line)
}

pub fn and(left: Expr, right: Expr) -> Expr {
    logical(LogicalOp::And, left, right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    logical(LogicalOp::Or, left, right)
}

fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    let line = left.line;
    Expr::new(ExprKind::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
    .at(line)
}

pub fn not(operand: Expr) -> Expr {
    let line = operand.line;
    Expr::new(ExprKind::Not(Box::new(operand))).at(line)
}

pub fn minus(operand: Expr) -> Expr {
    let line = operand.line;
    Expr::new(ExprKind::Minus(Box::new(operand))).at(line)
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    let line = callee.line;
    Expr::new(ExprKind::Call(Box::new(CallExpr {
        callee,
        args: args.into_boxed_slice(),
    })))
    .at(line)
}

/// `name(args...)` calling a function by name.
pub fn call_named(name: &str, args: Vec<Expr>) -> Expr {
    call(ident(name), args)
}

/// `object.method(args...)`
pub fn method_call(object: Expr, method: &str, args: Vec<Expr>) -> Expr {
    call(member(object, method), args)
}

pub fn array(items: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Array(items.into_boxed_slice()))
}

pub fn index(array: Expr, index: Expr) -> Expr {
    let line = array.line;
    Expr::new(ExprKind::Index(Box::new(IndexExpr { array, index }))).at(line)
}

pub fn member(object: Expr, member: &str) -> Expr {
    let line = object.line;
    Expr::new(ExprKind::Member(Box::new(MemberExpr {
        object,
        member: Rc::from(member),
    })))
    .at(line)
}

fn incdec(op: IncDecOp, prefix: bool, target: Expr) -> Expr {
    let line = target.line;
    Expr::new(ExprKind::IncDec {
        op,
        prefix,
        target: Box::new(target),
    })
    .at(line)
}

pub fn pre_inc(target: Expr) -> Expr {
    incdec(IncDecOp::Inc, true, target)
}

pub fn pre_dec(target: Expr) -> Expr {
    incdec(IncDecOp::Dec, true, target)
}

pub fn post_inc(target: Expr) -> Expr {
    incdec(IncDecOp::Inc, false, target)
}

pub fn post_dec(target: Expr) -> Expr {
    incdec(IncDecOp::Dec, false, target)
}

pub fn closure(name: Option<&str>, params: &[&str], body: Vec<Stmt>) -> Expr {
    Expr::new(ExprKind::Closure(Rc::new(FuncDef {
        name: name.map(Rc::from),
        params: names(params),
        body: body.into_boxed_slice(),
        line: 0,
    })))
}

// Statements

pub fn expr_stmt(expr: Expr) -> Stmt {
    let line = expr.line;
    Stmt::new(StmtKind::Expr(expr)).at(line)
}

pub fn global(list: &[&str]) -> Stmt {
    Stmt::new(StmtKind::Global(names(list)))
}

pub fn if_(cond: Expr, then: Vec<Stmt>) -> Stmt {
    if_chain(vec![(cond, then)], None)
}

pub fn if_else(cond: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt>) -> Stmt {
    if_chain(vec![(cond, then)], Some(otherwise))
}

/// `if` / `elsif` arms in order, then an optional `else`.
pub fn if_chain(branches: Vec<(Expr, Vec<Stmt>)>, else_branch: Option<Vec<Stmt>>) -> Stmt {
    Stmt::new(StmtKind::If(Box::new(IfStmt {
        branches: branches
            .into_iter()
            .map(|(c, b)| (c, b.into_boxed_slice()))
            .collect(),
        else_branch: else_branch.map(Vec::into_boxed_slice),
    })))
}

pub fn while_(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::While(Box::new(WhileStmt {
        cond,
        body: body.into_boxed_slice(),
    })))
}

pub fn for_(init: Option<Expr>, cond: Option<Expr>, post: Option<Expr>, body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::For(Box::new(ForStmt {
        init,
        cond,
        post,
        body: body.into_boxed_slice(),
    })))
}

pub fn foreach(var: &str, iter: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::ForEach(Box::new(ForEachStmt {
        var: Rc::from(var),
        iter,
        body: body.into_boxed_slice(),
    })))
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Stmt::new(StmtKind::Return(value))
}

pub fn brk() -> Stmt {
    Stmt::new(StmtKind::Break)
}

pub fn cont() -> Stmt {
    Stmt::new(StmtKind::Continue)
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::Block(stmts.into_boxed_slice()))
}

pub fn try_(body: Vec<Stmt>, catch: Option<(&str, Vec<Stmt>)>, finally: Option<Vec<Stmt>>) -> Stmt {
    Stmt::new(StmtKind::Try(Box::new(TryStmt {
        body: body.into_boxed_slice(),
        catch: catch.map(|(var, body)| CatchClause {
            var: Rc::from(var),
            body: body.into_boxed_slice(),
        }),
        finally: finally.map(Vec::into_boxed_slice),
    })))
}

pub fn throw(value: Expr) -> Stmt {
    let line = value.line;
    Stmt::new(StmtKind::Throw(value)).at(line)
}

// Definitions

pub fn function(name: &str, params: &[&str], body: Vec<Stmt>) -> FuncDef {
    FuncDef {
        name: Some(Rc::from(name)),
        params: names(params),
        body: body.into_boxed_slice(),
        line: 0,
    }
}

pub fn program(functions: Vec<FuncDef>, stmts: Vec<Stmt>) -> Program {
    Program::new("main.crb", functions, stmts)
}
