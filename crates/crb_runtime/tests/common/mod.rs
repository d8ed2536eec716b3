#![allow(dead_code)]

use crb_ir::build::*;
use crb_ir::{Expr, FuncDef, Program, Stmt};
use crb_runtime::{ExecResult, Runtime, RuntimeConfig, RuntimeError};
use crb_syntax::DiagnosticKind;

/// A runtime that collects before every allocation.
pub fn stress_runtime() -> Runtime {
    Runtime::with_config(RuntimeConfig {
        heap_threshold_step: 0,
        ..RuntimeConfig::default()
    })
}

pub fn exec(program: &Program) -> Result<ExecResult, RuntimeError> {
    let mut rt = Runtime::new();
    exec_in(&mut rt, program)
}

/// Run a program and check the runtime is back to a clean state afterwards.
pub fn exec_in(rt: &mut Runtime, program: &Program) -> Result<ExecResult, RuntimeError> {
    let result = rt.exec_program(program);
    assert_eq!(rt.stack().len(), 0, "value stack not balanced");
    assert_eq!(rt.call_depth(), 1, "call frames not unwound");
    result
}

pub fn run(stmts: Vec<Stmt>) -> Result<ExecResult, RuntimeError> {
    exec(&program(vec![], stmts))
}

pub fn run_with(functions: Vec<FuncDef>, stmts: Vec<Stmt>) -> Result<ExecResult, RuntimeError> {
    exec(&program(functions, stmts))
}

pub fn output(stmts: Vec<Stmt>) -> String {
    run(stmts).expect("program should run").output
}

pub fn output_with(functions: Vec<FuncDef>, stmts: Vec<Stmt>) -> String {
    run_with(functions, stmts).expect("program should run").output
}

pub fn error(stmts: Vec<Stmt>) -> RuntimeError {
    run(stmts).expect_err("program should fail")
}

pub fn error_with(functions: Vec<FuncDef>, stmts: Vec<Stmt>) -> RuntimeError {
    run_with(functions, stmts).expect_err("program should fail")
}

pub fn error_kind(stmts: Vec<Stmt>) -> DiagnosticKind {
    error(stmts).kind
}

// Statement shorthands

pub fn println(value: Expr) -> Stmt {
    expr_stmt(call_named("println", vec![value]))
}

pub fn set(name: &str, value: Expr) -> Stmt {
    expr_stmt(assign(ident(name), value))
}

pub fn new_exception(message: &str) -> Expr {
    call_named("new_exception", vec![string(message)])
}
