use std::rc::Rc;

use crate::{FuncDef, Stmt};

/// A parsed compilation unit: top-level functions plus the statements run at load.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub file: Rc<str>,
    pub functions: Box<[Rc<FuncDef>]>,
    pub stmts: Box<[Stmt]>,
}

impl Program {
    pub fn new(file: &str, functions: Vec<FuncDef>, stmts: Vec<Stmt>) -> Self {
        Self {
            file: Rc::from(file),
            functions: functions.into_iter().map(Rc::new).collect(),
            stmts: stmts.into_boxed_slice(),
        }
    }
}
