use crb_ir::{ForEachStmt, ForStmt, IfStmt, Name, Stmt, StmtKind, TryStmt, WhileStmt};
use crb_syntax::DiagnosticKind;

use crate::core::{Value, scope};
use crate::errors::{ExecOutcome, Unwind};
use crate::runtime::Flow;
use crate::Runtime;

impl Runtime {
    pub(crate) fn exec_stmts(&mut self, stmts: &[Stmt]) -> ExecOutcome<Flow> {
        for stmt in stmts {
            let flow = self.exec_stmt(stmt)?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> ExecOutcome<Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                self.stack.pop();
                Ok(Flow::Normal)
            }
            StmtKind::Global(names) => self.exec_global(names, stmt.line),
            StmtKind::If(s) => self.exec_if(s),
            StmtKind::While(s) => self.exec_while(s),
            StmtKind::For(s) => self.exec_for(s),
            StmtKind::ForEach(s) => self.exec_foreach(s, stmt.line),
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_value(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Block(stmts) => self.exec_stmts(stmts),
            StmtKind::Try(s) => self.exec_try(s),
            StmtKind::Throw(expr) => {
                // The exception stays on the stack until `thrown` holds it.
                self.eval_expr(expr)?;
                let exception = self.stack.peek(0);
                let outcome = self.throw_value(exception, stmt.line);
                self.stack.pop();
                outcome?;
                unreachable!("throw_value always unwinds")
            }
        }
    }

    fn exec_global(&mut self, names: &[Name], line: u32) -> ExecOutcome<Flow> {
        let scope = self.current_scope();
        if scope == self.top_scope {
            return Err(self.error(DiagnosticKind::GlobalStatementInTopLevel, line).into());
        }
        for name in names {
            if !scope::import_global(&mut self.heap, scope, self.top_scope, name) {
                return Err(self
                    .error(DiagnosticKind::GlobalVariableNotFound(name.to_string()), line)
                    .into());
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_if(&mut self, s: &IfStmt) -> ExecOutcome<Flow> {
        for (cond, body) in s.branches.iter() {
            if self.eval_condition(cond)? {
                return self.exec_stmts(body);
            }
        }
        match &s.else_branch {
            Some(body) => self.exec_stmts(body),
            None => Ok(Flow::Normal),
        }
    }

    fn exec_while(&mut self, s: &WhileStmt) -> ExecOutcome<Flow> {
        while self.eval_condition(&s.cond)? {
            match self.exec_stmts(&s.body)? {
                Flow::Break => break,
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Continue | Flow::Normal => {}
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_for(&mut self, s: &ForStmt) -> ExecOutcome<Flow> {
        if let Some(init) = &s.init {
            self.eval_expr(init)?;
            self.stack.pop();
        }
        loop {
            if let Some(cond) = &s.cond {
                if !self.eval_condition(cond)? {
                    break;
                }
            }
            match self.exec_stmts(&s.body)? {
                Flow::Break => break,
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Continue | Flow::Normal => {}
            }
            if let Some(post) = &s.post {
                self.eval_expr(post)?;
                self.stack.pop();
            }
        }
        Ok(Flow::Normal)
    }

    /// Drive the iterator protocol over an array. The array and its iterator
    /// stay on the stack for the whole loop.
    fn exec_foreach(&mut self, s: &ForEachStmt, line: u32) -> ExecOutcome<Flow> {
        self.eval_expr(&s.iter)?;
        let array = self.stack.peek(0);
        if !matches!(array, Value::Array(_)) {
            return Err(self.error(DiagnosticKind::ForeachNotArrayType, line).into());
        }
        let iterator = self.call_method(array, "iterator", line)?;
        self.stack.push(iterator);
        let slot = self.variable_slot(&s.var);

        let mut flow = Flow::Normal;
        loop {
            let done = match self.call_method(iterator, "is_done", line)? {
                Value::Bool(b) => b,
                _ => return Err(self.error(DiagnosticKind::NotBooleanType, line).into()),
            };
            if done {
                break;
            }
            let item = self.call_method(iterator, "current_item", line)?;
            self.heap.set_slot(slot, item);
            match self.exec_stmts(&s.body)? {
                Flow::Break => break,
                Flow::Return(v) => {
                    flow = Flow::Return(v);
                    break;
                }
                Flow::Continue | Flow::Normal => {}
            }
            self.call_method(iterator, "next", line)?;
        }
        self.stack.shrink(2);
        Ok(flow)
    }

    fn exec_try(&mut self, s: &TryStmt) -> ExecOutcome<Flow> {
        let point = self.recovery_point();
        let mut outcome = self.exec_stmts(&s.body);

        if let (Err(Unwind::Throw(exception)), Some(catch)) = (&outcome, &s.catch) {
            let exception = *exception;
            self.recover(point);
            let scope = self.current_scope();
            scope::define(&mut self.heap, scope, &catch.var, exception);
            self.thrown = None;
            outcome = self.exec_stmts(&catch.body);
        }
        if let Err(Unwind::Throw(_)) = outcome {
            self.recover(point);
        }

        let Some(finally) = &s.finally else {
            return outcome;
        };
        // Runtime errors end the program without running handlers.
        if let Err(Unwind::Error(_)) = &outcome {
            return outcome;
        }
        let pending = match &outcome {
            Err(Unwind::Throw(v)) | Ok(Flow::Return(v)) => Some(*v),
            _ => None,
        };
        let pinned = self.gc_temp_roots.len();
        self.gc_temp_roots.extend(pending);
        let finished = self.exec_stmts(finally);
        self.gc_temp_roots.truncate(pinned);
        // A throw from `finally` replaces whatever was pending; any other
        // result of the block is discarded.
        finished?;
        if let Err(Unwind::Throw(exception)) = &outcome {
            self.thrown = Some(*exception);
        }
        outcome
    }
}
