use crb_ir::{Expr, ExprKind, LogicalOp, Name};
use crb_syntax::DiagnosticKind;

use crate::core::{ObjectId, Value, scope};
use crate::errors::ExecOutcome;
use crate::Runtime;

impl Runtime {
    /// Evaluate `expr`, leaving its value on top of the stack.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> ExecOutcome<()> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Bool(b) => self.stack.push(Value::Bool(*b)),
            ExprKind::Int(i) => self.stack.push(Value::Int(*i)),
            ExprKind::Double(d) => self.stack.push(Value::Double(*d)),
            ExprKind::Null => self.stack.push(Value::Null),
            ExprKind::Str(text) => {
                let v = self.literal_string(text);
                self.stack.push(v);
            }
            ExprKind::Ident(name) => {
                let v = self.read_variable(name, line)?;
                self.stack.push(v);
            }
            ExprKind::Assign(assign) => self.eval_assign(assign, line)?,
            ExprKind::Binary { op, left, right } => {
                self.eval_expr(left)?;
                self.eval_expr(right)?;
                let v = self.binary_values(*op, self.stack.peek(1), self.stack.peek(0), line)?;
                self.stack.shrink(2);
                self.stack.push(v);
            }
            ExprKind::Logical { op, left, right } => {
                let v = self.eval_logical(*op, left, right)?;
                self.stack.push(Value::Bool(v));
            }
            ExprKind::Not(operand) => {
                self.eval_expr(operand)?;
                let Some(b) = self.stack.peek(0).as_bool() else {
                    return Err(self.error(DiagnosticKind::NotBooleanForNot, line).into());
                };
                self.stack.replace_top(Value::Bool(!b));
            }
            ExprKind::Minus(operand) => {
                self.eval_expr(operand)?;
                let v = match self.stack.peek(0) {
                    Value::Int(i) => Value::Int(i.wrapping_neg()),
                    Value::Double(d) => Value::Double(-d),
                    _ => return Err(self.error(DiagnosticKind::MinusOperandType, line).into()),
                };
                self.stack.replace_top(v);
            }
            ExprKind::Call(call) => self.eval_call(call, line)?,
            ExprKind::Array(items) => {
                for item in items.iter() {
                    self.eval_expr(item)?;
                }
                // Elements stay on the stack until the array holds them.
                let elements = self.stack.top(items.len()).to_vec();
                let array = self.array_from(elements);
                self.stack.shrink(items.len());
                self.stack.push(array);
            }
            ExprKind::Index(index) => {
                self.eval_expr(&index.array)?;
                self.eval_expr(&index.index)?;
                let (array, position) = self.element_position(
                    self.stack.peek(1),
                    self.stack.peek(0),
                    line,
                )?;
                let v = self.heap.array(array)[position];
                self.stack.shrink(2);
                self.stack.push(v);
            }
            ExprKind::IncDec {
                op,
                prefix,
                target,
            } => self.eval_incdec(*op, *prefix, target, line)?,
            ExprKind::Member(member) => {
                self.eval_expr(&member.object)?;
                let v = self.member_value(self.stack.peek(0), &member.member, line)?;
                self.stack.replace_top(v);
            }
            ExprKind::Closure(def) => {
                let func = self.closure_id(def);
                let scope = self.current_scope();
                self.stack.push(Value::Closure { func, scope });
            }
        }
        Ok(())
    }

    /// Evaluate `expr` and pop the result. Heap values returned this way are
    /// no longer rooted.
    pub(crate) fn eval_value(&mut self, expr: &Expr) -> ExecOutcome<Value> {
        self.eval_expr(expr)?;
        Ok(self.stack.pop())
    }

    /// Evaluate a condition that must produce a boolean.
    pub(crate) fn eval_condition(&mut self, expr: &Expr) -> ExecOutcome<bool> {
        match self.eval_value(expr)? {
            Value::Bool(b) => Ok(b),
            _ => Err(self.error(DiagnosticKind::NotBooleanType, expr.line).into()),
        }
    }

    fn eval_logical(&mut self, op: LogicalOp, left: &Expr, right: &Expr) -> ExecOutcome<bool> {
        let l = self.eval_condition(left)?;
        match (op, l) {
            (LogicalOp::And, false) => Ok(false),
            (LogicalOp::Or, true) => Ok(true),
            _ => self.eval_condition(right),
        }
    }

    fn read_variable(&mut self, name: &Name, line: u32) -> ExecOutcome<Value> {
        let scope = self.current_scope();
        match scope::resolve(&mut self.heap, scope, self.top_scope, name, false) {
            Some(slot) => Ok(self.heap.slot(slot)),
            None => Err(self
                .error(DiagnosticKind::VariableNotFound(name.to_string()), line)
                .into()),
        }
    }

    /// Check an `array[index]` pair and return the element position.
    pub(crate) fn element_position(
        &self,
        array: Value,
        index: Value,
        line: u32,
    ) -> ExecOutcome<(ObjectId, usize)> {
        let Value::Array(array) = array else {
            return Err(self.error(DiagnosticKind::IndexOperandNotArray, line).into());
        };
        let Value::Int(index) = index else {
            return Err(self.error(DiagnosticKind::IndexOperandNotInt, line).into());
        };
        let size = self.heap.array(array).len();
        match usize::try_from(index) {
            Ok(position) if position < size => Ok((array, position)),
            _ => Err(self
                .error(DiagnosticKind::ArrayIndexOutOfBound { size, index }, line)
                .into()),
        }
    }

    /// `object.name` as a value: a record member when one exists, otherwise a
    /// fake method bound to the object.
    pub(crate) fn member_value(&mut self, object: Value, name: &Name, line: u32) -> ExecOutcome<Value> {
        let id = match object {
            Value::Record(id) => {
                if let Some(v) = self.heap.record(id).get(name) {
                    return Ok(v);
                }
                id
            }
            Value::Str(id) | Value::Array(id) => id,
            _ => return Err(self.error(DiagnosticKind::MemberOperationNotAssoc, line).into()),
        };
        Ok(Value::FakeMethod {
            object: id,
            method: self.intern(name),
            line,
        })
    }
}
