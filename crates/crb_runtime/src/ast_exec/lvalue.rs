//! Assignment targets: variables, array elements and record members.

use crb_ir::{AssignExpr, Expr, ExprKind, IncDecOp, Name};
use crb_syntax::DiagnosticKind;

use crate::core::heap::SlotRef;
use crate::core::{Value, scope};
use crate::errors::ExecOutcome;
use crate::Runtime;

/// A resolved assignment target.
///
/// Element and member targets keep their container on the value stack
/// until the assignment completes; `pinned` says how many values that is.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LValue {
    Var(SlotRef),
    /// Array and index sit on the stack; the index is checked again on
    /// every access since evaluating the right-hand side may resize the
    /// array.
    Element,
    Member(SlotRef),
}

impl LValue {
    fn pinned(self) -> usize {
        match self {
            LValue::Var(_) => 0,
            LValue::Member(_) => 1,
            LValue::Element => 2,
        }
    }
}

impl Runtime {
    /// The slot `name` denotes in the current scope, created there when no
    /// visible binding exists.
    pub(crate) fn variable_slot(&mut self, name: &Name) -> SlotRef {
        let scope = self.current_scope();
        match scope::resolve(&mut self.heap, scope, self.top_scope, name, true) {
            Some(slot) => slot,
            None => unreachable!("resolve with create always yields a slot"),
        }
    }

    /// Resolve `target`, creating a missing variable or member.
    fn eval_lvalue(&mut self, target: &Expr) -> ExecOutcome<LValue> {
        match &target.kind {
            ExprKind::Ident(name) => Ok(LValue::Var(self.variable_slot(name))),
            ExprKind::Index(index) => {
                self.eval_expr(&index.array)?;
                self.eval_expr(&index.index)?;
                self.element_position(self.stack.peek(1), self.stack.peek(0), target.line)?;
                Ok(LValue::Element)
            }
            ExprKind::Member(member) => {
                self.eval_expr(&member.object)?;
                let Value::Record(record) = self.stack.peek(0) else {
                    return Err(self
                        .error(DiagnosticKind::MemberOperationNotAssoc, target.line)
                        .into());
                };
                match self.heap.record_slot(record, &member.member, true) {
                    Some(slot) => Ok(LValue::Member(slot)),
                    None => unreachable!("record_slot with create always yields a slot"),
                }
            }
            _ => Err(self.error(DiagnosticKind::NotLvalue, target.line).into()),
        }
    }

    /// Read the target. `above` counts stack values pushed after the target
    /// was resolved.
    fn load(&self, place: LValue, above: usize, line: u32) -> ExecOutcome<Value> {
        match place {
            LValue::Var(slot) | LValue::Member(slot) => Ok(self.heap.slot(slot)),
            LValue::Element => {
                let (array, position) = self.element_position(
                    self.stack.peek(above + 1),
                    self.stack.peek(above),
                    line,
                )?;
                Ok(self.heap.array(array)[position])
            }
        }
    }

    fn store(&mut self, place: LValue, above: usize, value: Value, line: u32) -> ExecOutcome<()> {
        match place {
            LValue::Var(slot) | LValue::Member(slot) => self.heap.set_slot(slot, value),
            LValue::Element => {
                let (array, position) = self.element_position(
                    self.stack.peek(above + 1),
                    self.stack.peek(above),
                    line,
                )?;
                self.heap.with_array(array, |items| items[position] = value);
            }
        }
        Ok(())
    }

    /// `target = value` and the compound forms. The target is resolved once;
    /// a compound assignment reads it after the right-hand side has run.
    pub(crate) fn eval_assign(&mut self, assign: &AssignExpr, line: u32) -> ExecOutcome<()> {
        let place = self.eval_lvalue(&assign.target)?;
        self.eval_expr(&assign.value)?;
        let rhs = self.stack.peek(0);
        let value = match assign.op.binary() {
            None => rhs,
            Some(op) => {
                let current = self.load(place, 1, line)?;
                self.binary_values(op, current, rhs, line)?
            }
        };
        self.store(place, 1, value, line)?;
        self.stack.shrink(place.pinned() + 1);
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn eval_incdec(
        &mut self,
        op: IncDecOp,
        prefix: bool,
        target: &Expr,
        line: u32,
    ) -> ExecOutcome<()> {
        let place = self.eval_lvalue(target)?;
        let Value::Int(old) = self.load(place, 0, line)? else {
            return Err(self.error(DiagnosticKind::IncDecOperandType, line).into());
        };
        let new = match op {
            IncDecOp::Inc => old.wrapping_add(1),
            IncDecOp::Dec => old.wrapping_sub(1),
        };
        self.store(place, 0, Value::Int(new), line)?;
        self.stack.shrink(place.pinned());
        self.stack.push(Value::Int(if prefix { new } else { old }));
        Ok(())
    }
}
