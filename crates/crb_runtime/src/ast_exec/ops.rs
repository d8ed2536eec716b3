//! Binary operators over evaluated operands.

use crb_ir::BinaryOp;
use crb_syntax::DiagnosticKind;

use crate::core::Value;
use crate::errors::ExecOutcome;
use crate::util::Appendable;
use crate::Runtime;

impl Runtime {
    /// Combine two operands. Heap operands must be reachable from a root
    /// (normally the value stack) because string concatenation allocates.
    pub(crate) fn binary_values(
        &mut self,
        op: BinaryOp,
        left: Value,
        right: Value,
        line: u32,
    ) -> ExecOutcome<Value> {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => self.int_op(op, a, b, line),
            (Value::Double(a), Value::Double(b)) => Ok(double_op(op, a, b)),
            (Value::Int(a), Value::Double(b)) => Ok(double_op(op, a as f64, b)),
            (Value::Double(a), Value::Int(b)) => Ok(double_op(op, a, b as f64)),
            (Value::Bool(a), Value::Bool(b)) => match op {
                BinaryOp::Eq => Ok(Value::Bool(a == b)),
                BinaryOp::Ne => Ok(Value::Bool(a != b)),
                _ => Err(self
                    .error(DiagnosticKind::NotBooleanOperator(op.symbol().into()), line)
                    .into()),
            },
            (Value::Str(a), _) if op == BinaryOp::Add => {
                let mut text = String::from(&**self.heap.str(a));
                text.append_value(right, &self.heap);
                Ok(self.new_string(&text))
            }
            (Value::Str(a), Value::Str(b)) => {
                if !op.is_comparison() {
                    return Err(self
                        .error(DiagnosticKind::BadOperatorForString(op.symbol().into()), line)
                        .into());
                }
                let ord = self.heap.str(a).cmp(self.heap.str(b));
                Ok(Value::Bool(compare(op, ord)))
            }
            (Value::Null, _) | (_, Value::Null) => {
                let both = left.is_null() && right.is_null();
                match op {
                    BinaryOp::Eq => Ok(Value::Bool(both)),
                    BinaryOp::Ne => Ok(Value::Bool(!both)),
                    _ => Err(self
                        .error(DiagnosticKind::NotNullOperator(op.symbol().into()), line)
                        .into()),
                }
            }
            _ => Err(self
                .error(DiagnosticKind::BadOperandType(op.symbol().into()), line)
                .into()),
        }
    }

    fn int_op(&self, op: BinaryOp, a: i64, b: i64, line: u32) -> ExecOutcome<Value> {
        let v = match op {
            BinaryOp::Add => Value::Int(a.wrapping_add(b)),
            BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
            BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
            BinaryOp::Div | BinaryOp::Mod if b == 0 => {
                return Err(self.error(DiagnosticKind::DivisionByZero, line).into());
            }
            BinaryOp::Div => Value::Int(a.wrapping_div(b)),
            BinaryOp::Mod => Value::Int(a.wrapping_rem(b)),
            _ => Value::Bool(compare(op, a.cmp(&b))),
        };
        Ok(v)
    }
}

fn double_op(op: BinaryOp, a: f64, b: f64) -> Value {
    match op {
        BinaryOp::Add => Value::Double(a + b),
        BinaryOp::Sub => Value::Double(a - b),
        BinaryOp::Mul => Value::Double(a * b),
        BinaryOp::Div => Value::Double(a / b),
        BinaryOp::Mod => Value::Double(a % b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
    }
}

fn compare(op: BinaryOp, ord: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match op {
        BinaryOp::Eq => ord == Equal,
        BinaryOp::Ne => ord != Equal,
        BinaryOp::Gt => ord == Greater,
        BinaryOp::Ge => ord != Less,
        BinaryOp::Lt => ord == Less,
        BinaryOp::Le => ord != Greater,
        _ => unreachable!("arithmetic operator passed to compare"),
    }
}
