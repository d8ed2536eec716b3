//! Exception objects: validation, stack-trace capture and rendering.

use std::fmt::Write;

use crb_syntax::DiagnosticKind;
use smallvec::SmallVec;

use crate::core::{ObjectId, Value};
use crate::errors::{ExecOutcome, RuntimeError, Unwind};
use crate::util::value_to_string;
use crate::Runtime;

pub(crate) const IS_EXCEPTION: &str = "is_exception";
pub(crate) const EXCEPTION_MSG: &str = "exception_msg";
pub(crate) const STACK_TRACE_ARRAY: &str = "stack_trace_array";
pub(crate) const FUNC_NAME: &str = "func_name";
pub(crate) const LINE_NUMBER: &str = "line_number";

impl Runtime {
    /// Start unwinding with `exception`, which must be an exception record.
    pub(crate) fn throw_value(&mut self, exception: Value, line: u32) -> ExecOutcome<()> {
        let id = match exception {
            Value::Record(id)
                if self
                    .heap
                    .record(id)
                    .get(IS_EXCEPTION)
                    .is_some_and(|v| v.is_truthy_flag()) =>
            {
                id
            }
            _ => return Err(self.error(DiagnosticKind::ThrowNotExceptionType, line).into()),
        };
        self.thrown = Some(exception);
        self.attach_stack_trace(id, line);
        tracing::trace!(line, depth = self.frames.len(), "throw");
        Err(Unwind::Throw(exception))
    }

    /// Record one entry per active frame, innermost first. An exception that
    /// already carries a trace keeps it.
    fn attach_stack_trace(&mut self, exception: ObjectId, throw_line: u32) {
        let existing = self.heap.record(exception).get(STACK_TRACE_ARRAY);
        if existing.is_some_and(|v| !v.is_null()) {
            return;
        }
        let entries: SmallVec<[(std::rc::Rc<str>, u32); 8]> = self
            .frames
            .iter()
            .rev()
            .map(|f| (f.func_name.clone(), f.caller_line))
            .collect();

        self.disable_gc();
        let trace_id = self.alloc_array(entries.len());
        self.set_member(exception, STACK_TRACE_ARRAY, Value::Array(trace_id));
        let mut line = throw_line;
        for (i, (name, caller_line)) in entries.into_iter().enumerate() {
            let entry_id = self.alloc_record();
            let name_value = self.literal_string(&name);
            self.set_member(entry_id, FUNC_NAME, name_value);
            self.set_member(entry_id, LINE_NUMBER, Value::Int(line as i64));
            self.heap.with_array(trace_id, |items| items[i] = Value::Record(entry_id));
            line = caller_line;
        }
        self.enable_gc();
    }

    /// One `\tbacktrace in function NAME line N` line per trace entry.
    pub(crate) fn render_stack_trace(&self, exception: ObjectId) -> String {
        let mut out = String::new();
        let Some(Value::Array(trace)) = self.heap.record(exception).get(STACK_TRACE_ARRAY) else {
            return out;
        };
        for entry in self.heap.array(trace) {
            let Value::Record(entry) = *entry else {
                continue;
            };
            let record = self.heap.record(entry);
            let name = record
                .get(FUNC_NAME)
                .map(|v| value_to_string(&self.heap, v))
                .unwrap_or_default();
            let line = record.get(LINE_NUMBER).and_then(|v| v.as_int()).unwrap_or(0);
            let _ = writeln!(out, "\tbacktrace in function {} line {}", name, line);
        }
        out
    }

    pub(crate) fn exception_message(&self, exception: ObjectId) -> String {
        self.heap
            .record(exception)
            .get(EXCEPTION_MSG)
            .map(|v| value_to_string(&self.heap, v))
            .unwrap_or_default()
    }

    /// Turn an exception that escaped the top level into an error.
    pub(crate) fn uncaught_exception(&mut self, exception: Value) -> RuntimeError {
        let (message, trace, line) = match exception {
            Value::Record(id) => {
                let line = self
                    .heap
                    .record(id)
                    .get(STACK_TRACE_ARRAY)
                    .and_then(|t| match t {
                        Value::Array(a) => self.heap.array(a).first().copied(),
                        _ => None,
                    })
                    .and_then(|e| self.member(e, LINE_NUMBER))
                    .and_then(|v| v.as_int())
                    .unwrap_or(0);
                (self.exception_message(id), self.render_stack_trace(id), line as u32)
            }
            other => (value_to_string(&self.heap, other), String::new(), 0),
        };
        tracing::debug!(%message, "uncaught exception");
        RuntimeError::new(
            DiagnosticKind::UncaughtException { message, trace },
            &self.frames[0].file,
            line,
        )
    }
}
