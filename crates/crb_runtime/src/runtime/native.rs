//! Helpers natives use to read arguments and return results.

use std::rc::Rc;

use crb_syntax::DiagnosticKind;

use crate::core::Value;
use crate::errors::RuntimeError;
use crate::{CallSite, FrameRef, Runtime};

impl Runtime {
    /// Argument `index` (0-based, left to right) of a native call with
    /// `arg_count` arguments.
    #[inline]
    pub fn arg(&self, arg_count: usize, index: usize) -> Value {
        assert!(index < arg_count, "argument {index} out of {arg_count}");
        self.stack.peek(arg_count - 1 - index)
    }

    /// Pop a native's arguments and push its result.
    #[inline]
    pub fn native_return(&mut self, arg_count: usize, result: Value) {
        self.stack.shrink(arg_count);
        self.stack.push(result);
    }

    pub fn check_arg_count(
        &self,
        name: &str,
        arg_count: usize,
        expected: usize,
        site: &CallSite,
    ) -> Result<(), RuntimeError> {
        let kind = if arg_count > expected {
            DiagnosticKind::ArgumentTooMany {
                name: name.to_string(),
                expected,
                actual: arg_count,
            }
        } else if arg_count < expected {
            DiagnosticKind::ArgumentTooFew {
                name: name.to_string(),
                expected,
                actual: arg_count,
            }
        } else {
            return Ok(());
        };
        Err(RuntimeError::new(kind, &site.file, site.line))
    }

    /// The receiver a fake method was invoked on.
    pub fn this(&self, frame: FrameRef) -> Option<Value> {
        let scope = self.frames.get(frame.0)?.scope;
        let namespace = self.heap.scope(scope).namespace;
        self.heap.record(namespace).get(THIS)
    }

    pub(crate) fn this_name() -> Rc<str> {
        Rc::from(THIS)
    }
}

pub(crate) const THIS: &str = "this";
