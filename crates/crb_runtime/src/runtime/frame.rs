//! Call frames and recovery points.

use std::rc::Rc;

use crate::core::heap::{ManagedObject, RecordObject, ScopeChain};
use crate::core::{ObjectId, Value};
use crate::Runtime;

/// One active call. Frames are not heap objects; the scope they hold is.
#[derive(Debug, Clone)]
pub struct Frame {
    pub scope: ObjectId,
    /// Line of the call expression in the caller, used for stack traces.
    pub caller_line: u32,
    pub func_name: Rc<str>,
    /// File errors raised while this frame is active are attributed to.
    pub file: Rc<str>,
}

/// Index of a frame on the call stack, handed to natives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef(pub usize);

/// Where a native was called from.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub file: Rc<str>,
    pub line: u32,
}

/// Stack height and call depth to restore when a `try` catches a throw.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecoveryPoint {
    stack_height: usize,
    frame_depth: usize,
}

impl Runtime {
    /// Allocate a scope chain whose namespace is a fresh record.
    pub(crate) fn new_scope(&mut self, prev: Option<ObjectId>, is_closure: bool) -> ObjectId {
        let namespace = self.alloc(ManagedObject::Record(RecordObject::default()));
        // The namespace is unreachable until the scope exists; keep it on the
        // stack across the second allocation.
        self.stack.push(Value::Record(namespace));
        let scope = self.alloc(ManagedObject::Scope(ScopeChain {
            namespace,
            global_refs: Vec::new(),
            prev,
            is_closure,
        }));
        self.stack.pop();
        scope
    }

    /// Push a frame with a fresh scope. `captured` is the scope a closure was
    /// created in; ordinary calls pass `None`.
    pub(crate) fn enter_call(
        &mut self,
        captured: Option<ObjectId>,
        caller_line: u32,
        func_name: Rc<str>,
        file: Rc<str>,
    ) -> FrameRef {
        let scope = self.new_scope(captured, captured.is_some());
        self.frames.push(Frame {
            scope,
            caller_line,
            func_name,
            file,
        });
        tracing::trace!(
            function = %self.current_frame().func_name,
            depth = self.frames.len(),
            "enter call"
        );
        FrameRef(self.frames.len() - 1)
    }

    pub(crate) fn leave_call(&mut self) {
        assert!(self.frames.len() > 1, "cannot leave the top-level frame");
        self.frames.pop();
    }

    pub fn frame(&self, frame: FrameRef) -> &Frame {
        &self.frames[frame.0]
    }

    pub(crate) fn recovery_point(&self) -> RecoveryPoint {
        RecoveryPoint {
            stack_height: self.stack.len(),
            frame_depth: self.frames.len(),
        }
    }

    pub(crate) fn recover(&mut self, point: RecoveryPoint) {
        self.stack.truncate(point.stack_height);
        self.frames.truncate(point.frame_depth);
    }
}
