//! Garbage collection entry points for the Runtime.

use crate::core::{ObjectId, Value};
use crate::Runtime;

impl Runtime {
    /// Everything the collector treats as live: the value stack, every
    /// frame's scope, the in-flight exception and pinned temporaries.
    fn collect_gc_roots(&self) -> (Vec<Value>, Vec<ObjectId>) {
        let mut roots: Vec<Value> =
            Vec::with_capacity(self.stack.len() + self.gc_temp_roots.len() + 1);
        roots.extend_from_slice(self.stack.as_slice());
        roots.extend_from_slice(&self.gc_temp_roots);
        roots.extend(self.thrown);
        let mut scopes: Vec<ObjectId> = self.frames.iter().map(|f| f.scope).collect();
        scopes.push(self.top_scope);
        (roots, scopes)
    }

    fn collect(&mut self) {
        let before = self.heap.size();
        let (roots, scopes) = self.collect_gc_roots();
        self.heap.mark_all(&roots, &scopes);
        let freed = self.heap.sweep();
        tracing::debug!(
            freed,
            before,
            live_bytes = self.heap.size(),
            threshold = self.heap.threshold,
            "gc cycle"
        );
    }

    /// Collect if enabled and the heap has grown past its threshold.
    #[inline]
    pub(crate) fn check_gc(&mut self) {
        if self.heap.should_gc() {
            self.collect();
        }
    }

    /// Force a full collection unless collection is currently disabled.
    pub fn gc(&mut self) {
        if self.heap.is_enabled() {
            self.collect();
        }
    }

    pub fn disable_gc(&mut self) {
        self.heap.disable();
    }

    /// Undo one `disable_gc`; when collection becomes enabled again the
    /// threshold is checked immediately.
    pub fn enable_gc(&mut self) {
        if self.heap.enable() {
            self.check_gc();
        }
    }
}
