//! Variable resolution over scope chains.

use crb_ir::Name;

use super::heap::{Heap, ObjectId, SlotRef};

/// Look a name up in one scope: its imported globals first, then its own
/// namespace. Creation always targets the namespace.
pub fn search_scope(heap: &mut Heap, scope: ObjectId, name: &Name, create: bool) -> Option<SlotRef> {
    let chain = heap.scope(scope);
    let namespace = chain.namespace;
    for global in &chain.global_refs {
        if **heap.slot_name(*global) == **name {
            return Some(*global);
        }
    }
    heap.record_slot(namespace, name, create)
}

/// Resolve `name` as seen from `scope`.
///
/// Closure scopes walk their enclosing chain; every scope falls back to the
/// top level. A missing name is created in `scope` itself when requested, so
/// new locals never leak into a captured scope.
pub fn resolve(
    heap: &mut Heap,
    scope: ObjectId,
    top_level: ObjectId,
    name: &Name,
    create: bool,
) -> Option<SlotRef> {
    if let Some(slot) = search_scope(heap, scope, name, false) {
        return Some(slot);
    }
    if heap.scope(scope).is_closure {
        let mut cursor = heap.scope(scope).prev;
        while let Some(outer) = cursor {
            if let Some(slot) = search_scope(heap, outer, name, false) {
                return Some(slot);
            }
            cursor = heap.scope(outer).prev;
        }
    }
    if scope != top_level {
        if let Some(slot) = search_scope(heap, top_level, name, false) {
            return Some(slot);
        }
    }
    if create {
        return search_scope(heap, scope, name, true);
    }
    None
}

/// Link the top-level variable `name` into `scope` so reads and writes alias
/// it. Fails when the top level has no such variable.
pub fn import_global(heap: &mut Heap, scope: ObjectId, top_level: ObjectId, name: &Name) -> bool {
    let namespace = heap.scope(top_level).namespace;
    let Some(slot) = heap.record_slot(namespace, name, false) else {
        return false;
    };
    heap.with_scope(scope, |chain| {
        if !chain.global_refs.contains(&slot) {
            chain.global_refs.push(slot);
        }
    });
    true
}

/// Bind `name` directly in the scope's own namespace, shadowing any outer binding.
pub fn define(heap: &mut Heap, scope: ObjectId, name: &Name, value: crate::Value) {
    let namespace = heap.scope(scope).namespace;
    heap.record_set(namespace, name, value);
}
