//! Object heap and mark/sweep collector.
//!
//! Objects live in an arena of slots; freed slots go on a free list and are
//! reused by later allocations. The heap tracks an approximate byte size for
//! every live object, which drives the collection threshold.

use std::collections::TryReserveError;
use std::rc::Rc;

use crb_ir::Name;

use super::value::Value;

/// Handle to a heap-allocated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// A named slot owned by exactly one record.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: Name,
    pub value: Value,
}

/// Position of a variable inside a record.
///
/// Records never remove members, so a slot reference stays valid for as long
/// as the record itself is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub record: ObjectId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct StrObject {
    pub text: Rc<str>,
    /// Literal strings share their text with the syntax tree and do not count
    /// toward the heap size.
    pub literal: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordObject {
    pub members: Vec<Variable>,
}

impl RecordObject {
    pub fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|v| &*v.name == name)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.members
            .iter()
            .find(|v| &*v.name == name)
            .map(|v| v.value)
    }
}

#[derive(Debug, Clone)]
pub struct ScopeChain {
    pub namespace: ObjectId,
    pub global_refs: Vec<SlotRef>,
    pub prev: Option<ObjectId>,
    pub is_closure: bool,
}

#[derive(Debug, Clone)]
pub enum ManagedObject {
    Str(StrObject),
    Array(Vec<Value>),
    Record(RecordObject),
    Scope(ScopeChain),
}

impl ManagedObject {
    /// Bytes charged against the heap for this object.
    pub fn size(&self) -> usize {
        let base = std::mem::size_of::<ManagedObject>();
        let deep = match self {
            ManagedObject::Str(s) if s.literal => 0,
            ManagedObject::Str(s) => s.text.len(),
            ManagedObject::Array(items) => items.capacity() * std::mem::size_of::<Value>(),
            ManagedObject::Record(r) => r.members.len() * std::mem::size_of::<Variable>(),
            ManagedObject::Scope(s) => s.global_refs.len() * std::mem::size_of::<SlotRef>(),
        };
        base + deep
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ManagedObject::Str(_) => "string",
            ManagedObject::Array(_) => "array",
            ManagedObject::Record(_) => "object",
            ManagedObject::Scope(_) => "scope chain",
        }
    }

    /// The value that refers to this object.
    pub fn value_for(&self, id: ObjectId) -> Value {
        match self {
            ManagedObject::Str(_) => Value::Str(id),
            ManagedObject::Array(_) => Value::Array(id),
            ManagedObject::Record(_) => Value::Record(id),
            ManagedObject::Scope(_) => Value::Scope(id),
        }
    }
}

pub struct Heap {
    pub(crate) objects: Vec<Option<ManagedObject>>,
    free_list: Vec<usize>,
    marks: Vec<u64>,
    pub(crate) current_size: usize,
    pub(crate) threshold: usize,
    threshold_step: usize,
    disabled: u32,
}

impl Heap {
    pub fn new(threshold_step: usize) -> Self {
        Self {
            objects: Vec::with_capacity(256),
            free_list: Vec::new(),
            marks: Vec::new(),
            current_size: 0,
            threshold: threshold_step,
            threshold_step,
            disabled: 0,
        }
    }

    /// Place an object in a free slot. Collection is the caller's concern.
    pub fn alloc(&mut self, obj: ManagedObject) -> ObjectId {
        self.current_size += obj.size();
        if let Some(id) = self.free_list.pop() {
            self.objects[id] = Some(obj);
            ObjectId(id)
        } else {
            let id = self.objects.len();
            self.objects.push(Some(obj));
            ObjectId(id)
        }
    }

    pub fn get(&self, id: ObjectId) -> &ManagedObject {
        self.objects[id.0]
            .as_ref()
            .expect("dangling object handle")
    }

    /// Mutate an object, charging any change in its footprint to the heap.
    pub fn update<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut ManagedObject) -> R) -> R {
        let obj = self.objects[id.0]
            .as_mut()
            .expect("dangling object handle");
        let before = obj.size();
        let out = f(obj);
        let after = obj.size();
        self.current_size = self.current_size + after - before;
        out
    }

    pub fn live_objects(&self) -> usize {
        self.objects.iter().filter(|o| o.is_some()).count()
    }

    pub fn size(&self) -> usize {
        self.current_size
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.objects.get(id.0).is_some_and(|o| o.is_some())
    }

    // Typed accessors. A mismatched kind is an evaluator bug.

    pub fn str(&self, id: ObjectId) -> &Rc<str> {
        match self.get(id) {
            ManagedObject::Str(s) => &s.text,
            other => panic!("expected string, found {}", other.kind_name()),
        }
    }

    pub fn array(&self, id: ObjectId) -> &[Value] {
        match self.get(id) {
            ManagedObject::Array(items) => items,
            other => panic!("expected array, found {}", other.kind_name()),
        }
    }

    pub fn record(&self, id: ObjectId) -> &RecordObject {
        match self.get(id) {
            ManagedObject::Record(r) => r,
            other => panic!("expected object, found {}", other.kind_name()),
        }
    }

    pub fn scope(&self, id: ObjectId) -> &ScopeChain {
        match self.get(id) {
            ManagedObject::Scope(s) => s,
            other => panic!("expected scope chain, found {}", other.kind_name()),
        }
    }

    pub fn with_array<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        self.update(id, |obj| match obj {
            ManagedObject::Array(items) => f(items),
            other => panic!("expected array, found {}", other.kind_name()),
        })
    }

    pub fn with_record<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut RecordObject) -> R) -> R {
        self.update(id, |obj| match obj {
            ManagedObject::Record(r) => f(r),
            other => panic!("expected object, found {}", other.kind_name()),
        })
    }

    pub fn with_scope<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut ScopeChain) -> R) -> R {
        self.update(id, |obj| match obj {
            ManagedObject::Scope(s) => f(s),
            other => panic!("expected scope chain, found {}", other.kind_name()),
        })
    }

    // Records

    /// Find a member, appending a null-valued one when `create` is set.
    pub fn record_slot(&mut self, record: ObjectId, name: &Name, create: bool) -> Option<SlotRef> {
        if let Some(index) = self.record(record).position(name) {
            return Some(SlotRef { record, index });
        }
        if !create {
            return None;
        }
        let index = self.with_record(record, |r| {
            r.members.push(Variable {
                name: name.clone(),
                value: Value::Null,
            });
            r.members.len() - 1
        });
        Some(SlotRef { record, index })
    }

    /// Set a member, creating it if absent.
    pub fn record_set(&mut self, record: ObjectId, name: &Name, value: Value) {
        if let Some(slot) = self.record_slot(record, name, true) {
            self.set_slot(slot, value);
        }
    }

    pub fn slot(&self, slot: SlotRef) -> Value {
        self.record(slot.record).members[slot.index].value
    }

    pub fn slot_name(&self, slot: SlotRef) -> &Name {
        &self.record(slot.record).members[slot.index].name
    }

    pub fn set_slot(&mut self, slot: SlotRef, value: Value) {
        match self.objects[slot.record.0].as_mut() {
            Some(ManagedObject::Record(r)) => r.members[slot.index].value = value,
            _ => panic!("slot reference into a non-record"),
        }
    }

    // Arrays

    /// Append, doubling capacity but never reserving more than `step` spare slots.
    pub fn array_push(&mut self, id: ObjectId, value: Value, step: usize) {
        self.with_array(id, |items| {
            if items.len() == items.capacity() {
                let cap = items.capacity();
                let grow = cap.max(1).min(step.max(1));
                items.reserve_exact(grow);
            }
            items.push(value);
        });
    }

    /// Change the logical length, null-filling new slots. Fails without
    /// touching the array when the storage cannot be reserved.
    pub fn array_resize(
        &mut self,
        id: ObjectId,
        new_len: usize,
        step: usize,
    ) -> Result<(), TryReserveError> {
        self.with_array(id, |items| -> Result<(), TryReserveError> {
            let cap = items.capacity();
            if new_len > cap {
                let doubled = cap * 2;
                let target = if doubled < new_len || doubled - new_len > step {
                    new_len.saturating_add(step)
                } else {
                    doubled
                };
                items.try_reserve_exact(target - items.len())?;
                items.resize(new_len, Value::Null);
            } else {
                items.resize(new_len, Value::Null);
                if new_len.saturating_add(step) < cap {
                    items.shrink_to(new_len);
                }
            }
            Ok(())
        })
    }

    pub fn array_insert(&mut self, id: ObjectId, index: usize, value: Value, step: usize) {
        self.with_array(id, |items| {
            if items.len() == items.capacity() {
                let grow = items.capacity().max(1).min(step.max(1));
                items.reserve_exact(grow);
            }
            items.insert(index, value);
        });
    }

    pub fn array_remove(&mut self, id: ObjectId, index: usize) -> Value {
        self.with_array(id, |items| items.remove(index))
    }

    // Collection control

    pub fn disable(&mut self) {
        self.disabled += 1;
    }

    /// Returns true when this call re-enabled collection.
    pub fn enable(&mut self) -> bool {
        debug_assert!(self.disabled > 0, "unbalanced gc enable");
        self.disabled = self.disabled.saturating_sub(1);
        self.disabled == 0
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled == 0
    }

    #[inline]
    pub fn should_gc(&self) -> bool {
        self.disabled == 0 && self.current_size >= self.threshold
    }

    pub fn is_marked(&self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        self.marks.get(word).is_some_and(|w| (w & (1 << bit)) != 0)
    }

    fn set_mark(&mut self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        if word >= self.marks.len() {
            self.marks.resize(word + 1, 0);
        }
        let w = &mut self.marks[word];
        let mask = 1 << bit;
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        true
    }

    /// Mark everything reachable from the given roots.
    pub(crate) fn mark_all(&mut self, roots: &[Value], scopes: &[ObjectId]) {
        self.marks.clear();
        let mut pending: Vec<ObjectId> = Vec::with_capacity(roots.len() + scopes.len());
        pending.extend(roots.iter().filter_map(Value::object_id));
        pending.extend_from_slice(scopes);

        while let Some(id) = pending.pop() {
            if !self.set_mark(id) {
                continue;
            }
            match self.get(id) {
                ManagedObject::Str(_) => {}
                ManagedObject::Array(items) => {
                    pending.extend(items.iter().filter_map(Value::object_id));
                }
                ManagedObject::Record(r) => {
                    pending.extend(r.members.iter().filter_map(|v| v.value.object_id()));
                }
                ManagedObject::Scope(s) => {
                    pending.push(s.namespace);
                    pending.extend(s.global_refs.iter().map(|g| g.record));
                    if let Some(prev) = s.prev {
                        pending.push(prev);
                    }
                }
            }
        }
    }

    /// Free every unmarked object and advance the threshold. Returns the
    /// number of objects freed.
    pub(crate) fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for idx in 0..self.objects.len() {
            if self.objects[idx].is_none() || self.is_marked(ObjectId(idx)) {
                continue;
            }
            if let Some(obj) = self.objects[idx].take() {
                self.current_size -= obj.size();
                self.free_list.push(idx);
                freed += 1;
            }
        }
        self.marks.clear();
        self.threshold = self.current_size + self.threshold_step;
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Rc::from(s)
    }

    #[test]
    fn sweep_frees_unreachable_and_reuses_slots() {
        let mut heap = Heap::new(1024);
        let kept = heap.alloc(ManagedObject::Array(vec![Value::Null; 4]));
        let dropped = heap.alloc(ManagedObject::Record(RecordObject::default()));
        heap.mark_all(&[Value::Array(kept)], &[]);
        assert_eq!(heap.sweep(), 1);
        assert!(heap.is_live(kept));
        assert!(!heap.is_live(dropped));
        let again = heap.alloc(ManagedObject::Record(RecordObject::default()));
        assert_eq!(again, dropped);
    }

    #[test]
    fn marking_tolerates_cycles() {
        let mut heap = Heap::new(1024);
        let rec = heap.alloc(ManagedObject::Record(RecordObject::default()));
        heap.record_set(rec, &name("me"), Value::Record(rec));
        let orphan = heap.alloc(ManagedObject::Record(RecordObject::default()));
        heap.record_set(orphan, &name("me"), Value::Record(orphan));
        heap.mark_all(&[Value::Record(rec)], &[]);
        heap.sweep();
        assert!(heap.is_live(rec));
        assert!(!heap.is_live(orphan));
    }

    #[test]
    fn size_returns_to_zero_after_everything_is_freed() {
        let mut heap = Heap::new(1024);
        let arr = heap.alloc(ManagedObject::Array(Vec::new()));
        for i in 0..100 {
            heap.array_push(arr, Value::Int(i), 1024);
        }
        let rec = heap.alloc(ManagedObject::Record(RecordObject::default()));
        heap.record_set(rec, &name("a"), Value::Array(arr));
        heap.array_resize(arr, 3, 16).unwrap();
        assert!(heap.size() > 0);
        heap.mark_all(&[], &[]);
        heap.sweep();
        assert_eq!(heap.size(), 0);
    }

    #[test]
    fn shrinking_resize_releases_capacity() {
        let mut heap = Heap::new(1 << 20);
        let arr = heap.alloc(ManagedObject::Array(Vec::new()));
        heap.array_resize(arr, 4096, 1024).unwrap();
        let big = heap.size();
        heap.array_resize(arr, 10, 1024).unwrap();
        assert!(heap.size() < big);
        assert_eq!(heap.array(arr).len(), 10);
    }

    #[test]
    fn oversized_resize_fails_and_leaves_array_intact() {
        let mut heap = Heap::new(1 << 20);
        let arr = heap.alloc(ManagedObject::Array(vec![Value::Int(1); 3]));
        let before = heap.size();
        assert!(heap.array_resize(arr, 1 << 60, 1024).is_err());
        assert!(heap.array_resize(arr, usize::MAX, 1024).is_err());
        assert_eq!(heap.array(arr), &[Value::Int(1); 3][..]);
        assert_eq!(heap.size(), before);
    }

    #[test]
    fn threshold_advances_past_live_size() {
        let mut heap = Heap::new(100);
        let arr = heap.alloc(ManagedObject::Array(vec![Value::Null; 64]));
        heap.mark_all(&[Value::Array(arr)], &[]);
        heap.sweep();
        assert_eq!(heap.threshold, heap.size() + 100);
    }

    #[test]
    fn disable_nests() {
        let mut heap = Heap::new(0);
        heap.disable();
        heap.disable();
        assert!(!heap.should_gc());
        assert!(!heap.enable());
        assert!(heap.enable());
        assert!(heap.should_gc());
    }
}
