//! Allocation helpers that respect the collection threshold.

use std::rc::Rc;

use crb_ir::Name;

use crate::core::heap::{ManagedObject, RecordObject, StrObject};
use crate::core::{ObjectId, Value};
use crate::Runtime;

impl Runtime {
    /// Allocate an object, collecting first if the threshold was reached.
    ///
    /// Anything the new object will reference must already be reachable from
    /// a root.
    pub(crate) fn alloc(&mut self, obj: ManagedObject) -> ObjectId {
        self.check_gc();
        self.heap.alloc(obj)
    }

    pub fn new_string(&mut self, text: &str) -> Value {
        Value::Str(self.alloc(ManagedObject::Str(StrObject {
            text: Rc::from(text),
            literal: false,
        })))
    }

    /// A string sharing text owned by the syntax tree.
    pub(crate) fn literal_string(&mut self, text: &Rc<str>) -> Value {
        Value::Str(self.alloc(ManagedObject::Str(StrObject {
            text: text.clone(),
            literal: true,
        })))
    }

    pub(crate) fn alloc_array(&mut self, len: usize) -> ObjectId {
        self.alloc(ManagedObject::Array(vec![Value::Null; len]))
    }

    /// A null-filled array of `len` elements, or `None` when that much
    /// storage cannot be reserved.
    pub(crate) fn try_alloc_array(&mut self, len: usize) -> Option<ObjectId> {
        let mut items = Vec::new();
        items.try_reserve_exact(len).ok()?;
        items.resize(len, Value::Null);
        Some(self.alloc(ManagedObject::Array(items)))
    }

    pub(crate) fn array_from(&mut self, items: Vec<Value>) -> Value {
        Value::Array(self.alloc(ManagedObject::Array(items)))
    }

    pub fn new_record(&mut self) -> Value {
        Value::Record(self.alloc_record())
    }

    pub(crate) fn alloc_record(&mut self) -> ObjectId {
        self.alloc(ManagedObject::Record(RecordObject::default()))
    }

    /// Set a record member, creating it when absent.
    pub fn set_member(&mut self, record: ObjectId, name: &str, value: Value) {
        let name: Name = Rc::from(name);
        self.heap.record_set(record, &name, value);
    }
}
