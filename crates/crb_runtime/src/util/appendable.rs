use hashbrown::HashSet;

use crate::core::heap::{Heap, ManagedObject};
use crate::core::{ObjectId, Value};

/// Text sinks that know how to render runtime values.
pub trait Appendable {
    fn append_str(&mut self, s: &str);
    fn append_i64(&mut self, i: i64);
    fn append_f64(&mut self, f: f64);
    fn append_bool(&mut self, b: bool);
    fn append_null(&mut self);
    fn append_value(&mut self, v: Value, heap: &Heap);
}

impl Appendable for String {
    fn append_str(&mut self, s: &str) {
        self.push_str(s);
    }

    fn append_i64(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.push_str(buf.format(i));
    }

    /// Six fractional digits, always.
    fn append_f64(&mut self, f: f64) {
        use std::fmt::Write;
        write!(self, "{:.6}", f).ok();
    }

    fn append_bool(&mut self, b: bool) {
        self.push_str(if b { "true" } else { "false" });
    }

    fn append_null(&mut self) {
        self.push_str("null");
    }

    fn append_value(&mut self, v: Value, heap: &Heap) {
        let mut visiting = HashSet::new();
        append_value_impl(self, v, heap, &mut visiting);
    }
}

fn append_value_impl(out: &mut String, v: Value, heap: &Heap, visiting: &mut HashSet<ObjectId>) {
    match v {
        Value::Null => out.append_null(),
        Value::Bool(b) => out.append_bool(b),
        Value::Int(i) => out.append_i64(i),
        Value::Double(f) => out.append_f64(f),
        Value::Str(id) => out.append_str(heap.str(id)),
        Value::Array(id) | Value::Record(id) => {
            // Containers that hold themselves print the inner occurrence as `...`.
            if !visiting.insert(id) {
                out.push_str("...");
                return;
            }
            match heap.get(id) {
                ManagedObject::Array(items) => {
                    out.push('(');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        append_value_impl(out, *item, heap, visiting);
                    }
                    out.push(')');
                }
                ManagedObject::Record(record) => {
                    out.push('{');
                    for (i, member) in record.members.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push(' ');
                        out.push_str(&member.name);
                        out.push_str(" : ");
                        append_value_impl(out, member.value, heap, visiting);
                    }
                    out.push('}');
                }
                other => out.push_str(other.kind_name()),
            }
            visiting.remove(&id);
        }
        Value::Scope(_) => out.push_str("ScopeChain"),
        Value::Closure { .. } => out.push_str("CLOSURE"),
        Value::FakeMethod { .. } => out.push_str("FAKE_METHOD"),
        Value::NativePointer { info, handle } => {
            out.push('(');
            out.push_str(info.name);
            out.push_str(":#");
            out.append_i64(handle as i64);
            out.push(')');
        }
    }
}

/// Render a value the way `print` and string concatenation do.
pub(crate) fn value_to_string(heap: &Heap, v: Value) -> String {
    let mut out = String::new();
    out.append_value(v, heap);
    out
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::core::heap::{RecordObject, StrObject};

    #[test]
    fn scalars_render_like_printf() {
        let heap = Heap::new(1024);
        assert_eq!(value_to_string(&heap, Value::Double(3.0)), "3.000000");
        assert_eq!(value_to_string(&heap, Value::Double(-0.5)), "-0.500000");
        assert_eq!(value_to_string(&heap, Value::Int(-42)), "-42");
        assert_eq!(value_to_string(&heap, Value::Null), "null");
        assert_eq!(value_to_string(&heap, Value::Bool(true)), "true");
    }

    #[test]
    fn containers_render_nested() {
        let mut heap = Heap::new(1024);
        let s = heap.alloc(ManagedObject::Str(StrObject {
            text: Rc::from("x"),
            literal: true,
        }));
        let arr = heap.alloc(ManagedObject::Array(vec![Value::Int(1), Value::Str(s)]));
        let rec = heap.alloc(ManagedObject::Record(RecordObject::default()));
        heap.record_set(rec, &Rc::from("a"), Value::Int(1));
        heap.record_set(rec, &Rc::from("b"), Value::Array(arr));
        assert_eq!(value_to_string(&heap, Value::Array(arr)), "(1, x)");
        assert_eq!(value_to_string(&heap, Value::Record(rec)), "{ a : 1,  b : (1, x)}");
    }

    #[test]
    fn self_reference_is_cut_short() {
        let mut heap = Heap::new(1024);
        let arr = heap.alloc(ManagedObject::Array(Vec::new()));
        heap.array_push(arr, Value::Int(1), 16);
        heap.array_push(arr, Value::Array(arr), 16);
        assert_eq!(value_to_string(&heap, Value::Array(arr)), "(1, ...)");
    }
}
