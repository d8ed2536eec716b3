//! Runtime value representation.
//!
//! A `Value` is small and `Copy`: heap-backed variants only carry an
//! [`ObjectId`], so copying a value never copies the object it refers to.

use super::heap::ObjectId;

/// Index into the runtime's table of closure definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosureId(pub u32);

/// Interned member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// Tag identifying what kind of resource a native pointer refers to.
#[derive(Debug, PartialEq, Eq)]
pub struct NativePointerInfo {
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(ObjectId),
    Array(ObjectId),
    Record(ObjectId),
    Scope(ObjectId),
    Closure {
        func: ClosureId,
        scope: ObjectId,
    },
    /// A method looked up on a string, array or record that is only resolved
    /// against the fake-method table when it is called.
    FakeMethod {
        object: ObjectId,
        method: Symbol,
        line: u32,
    },
    NativePointer {
        info: &'static NativePointerInfo,
        handle: u32,
    },
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The heap object directly referenced by this value, if any.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Str(id) | Value::Array(id) | Value::Record(id) | Value::Scope(id) => Some(*id),
            Value::Closure { scope, .. } => Some(*scope),
            Value::FakeMethod { object, .. } => Some(*object),
            _ => None,
        }
    }

    /// Exception records only count `is_exception` members that are not
    /// `null` or `false`.
    pub fn is_truthy_flag(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_refers_to_its_scope() {
        let v = Value::Closure {
            func: ClosureId(0),
            scope: ObjectId(7),
        };
        assert_eq!(v.object_id(), Some(ObjectId(7)));
        assert_eq!(Value::Int(1).object_id(), None);
    }

    #[test]
    fn values_stay_small() {
        assert!(std::mem::size_of::<Value>() <= 24);
    }
}
