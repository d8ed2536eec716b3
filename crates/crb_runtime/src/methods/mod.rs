//! Fake methods: built-in methods on strings, arrays and records.
//!
//! Member access on these values yields a `FakeMethod` value; the method is
//! looked up here only when that value is called. Each method is an ordinary
//! native that finds its receiver bound to `this`.

use crate::builtins_registry::NativeFn;
use crate::core::ManagedObject;

mod array;
mod record;
mod string;

pub(crate) fn lookup(receiver: &ManagedObject, name: &str) -> Option<NativeFn> {
    let fun: NativeFn = match (receiver, name) {
        (ManagedObject::Str(_), "length") => string::length,

        (ManagedObject::Array(_), "add") => array::add,
        (ManagedObject::Array(_), "size") => array::size,
        (ManagedObject::Array(_), "resize") => array::resize,
        (ManagedObject::Array(_), "insert") => array::insert,
        (ManagedObject::Array(_), "remove") => array::remove,
        (ManagedObject::Array(_), "iterator") => array::iterator,

        (ManagedObject::Record(_), "print_stack_trace") => record::print_stack_trace,
        (ManagedObject::Record(_), "is_done") => record::is_done,
        (ManagedObject::Record(_), "current_item") => record::current_item,
        (ManagedObject::Record(_), "next") => record::next,
        _ => return None,
    };
    Some(fun)
}
