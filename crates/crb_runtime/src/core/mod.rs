//! Value model, object heap and scope chains.

pub mod heap;
pub mod scope;
pub mod value;

pub use heap::{Heap, ManagedObject, ObjectId, SlotRef};
pub use value::{ClosureId, NativePointerInfo, Symbol, Value};
