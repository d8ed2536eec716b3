use crate::core::Value;
use crate::errors::RuntimeError;
use crate::runtime::{CallSite, FrameRef, Runtime};

/// Length in characters.
pub(super) fn length(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("length", argc, 0, site)?;
    let len = match rt.this(frame) {
        Some(Value::Str(id)) => rt.heap.str(id).chars().count(),
        _ => unreachable!("string method bound to a non-string"),
    };
    rt.native_return(argc, Value::Int(len as i64));
    Ok(())
}
