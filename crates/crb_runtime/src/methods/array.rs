use crb_syntax::DiagnosticKind;

use crate::core::{ObjectId, Value};
use crate::errors::RuntimeError;
use crate::runtime::{CallSite, FrameRef, Runtime};

fn receiver(rt: &Runtime, frame: FrameRef) -> ObjectId {
    match rt.this(frame) {
        Some(Value::Array(id)) => id,
        _ => unreachable!("array method bound to a non-array"),
    }
}

fn site_error(kind: DiagnosticKind, site: &CallSite) -> RuntimeError {
    RuntimeError::new(kind, &site.file, site.line)
}

/// Checks `index` against `0..=limit` and converts it.
fn position(value: Value, limit: usize, size: usize, site: &CallSite) -> Result<usize, RuntimeError> {
    let Value::Int(index) = value else {
        return Err(site_error(DiagnosticKind::IndexOperandNotInt, site));
    };
    if index < 0 || index as usize > limit {
        return Err(site_error(
            DiagnosticKind::ArrayIndexOutOfBound { size, index },
            site,
        ));
    }
    Ok(index as usize)
}

pub(super) fn add(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("add", argc, 1, site)?;
    let array = receiver(rt, frame);
    let value = rt.arg(argc, 0);
    let step = rt.config.array_alloc_step;
    rt.heap.array_push(array, value, step);
    rt.native_return(argc, Value::Null);
    Ok(())
}

pub(super) fn size(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("size", argc, 0, site)?;
    let len = rt.heap.array(receiver(rt, frame)).len();
    rt.native_return(argc, Value::Int(len as i64));
    Ok(())
}

/// Shrinking truncates; growing fills the new slots with null.
pub(super) fn resize(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("resize", argc, 1, site)?;
    let new_len = match rt.arg(argc, 0) {
        Value::Int(n) if n >= 0 => n as usize,
        _ => return Err(site_error(DiagnosticKind::ArrayResizeArgument, site)),
    };
    let array = receiver(rt, frame);
    let step = rt.config.array_alloc_step;
    rt.heap
        .array_resize(array, new_len, step)
        .map_err(|_| site_error(DiagnosticKind::ArrayResizeArgument, site))?;
    rt.native_return(argc, Value::Null);
    Ok(())
}

/// `insert(index, value)` shifts later elements up by one.
pub(super) fn insert(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("insert", argc, 2, site)?;
    let array = receiver(rt, frame);
    let len = rt.heap.array(array).len();
    let index = position(rt.arg(argc, 0), len, len, site)?;
    let value = rt.arg(argc, 1);
    let step = rt.config.array_alloc_step;
    rt.heap.array_insert(array, index, value, step);
    rt.native_return(argc, Value::Null);
    Ok(())
}

/// `remove(index)` shifts later elements down by one.
pub(super) fn remove(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("remove", argc, 1, site)?;
    let array = receiver(rt, frame);
    let len = rt.heap.array(array).len();
    if len == 0 {
        let index = rt.arg(argc, 0).as_int().unwrap_or(0);
        return Err(site_error(
            DiagnosticKind::ArrayIndexOutOfBound { size: 0, index },
            site,
        ));
    }
    let index = position(rt.arg(argc, 0), len - 1, len, site)?;
    rt.heap.array_remove(array, index);
    rt.native_return(argc, Value::Null);
    Ok(())
}

/// `iterator()` yields a record `{ array : <this>, index : 0 }` that answers
/// the iteration protocol through the record fake methods.
pub(super) fn iterator(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("iterator", argc, 0, site)?;
    let array = receiver(rt, frame);
    let iter = rt.alloc_record();
    rt.set_member(iter, super::record::ITER_ARRAY, Value::Array(array));
    rt.set_member(iter, super::record::ITER_INDEX, Value::Int(0));
    rt.native_return(argc, Value::Record(iter));
    Ok(())
}
