use crb_syntax::DiagnosticKind;

use crate::core::{ObjectId, Value};
use crate::errors::RuntimeError;
use crate::runtime::{CallSite, FrameRef, Runtime};

pub(super) const ITER_ARRAY: &str = "array";
pub(super) const ITER_INDEX: &str = "index";

fn receiver(rt: &Runtime, frame: FrameRef) -> ObjectId {
    match rt.this(frame) {
        Some(Value::Record(id)) => id,
        _ => unreachable!("record method bound to a non-record"),
    }
}

/// Writes the exception message and its backtrace to the runtime output.
pub(super) fn print_stack_trace(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("print_stack_trace", argc, 0, site)?;
    let exception = receiver(rt, frame);
    let mut text = format!("exception: {}\n", rt.exception_message(exception));
    text.push_str(&rt.render_stack_trace(exception));
    text.push('\n');
    rt.write_output(&text);
    rt.native_return(argc, Value::Null);
    Ok(())
}

/// The `(array, index)` pair of an iterator record.
fn iterator_state(rt: &Runtime, iter: ObjectId, site: &CallSite) -> Result<(ObjectId, i64), RuntimeError> {
    let record = rt.heap.record(iter);
    let Some(Value::Array(array)) = record.get(ITER_ARRAY) else {
        return Err(RuntimeError::new(
            DiagnosticKind::NoSuchMember(ITER_ARRAY.to_string()),
            &site.file,
            site.line,
        ));
    };
    let Some(Value::Int(index)) = record.get(ITER_INDEX) else {
        return Err(RuntimeError::new(
            DiagnosticKind::NoSuchMember(ITER_INDEX.to_string()),
            &site.file,
            site.line,
        ));
    };
    Ok((array, index))
}

pub(super) fn is_done(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("is_done", argc, 0, site)?;
    let (array, index) = iterator_state(rt, receiver(rt, frame), site)?;
    let done = index < 0 || index as usize >= rt.heap.array(array).len();
    rt.native_return(argc, Value::Bool(done));
    Ok(())
}

pub(super) fn current_item(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("current_item", argc, 0, site)?;
    let (array, index) = iterator_state(rt, receiver(rt, frame), site)?;
    let items = rt.heap.array(array);
    let Some(item) = usize::try_from(index).ok().and_then(|i| items.get(i)).copied() else {
        return Err(RuntimeError::new(
            DiagnosticKind::ArrayIndexOutOfBound {
                size: items.len(),
                index,
            },
            &site.file,
            site.line,
        ));
    };
    rt.native_return(argc, item);
    Ok(())
}

pub(super) fn next(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("next", argc, 0, site)?;
    let iter = receiver(rt, frame);
    let (_, index) = iterator_state(rt, iter, site)?;
    rt.set_member(iter, ITER_INDEX, Value::Int(index + 1));
    rt.native_return(argc, Value::Null);
    Ok(())
}
