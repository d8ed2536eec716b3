use smallvec::SmallVec;

use crb_syntax::DiagnosticKind;

use crate::core::{ObjectId, Value};
use crate::errors::RuntimeError;
use crate::runtime::{CallSite, FrameRef, Runtime};

pub fn native_print(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("print", argc, 1, site)?;
    let text = rt.display(rt.arg(argc, 0));
    rt.write_output(&text);
    rt.native_return(argc, Value::Null);
    Ok(())
}

pub fn native_println(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("println", argc, 1, site)?;
    let mut text = rt.display(rt.arg(argc, 0));
    text.push('\n');
    rt.write_output(&text);
    rt.native_return(argc, Value::Null);
    Ok(())
}

/// `new_array(d1, d2, ...)` builds nested null-filled arrays.
pub fn native_new_array(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    let mut dims: SmallVec<[usize; 4]> = SmallVec::new();
    for i in 0..argc {
        match rt.arg(argc, i) {
            Value::Int(n) if n >= 0 => dims.push(n as usize),
            _ => {
                return Err(RuntimeError::new(
                    DiagnosticKind::NewArrayArgumentType,
                    &site.file,
                    site.line,
                ));
            }
        }
    }
    let Some(array) = nested_array(rt, &dims) else {
        return Err(RuntimeError::new(
            DiagnosticKind::NewArrayArgumentType,
            &site.file,
            site.line,
        ));
    };
    rt.native_return(argc, Value::Array(array));
    Ok(())
}

// Natives run with collection disabled, so the partially built tree is safe.
// Yields `None` when a dimension is too large to allocate.
fn nested_array(rt: &mut Runtime, dims: &[usize]) -> Option<ObjectId> {
    let Some((&len, rest)) = dims.split_first() else {
        return rt.try_alloc_array(0);
    };
    let array = rt.try_alloc_array(len)?;
    if !rest.is_empty() {
        for i in 0..len {
            let child = nested_array(rt, rest)?;
            rt.heap
                .with_array(array, |items| items[i] = Value::Array(child));
        }
    }
    Some(array)
}

pub fn native_new_object(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("new_object", argc, 0, site)?;
    let record = rt.new_record();
    rt.native_return(argc, record);
    Ok(())
}

/// `new_exception(message)` yields `{ is_exception : true, exception_msg : message }`.
pub fn native_new_exception(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("new_exception", argc, 1, site)?;
    let message = rt.arg(argc, 0);
    if !matches!(message, Value::Str(_)) {
        return Err(RuntimeError::new(
            DiagnosticKind::NativeArgumentType {
                name: "new_exception",
                expected: "a message string",
            },
            &site.file,
            site.line,
        ));
    }
    let record = rt.alloc_record();
    rt.set_member(record, "is_exception", Value::Bool(true));
    rt.set_member(record, "exception_msg", message);
    rt.native_return(argc, Value::Record(record));
    Ok(())
}
