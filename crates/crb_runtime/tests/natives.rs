mod common;

use std::path::PathBuf;

use common::*;
use crb_ir::build::*;
use crb_runtime::{
    CallSite, FrameRef, NativeProvider, NativeRegistry, Runtime, RuntimeError, Value,
};
use crb_syntax::DiagnosticKind;
use pretty_assertions::assert_eq;

fn scratch_file(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("crb_natives_{}_{}.txt", std::process::id(), tag));
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn print_and_println() {
    let out = output(vec![
        expr_stmt(call_named("print", vec![string("a")])),
        expr_stmt(call_named("print", vec![int(1)])),
        println(double(2.5)),
        println(boolean(false)),
        println(null()),
    ]);
    assert_eq!(out, "a12.500000\nfalse\nnull\n");
}

#[test]
fn builtin_arity_is_checked() {
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("println", vec![]))]),
        DiagnosticKind::ArgumentTooFew {
            name: "println".into(),
            expected: 1,
            actual: 0
        }
    );
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("print", vec![int(1), int(2)]))]),
        DiagnosticKind::ArgumentTooMany {
            name: "print".into(),
            expected: 1,
            actual: 2
        }
    );
}

#[test]
fn native_errors_carry_the_call_line() {
    let err = error(vec![expr_stmt(call_named("new_object", vec![int(1)]).at(6))]);
    assert_eq!(err.line, 6);
    assert_eq!(err.file, "main.crb");
}

#[test]
fn new_exception_requires_a_string() {
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("new_exception", vec![int(3)]))]),
        DiagnosticKind::NativeArgumentType {
            name: "new_exception",
            expected: "a message string",
        }
    );
    let mut rt = Runtime::new();
    let result = exec_in(&mut rt, &program(vec![], vec![ret(Some(new_exception("msg")))])).unwrap();
    let e = result.value.unwrap();
    assert_eq!(rt.member(e, "is_exception"), Some(Value::Bool(true)));
    let msg = rt.member(e, "exception_msg").unwrap();
    assert_eq!(rt.str_value(msg), Some("msg"));
    assert_eq!(rt.member(e, "missing"), None);
}

#[test]
fn standard_streams_are_file_pointers() {
    let out = output(vec![
        println(ident("STDIN")),
        println(ident("STDOUT")),
        expr_stmt(call_named("fputs", vec![string("to stdout\n"), ident("STDOUT")])),
    ]);
    assert_eq!(
        out,
        "(crowbar.lang.file:#0)\n(crowbar.lang.file:#1)\nto stdout\n"
    );
}

#[test]
fn write_then_read_a_file() {
    let path = scratch_file("roundtrip");
    let p = path.to_string_lossy().into_owned();
    let out = output(vec![
        set("fp", call_named("fopen", vec![string(&p), string("w")])),
        expr_stmt(call_named("fputs", vec![string("first\n"), ident("fp")])),
        expr_stmt(call_named("fputs", vec![string("second\n"), ident("fp")])),
        expr_stmt(call_named("fclose", vec![ident("fp")])),
        set("fp", call_named("fopen", vec![string(&p), string("r")])),
        expr_stmt(call_named("print", vec![call_named("fgets", vec![ident("fp")])])),
        expr_stmt(call_named("print", vec![call_named("fgets", vec![ident("fp")])])),
        println(call_named("fgets", vec![ident("fp")])),
        expr_stmt(call_named("fclose", vec![ident("fp")])),
    ]);
    assert_eq!(out, "first\nsecond\nnull\n");

    output(vec![
        set("fp", call_named("fopen", vec![string(&p), string("a")])),
        expr_stmt(call_named("fputs", vec![string("third\n"), ident("fp")])),
        expr_stmt(call_named("fclose", vec![ident("fp")])),
    ]);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "first\nsecond\nthird\n"
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn fopen_yields_null_on_failure() {
    let missing = scratch_file("missing");
    let p = missing.to_string_lossy().into_owned();
    let out = output(vec![
        println(call_named("fopen", vec![string(&p), string("r")])),
        println(call_named("fopen", vec![string(&p), string("rw+")])),
    ]);
    assert_eq!(out, "null\nnull\n");
}

#[test]
fn file_natives_validate_arguments() {
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("fopen", vec![int(1), string("r")]))]),
        DiagnosticKind::FopenArgumentType
    );
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("fgets", vec![ident("STDOUT")]))]),
        DiagnosticKind::FgetsArgumentType
    );
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("fputs", vec![int(1), ident("STDOUT")]))]),
        DiagnosticKind::FputsArgumentType
    );
    assert_eq!(
        error_kind(vec![expr_stmt(call_named("fclose", vec![string("fp")]))]),
        DiagnosticKind::FcloseArgumentType
    );
}

#[test]
fn closing_twice_is_an_error() {
    let path = scratch_file("twice");
    let p = path.to_string_lossy().into_owned();
    let err = error(vec![
        set("fp", call_named("fopen", vec![string(&p), string("w")])),
        expr_stmt(call_named("fclose", vec![ident("fp")])),
        expr_stmt(call_named("fclose", vec![ident("fp")])),
    ]);
    assert_eq!(err.kind, DiagnosticKind::FcloseArgumentType);
    let _ = std::fs::remove_file(&path);
}

fn native_repeat(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("repeat", argc, 2, site)?;
    let times = match rt.arg(argc, 1) {
        Value::Int(n) if n >= 0 => n as usize,
        _ => {
            return Err(RuntimeError::new(
                DiagnosticKind::NativeArgumentType {
                    name: "repeat",
                    expected: "a count",
                },
                &site.file,
                site.line,
            ));
        }
    };
    let text = rt.display(rt.arg(argc, 0)).repeat(times);
    let result = rt.new_string(&text);
    rt.native_return(argc, result);
    Ok(())
}

fn native_has_receiver(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("has_receiver", argc, 0, site)?;
    let has = rt.this(frame).is_some();
    rt.native_return(argc, Value::Bool(has));
    Ok(())
}

fn native_whoami(
    rt: &mut Runtime,
    frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("whoami", argc, 0, site)?;
    let name = rt.frame(frame).func_name.clone();
    let result = rt.new_string(&name);
    rt.native_return(argc, result);
    Ok(())
}

struct ExtraNatives;

impl NativeProvider for ExtraNatives {
    fn install(&self, registry: &mut NativeRegistry) {
        registry.register("repeat", native_repeat);
        registry.register("has_receiver", native_has_receiver);
        registry.register("whoami", native_whoami);
    }
}

#[test]
fn embedders_can_provide_natives() {
    let mut registry = NativeRegistry::new();
    ExtraNatives.install(&mut registry);
    assert_eq!(registry.names(), vec!["repeat", "has_receiver", "whoami"]);

    let mut rt = Runtime::new();
    assert!(!rt.has_function("repeat"));
    rt.install_natives(&ExtraNatives);
    assert!(rt.has_function("repeat"));

    let result = exec_in(
        &mut rt,
        &program(
            vec![],
            vec![
                println(call_named("repeat", vec![string("ab"), int(3)])),
                println(call_named("repeat", vec![int(7), int(2)])),
                println(call_named("has_receiver", vec![])),
                println(call_named("whoami", vec![])),
            ],
        ),
    )
    .unwrap();
    assert_eq!(result.output, "ababab\n77\nfalse\nwhoami\n");

    let err = exec_in(
        &mut rt,
        &program(
            vec![],
            vec![expr_stmt(call_named("repeat", vec![string("x"), int(-1)]).at(2))],
        ),
    )
    .unwrap_err();
    assert_eq!(
        err.kind,
        DiagnosticKind::NativeArgumentType {
            name: "repeat",
            expected: "a count"
        }
    );
    assert_eq!(err.line, 2);
}

#[test]
fn register_native_replaces_existing_function() {
    fn quiet(
        rt: &mut Runtime,
        _frame: FrameRef,
        argc: usize,
        _site: &CallSite,
    ) -> Result<(), RuntimeError> {
        rt.native_return(argc, Value::Null);
        Ok(())
    }
    let mut rt = Runtime::new();
    rt.register_native("println", quiet);
    let result = exec_in(&mut rt, &program(vec![], vec![println(string("hidden"))])).unwrap();
    assert_eq!(result.output, "");
}
