mod common;

use common::*;
use crb_ir::build::*;
use crb_ir::{BinaryOp, Expr, FuncDef};
use crb_runtime::Value;
use crb_syntax::DiagnosticKind;
use pretty_assertions::assert_eq;

fn msg(e: &str) -> Expr {
    member(ident(e), "exception_msg")
}

fn trace_entry(e: &str, i: i64, field: &str) -> Expr {
    member(index(member(ident(e), "stack_trace_array"), int(i)), field)
}

/// `g` throws on line 3; `f` calls `g` on line 7.
fn nested_thrower() -> Vec<FuncDef> {
    vec![
        function("g", &[], vec![throw(new_exception("boom")).at(3)]),
        function(
            "f",
            &[],
            vec![expr_stmt(call_named("g", vec![]).at(7))],
        ),
    ]
}

#[test]
fn catch_binds_the_thrown_record() {
    let out = output(vec![
        try_(
            vec![
                throw(new_exception("bad thing")),
                println(string("not reached")),
            ],
            Some(("e", vec![println(msg("e"))])),
            None,
        ),
        println(string("after")),
    ]);
    assert_eq!(out, "bad thing\nafter\n");
}

#[test]
fn stack_trace_lists_frames_innermost_first() {
    let out = output_with(
        nested_thrower(),
        vec![try_(
            vec![expr_stmt(call_named("f", vec![]).at(10))],
            Some((
                "e",
                vec![
                    println(trace_entry("e", 0, "func_name")),
                    println(trace_entry("e", 0, "line_number")),
                    println(trace_entry("e", 1, "func_name")),
                    println(trace_entry("e", 1, "line_number")),
                    println(trace_entry("e", 2, "func_name")),
                    println(trace_entry("e", 2, "line_number")),
                    println(method_call(
                        member(ident("e"), "stack_trace_array"),
                        "size",
                        vec![],
                    )),
                ],
            )),
            None,
        )],
    );
    assert_eq!(out, "g\n3\nf\n7\n(top level)\n10\n3\n");
}

#[test]
fn print_stack_trace_renders_backtrace() {
    let out = output_with(
        nested_thrower(),
        vec![try_(
            vec![expr_stmt(call_named("f", vec![]).at(10))],
            Some(("e", vec![expr_stmt(method_call(ident("e"), "print_stack_trace", vec![]))])),
            None,
        )],
    );
    assert_eq!(
        out,
        "exception: boom\n\
         \tbacktrace in function g line 3\n\
         \tbacktrace in function f line 7\n\
         \tbacktrace in function (top level) line 10\n\
         \n"
    );
}

#[test]
fn uncaught_exception_reports_message_and_trace() {
    let err = error_with(
        nested_thrower(),
        vec![expr_stmt(call_named("f", vec![]).at(10))],
    );
    assert_eq!(
        err.kind,
        DiagnosticKind::UncaughtException {
            message: "boom".into(),
            trace: "\tbacktrace in function g line 3\n\
                    \tbacktrace in function f line 7\n\
                    \tbacktrace in function (top level) line 10\n"
                .into(),
        }
    );
    assert_eq!(err.line, 3);
    assert_eq!(err.file, "main.crb");
}

#[test]
fn anonymous_closures_appear_in_traces() {
    let out = output(vec![
        set(
            "thrower",
            closure(None, &[], vec![throw(new_exception("x")).at(2)]),
        ),
        try_(
            vec![expr_stmt(call(ident("thrower"), vec![]).at(5))],
            Some(("e", vec![println(trace_entry("e", 0, "func_name"))])),
            None,
        ),
    ]);
    assert_eq!(out, "(anonymous closure)\n");
}

#[test]
fn rethrow_keeps_original_trace() {
    let out = output_with(
        nested_thrower(),
        vec![try_(
            vec![try_(
                vec![expr_stmt(call_named("f", vec![]).at(10))],
                Some(("inner", vec![throw(ident("inner")).at(20)])),
                None,
            )],
            Some(("outer", vec![println(trace_entry("outer", 0, "line_number"))])),
            None,
        )],
    );
    assert_eq!(out, "3\n");
}

#[test]
fn user_records_can_be_exceptions() {
    let out = output(vec![
        set("err", call_named("new_object", vec![])),
        expr_stmt(assign(member(ident("err"), "is_exception"), boolean(true))),
        expr_stmt(assign(member(ident("err"), "exception_msg"), string("custom"))),
        expr_stmt(assign(member(ident("err"), "code"), int(42))),
        try_(
            vec![throw(ident("err"))],
            Some((
                "e",
                vec![println(msg("e")), println(member(ident("e"), "code"))],
            )),
            None,
        ),
    ]);
    assert_eq!(out, "custom\n42\n");
}

#[test]
fn throwing_a_non_exception_is_a_runtime_error() {
    assert_eq!(
        error_kind(vec![throw(int(1))]),
        DiagnosticKind::ThrowNotExceptionType
    );
    assert_eq!(
        error_kind(vec![throw(call_named("new_object", vec![]))]),
        DiagnosticKind::ThrowNotExceptionType
    );
}

#[test]
fn runtime_errors_are_not_catchable() {
    let err = error(vec![try_(
        vec![expr_stmt(binary(BinaryOp::Div, int(1), int(0)))],
        Some(("e", vec![println(string("caught"))])),
        Some(vec![println(string("finally"))]),
    )]);
    assert_eq!(err.kind, DiagnosticKind::DivisionByZero);
}

#[test]
fn finally_runs_on_every_path() {
    let returns = function(
        "returns",
        &[],
        vec![try_(
            vec![ret(Some(string("value")))],
            None,
            Some(vec![println(string("finally after return"))]),
        )],
    );
    let out = output_with(
        vec![returns],
        vec![
            try_(
                vec![println(string("body"))],
                None,
                Some(vec![println(string("finally after normal"))]),
            ),
            try_(
                vec![throw(new_exception("x"))],
                Some(("e", vec![println(string("catch"))])),
                Some(vec![println(string("finally after catch"))]),
            ),
            println(call_named("returns", vec![])),
            while_(
                boolean(true),
                vec![try_(
                    vec![brk()],
                    None,
                    Some(vec![println(string("finally after break"))]),
                )],
            ),
        ],
    );
    assert_eq!(
        out,
        "body\n\
         finally after normal\n\
         catch\n\
         finally after catch\n\
         finally after return\n\
         value\n\
         finally after break\n"
    );
}

#[test]
fn try_without_catch_rethrows_after_finally() {
    let out = output(vec![try_(
        vec![try_(
            vec![throw(new_exception("inner"))],
            None,
            Some(vec![println(string("cleanup"))]),
        )],
        Some(("e", vec![println(msg("e"))])),
        None,
    )]);
    assert_eq!(out, "cleanup\ninner\n");
}

#[test]
fn throw_in_catch_still_runs_finally() {
    let out = output(vec![try_(
        vec![try_(
            vec![throw(new_exception("first"))],
            Some(("e", vec![throw(new_exception("second"))])),
            Some(vec![println(string("finally"))]),
        )],
        Some(("e", vec![println(msg("e"))])),
        None,
    )]);
    assert_eq!(out, "finally\nsecond\n");
}

#[test]
fn throw_in_finally_replaces_pending_exception() {
    let out = output(vec![try_(
        vec![try_(
            vec![throw(new_exception("original"))],
            None,
            Some(vec![throw(new_exception("replacement"))]),
        )],
        Some(("e", vec![println(msg("e"))])),
        None,
    )]);
    assert_eq!(out, "replacement\n");
}

#[test]
fn finally_result_is_discarded() {
    let f = function(
        "f",
        &[],
        vec![try_(
            vec![ret(Some(int(1)))],
            None,
            Some(vec![ret(Some(int(2)))]),
        )],
    );
    let result = run_with(vec![f], vec![ret(Some(call_named("f", vec![])))]).unwrap();
    assert_eq!(result.value, Some(Value::Int(1)));
}

#[test]
fn exception_unwinds_nested_calls() {
    let out = output_with(
        nested_thrower(),
        vec![
            try_(
                vec![expr_stmt(call_named("f", vec![]))],
                Some(("e", vec![])),
                None,
            ),
            // Frames and stack were restored; ordinary calls keep working.
            println(binary(BinaryOp::Add, string("depth ok "), int(1))),
            try_(
                vec![expr_stmt(call_named("g", vec![]))],
                Some(("e", vec![println(msg("e"))])),
                None,
            ),
        ],
    );
    assert_eq!(out, "depth ok 1\nboom\n");
}

#[test]
fn exceptions_survive_collection_while_unwinding() {
    let mut rt = stress_runtime();
    let result = exec_in(
        &mut rt,
        &program(
            nested_thrower(),
            vec![try_(
                vec![expr_stmt(call_named("f", vec![]).at(10))],
                Some((
                    "e",
                    vec![
                        set("junk", array(vec![string("a"), string("b")])),
                        println(binary(BinaryOp::Add, msg("e"), string("!"))),
                        println(trace_entry("e", 2, "func_name")),
                    ],
                )),
                Some(vec![set("more", array(vec![int(1), int(2), int(3)]))]),
            )],
        ),
    )
    .unwrap();
    assert_eq!(result.output, "boom!\n(top level)\n");
}
