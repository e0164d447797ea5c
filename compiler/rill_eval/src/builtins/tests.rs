#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use crate::console::{buffer_console, SharedConsole};
use crate::engine::SourceOutcome;
use pretty_assertions::assert_eq;

fn engine() -> (Engine, SharedConsole) {
    let console = buffer_console();
    let engine = Engine::builder().console(console.clone()).build();
    (engine, console)
}

fn eval_last(engine: &Engine, source: &str) -> Option<Value> {
    let global = engine.global_env().clone();
    match engine.parse_and_eval("<test>", source, &global, false, false) {
        SourceOutcome::Evaluated(results) => results.last().cloned().flatten(),
        other => panic!("source did not evaluate: {other:?}"),
    }
}

#[test]
fn table_resolves_every_bootstrap_builtin() {
    let table = BuiltinTable::new();
    assert_eq!(table.len(), BUILTINS.len());
    assert_eq!(table.lookup("quote").unwrap().kind, BuiltinKind::Special);
    assert_eq!(table.lookup("eval").unwrap().kind, BuiltinKind::Eager);
    assert!(table.lookup("no.such.builtin").is_none());
}

#[test]
fn paste_joins_with_separator() {
    let (engine, _) = engine();
    assert_eq!(
        eval_last(&engine, "paste(\"a\", 1, TRUE)"),
        Some(Value::string("a 1 TRUE"))
    );
    assert_eq!(
        eval_last(&engine, "paste(\"a\", \"b\", sep = \"-\")"),
        Some(Value::string("a-b"))
    );
    assert_eq!(eval_last(&engine, "paste(NULL)"), Some(Value::string("")));
}

#[test]
fn quote_returns_code_unevaluated() {
    let (engine, _) = engine();
    let x = engine.interner().intern("x");
    assert_eq!(eval_last(&engine, "quote(x)"), Some(Value::Symbol(x)));
    assert_eq!(eval_last(&engine, "quote(3)"), Some(Value::Double(3.0)));

    let Some(Value::Language(lang)) = eval_last(&engine, "quote(stop(\"boom\"))") else {
        panic!("expected a language object");
    };
    assert!(matches!(&*lang, Language::Node(_)));
    assert_eq!(
        engine.format_value(&Value::Language(lang)),
        "stop(\"boom\")"
    );
}

#[test]
fn quote_takes_exactly_one_argument() {
    let (engine, console) = engine();
    eval_last(&engine, "quote(a, b)");
    assert_eq!(
        console.take_errors(),
        "Error: 2 arguments passed to 'quote' which requires 1\n"
    );
}

#[test]
fn call_builds_an_evaluable_call() {
    let (engine, _) = engine();
    assert_eq!(
        eval_last(&engine, "eval(call(\"paste\", \"x\", \"y\"))"),
        Some(Value::string("x y"))
    );
}

#[test]
fn call_rejects_a_non_string_head() {
    let (engine, console) = engine();
    eval_last(&engine, "call(1)");
    assert_eq!(
        console.take_errors(),
        "Error: first argument must be a character string\n"
    );
}

#[test]
fn as_name_interns_a_symbol() {
    let (engine, _) = engine();
    let abc = engine.interner().intern("abc");
    assert_eq!(eval_last(&engine, "as.name(\"abc\")"), Some(Value::Symbol(abc)));
    assert_eq!(eval_last(&engine, "abc <- 9\neval(as.name(\"abc\"))"), Some(Value::Double(9.0)));
}

#[test]
fn environment_of_call_and_closure() {
    let (engine, _) = engine();
    let Some(Value::Env(env)) = eval_last(&engine, "environment()") else {
        panic!("expected an environment");
    };
    assert!(env.ptr_eq(engine.global_env()));

    let Some(Value::Env(inner)) = eval_last(
        &engine,
        "make <- function() function() 1\nenvironment(make())",
    ) else {
        panic!("expected an environment");
    };
    assert!(!inner.ptr_eq(engine.global_env()));
    assert_eq!(eval_last(&engine, "environment(1)"), Some(Value::Null));
}

#[test]
fn global_and_empty_environments() {
    let (engine, _) = engine();
    let Some(Value::Env(global)) = eval_last(&engine, "globalenv()") else {
        panic!("expected an environment");
    };
    assert!(global.ptr_eq(engine.global_env()));
    let Some(Value::Env(empty)) = eval_last(&engine, "emptyenv()") else {
        panic!("expected an environment");
    };
    assert!(empty.ptr_eq(engine.empty_env()));
}

#[test]
fn print_writes_and_returns_invisibly() {
    let (engine, console) = engine();
    let global = engine.global_env().clone();
    engine.parse_and_eval("<test>", "print(2)\nprint(\"s\")", &global, true, false);
    assert_eq!(console.take_output(), "[1] 2\n[1] \"s\"\n");
}

#[test]
fn invisible_suppresses_auto_print() {
    let (engine, console) = engine();
    let global = engine.global_env().clone();
    engine.parse_and_eval("<test>", "invisible(5)\n6", &global, true, false);
    assert_eq!(console.take_output(), "[1] 6\n");
    assert_eq!(eval_last(&engine, "invisible()"), Some(Value::Null));
}

#[test]
fn stop_concatenates_its_arguments() {
    let (engine, console) = engine();
    eval_last(&engine, "f <- function() stop(\"bad \", 1)\nf()");
    assert_eq!(console.take_errors(), "Error in f() : bad 1\n");
}

#[test]
fn eval_rejects_a_non_environment() {
    let (engine, console) = engine();
    eval_last(&engine, "eval(quote(1), 2)");
    assert_eq!(
        console.take_errors(),
        "Error: invalid 'envir' argument of type 'double'\n"
    );
}

#[test]
fn eval_of_plain_values_is_identity() {
    let (engine, _) = engine();
    assert_eq!(eval_last(&engine, "eval(4)"), Some(Value::Double(4.0)));
    assert_eq!(eval_last(&engine, "eval(\"s\")"), Some(Value::string("s")));
}

#[test]
fn unmatched_builtin_argument_is_unused() {
    let (engine, console) = engine();
    eval_last(&engine, "identity(1, 2)");
    assert_eq!(
        console.take_errors(),
        "Error: unused argument (2)\n"
    );
}

#[test]
fn nargs_counts_supplied_arguments() {
    let (engine, _) = engine();
    assert_eq!(
        eval_last(&engine, "f <- function(a, b = 2, c) nargs()\nf(1, c = 3)"),
        Some(Value::Int(2))
    );
    assert_eq!(
        eval_last(&engine, "g <- function(a, n = nargs()) n\ng(1)"),
        Some(Value::Int(1))
    );
}

#[test]
fn sys_function_is_the_running_closure() {
    let (engine, console) = engine();
    let Some(Value::Closure(found)) =
        eval_last(&engine, "f <- function() eval(quote(sys.function()))\nf()")
    else {
        panic!("expected a closure");
    };
    let f = engine.interner().intern("f");
    let Some(Value::Closure(bound)) = engine.global_env().get_local(f) else {
        panic!("f is not bound to a closure");
    };
    assert!(Rc::ptr_eq(&found, &bound));

    eval_last(&engine, "sys.function()");
    assert_eq!(
        console.take_errors(),
        "Error: not that many frames on the stack\n"
    );
}
