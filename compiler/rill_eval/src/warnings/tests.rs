use super::*;
use crate::console::buffer_console;
use pretty_assertions::assert_eq;

#[test]
fn single_warning_uses_singular_header() {
    let console = buffer_console();
    let warnings = Warnings::new();
    warnings.push("careful");
    warnings.flush(&console, false);
    assert_eq!(console.take_errors(), "Warning message:\ncareful\n");
    assert!(warnings.is_empty());
}

#[test]
fn several_warnings_are_numbered() {
    let console = buffer_console();
    let warnings = Warnings::new();
    warnings.push("one");
    warnings.push("two");
    assert_eq!(warnings.len(), 2);
    warnings.flush(&console, false);
    assert_eq!(console.take_errors(), "Warning messages:\n1:\n  one\n2:\n  two\n");
}

#[test]
fn report_after_error_is_prefixed() {
    let console = buffer_console();
    let warnings = Warnings::new();
    warnings.push("late");
    warnings.flush(&console, true);
    assert_eq!(console.take_errors(), "In addition: Warning message:\nlate\n");
}

#[test]
fn flushing_nothing_prints_nothing() {
    let console = buffer_console();
    Warnings::new().flush(&console, true);
    assert_eq!(console.take_errors(), "");
}
