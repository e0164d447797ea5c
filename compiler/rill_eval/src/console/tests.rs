use super::*;
use pretty_assertions::assert_eq;

#[test]
fn buffer_separates_output_and_errors() {
    let console = buffer_console();
    console.println("[1] 1");
    console.print_error("Error: ");
    console.print_errorln("boom");
    assert_eq!(console.take_output(), "[1] 1\n");
    assert_eq!(console.take_errors(), "Error: boom\n");
}

#[test]
fn take_drains_the_buffer() {
    let console = BufferConsole::new();
    console.println("once");
    assert_eq!(console.take_output(), "once\n");
    assert_eq!(console.take_output(), "");
}

#[test]
fn silent_console_discards_everything() {
    let console = silent_console();
    console.println("hello");
    console.print_errorln("world");
    assert_eq!(console.take_output(), "");
    assert_eq!(console.take_errors(), "");
}

#[test]
fn stdout_console_captures_nothing() {
    let console = stdout_console();
    assert_eq!(console.take_output(), "");
    console.flush();
}
