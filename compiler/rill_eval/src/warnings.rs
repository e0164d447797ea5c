//! Pending warnings, flushed after each top-level evaluation.

use std::cell::RefCell;

use crate::console::ConsoleImpl;

#[derive(Default)]
pub struct Warnings {
    pending: RefCell<Vec<String>>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        self.pending.borrow_mut().push(message.into());
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Write all pending warnings to the error stream and clear them.
    ///
    /// `in_addition` marks a report that follows an error message.
    pub fn flush(&self, console: &ConsoleImpl, in_addition: bool) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        let prefix = if in_addition { "In addition: " } else { "" };
        if let [message] = pending.as_slice() {
            console.print_errorln(&format!("{prefix}Warning message:"));
            console.print_errorln(message);
        } else {
            console.print_errorln(&format!("{prefix}Warning messages:"));
            for (i, message) in pending.iter().enumerate() {
                console.print_errorln(&format!("{}:", i + 1));
                console.print_errorln(&format!("  {message}"));
            }
        }
    }
}

#[cfg(test)]
mod tests;
