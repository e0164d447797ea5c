//! Console output for printed results, errors and warnings.
//!
//! Output can be directed to different destinations:
//! - Stdout: normal output on stdout, errors on stderr (default)
//! - Buffer: captured in memory for tests and embedders
//! - Silent: discarded
//!
//! Uses enum dispatch instead of trait objects; the console is hit on every
//! auto-printed top-level result.

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Console that writes to the process streams.
#[derive(Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn println(&self, msg: &str) {
        println!("{msg}");
    }

    pub fn print_error(&self, msg: &str) {
        eprint!("{msg}");
    }

    pub fn print_errorln(&self, msg: &str) {
        eprintln!("{msg}");
    }

    pub fn flush(&self) {
        // Nothing useful to do if the streams are gone.
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

/// Console that captures both streams in memory.
#[derive(Default)]
pub struct BufferConsole {
    output: Mutex<String>,
    errors: Mutex<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.output.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn print_error(&self, msg: &str) {
        self.errors.lock().push_str(msg);
    }

    pub fn print_errorln(&self, msg: &str) {
        let mut buf = self.errors.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    /// Drain captured standard output.
    pub fn take_output(&self) -> String {
        std::mem::take(&mut *self.output.lock())
    }

    /// Drain captured error output.
    pub fn take_errors(&self) -> String {
        std::mem::take(&mut *self.errors.lock())
    }
}

/// Console implementation using enum dispatch.
pub enum ConsoleImpl {
    Stdout(StdConsole),
    Buffer(BufferConsole),
    Silent,
}

impl ConsoleImpl {
    /// Print a line of normal output.
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(c) => c.println(msg),
            Self::Buffer(c) => c.println(msg),
            Self::Silent => {}
        }
    }

    /// Print to the error stream without a newline.
    pub fn print_error(&self, msg: &str) {
        match self {
            Self::Stdout(c) => c.print_error(msg),
            Self::Buffer(c) => c.print_error(msg),
            Self::Silent => {}
        }
    }

    /// Print a line to the error stream.
    pub fn print_errorln(&self, msg: &str) {
        match self {
            Self::Stdout(c) => c.print_errorln(msg),
            Self::Buffer(c) => c.print_errorln(msg),
            Self::Silent => {}
        }
    }

    pub fn flush(&self) {
        if let Self::Stdout(c) = self {
            c.flush();
        }
    }

    /// Drain captured standard output.
    ///
    /// Returns an empty string for consoles that don't capture.
    pub fn take_output(&self) -> String {
        match self {
            Self::Buffer(c) => c.take_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Drain captured error output.
    pub fn take_errors(&self) -> String {
        match self {
            Self::Buffer(c) => c.take_errors(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }
}

/// Shared console handle.
pub type SharedConsole = Arc<ConsoleImpl>;

pub fn stdout_console() -> SharedConsole {
    Arc::new(ConsoleImpl::Stdout(StdConsole))
}

pub fn buffer_console() -> SharedConsole {
    Arc::new(ConsoleImpl::Buffer(BufferConsole::new()))
}

pub fn silent_console() -> SharedConsole {
    Arc::new(ConsoleImpl::Silent)
}

#[cfg(test)]
mod tests;
