//! `EngineBuilder` for creating an [`Engine`] with a given configuration.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use rill_ir::SharedInterner;

use super::{Engine, EngineStats};
use crate::builtins::BuiltinTable;
use crate::config::EngineConfig;
use crate::console::{stdout_console, SharedConsole};
use crate::environment::Env;
use crate::frame::Frame;
use crate::value::Value;
use crate::warnings::Warnings;

/// Builder for [`Engine`].
///
/// Everything an engine needs is fixed here, once: configuration, console,
/// interner. Builtins are bound into the base environment by `build`.
pub struct EngineBuilder {
    config: EngineConfig,
    console: Option<SharedConsole>,
    interner: Option<SharedInterner>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        EngineBuilder {
            config: EngineConfig::default(),
            console: None,
            interner: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn crash_on_fatal_error(mut self, crash: bool) -> Self {
        self.config.crash_on_fatal_error = crash;
        self
    }

    /// Bound on entries per inline cache. Zero makes every cache generic on
    /// first use.
    #[must_use]
    pub fn max_pic_depth(mut self, depth: usize) -> Self {
        self.config.max_pic_depth = depth;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    #[must_use]
    pub fn performance_warnings(mut self, enabled: bool) -> Self {
        self.config.performance_warnings = enabled;
        self
    }

    /// Console for output, errors and warnings. Defaults to stdout/stderr.
    #[must_use]
    pub fn console(mut self, console: SharedConsole) -> Self {
        self.console = Some(console);
        self
    }

    /// Share an interner with a parser or another engine.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    pub fn build(self) -> Engine {
        let interner = self.interner.unwrap_or_default();
        let builtins = BuiltinTable::new();

        let empty_env = Env::empty();
        let base_env = empty_env.child();
        for builtin in builtins.iter() {
            base_env.bind(interner.intern(builtin.name), Value::Builtin(*builtin));
        }
        let global_env = base_env.child();
        let global_frame = Rc::new(Frame::top_level(global_env.clone()));
        let eval_function = builtins.lookup("eval");

        tracing::debug!(
            builtins = builtins.len(),
            max_pic_depth = self.config.max_pic_depth,
            max_depth = self.config.max_depth,
            "engine initialized"
        );

        Engine {
            config: self.config,
            interner,
            console: self.console.unwrap_or_else(stdout_console),
            builtins,
            eval_function,
            empty_env,
            base_env,
            global_env,
            global_frame,
            frames: RefCell::new(Vec::new()),
            warnings: Warnings::new(),
            visible: Cell::new(true),
            stats: Cell::new(EngineStats::default()),
            started: Instant::now(),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
