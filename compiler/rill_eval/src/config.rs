//! Engine configuration.

/// Default bound on specialized entries per inline cache.
pub const DEFAULT_MAX_PIC_DEPTH: usize = 4;

/// Default bound on nested frames before evaluation is aborted.
pub const DEFAULT_MAX_DEPTH: usize = 5000;

/// Settings fixed when an engine is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Exit the process with status 2 after reporting an internal fault.
    pub crash_on_fatal_error: bool,
    /// Entries an inline cache may hold before going generic.
    pub max_pic_depth: usize,
    /// Nesting limit for frames.
    pub max_depth: usize,
    /// Warn the first time a call site's caller frame has to be found by
    /// walking the stack.
    pub performance_warnings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            crash_on_fatal_error: false,
            max_pic_depth: DEFAULT_MAX_PIC_DEPTH,
            max_depth: DEFAULT_MAX_DEPTH,
            performance_warnings: false,
        }
    }
}
