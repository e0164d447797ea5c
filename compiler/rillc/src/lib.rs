//! Rill script runner.
//!
//! Command line parsing and the run loop behind the `rill` binary. Kept in a
//! library so the end-to-end tests can drive it with a buffer console.

pub mod cli;
mod runner;

pub use cli::{parse_args, CliError, Invocation, RunOptions, Source, USAGE};
pub use runner::{run, EXIT_PARSE_FAILED, EXIT_UNREADABLE};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Only does anything when `RUST_LOG` is set, e.g.
/// `RUST_LOG=rill_eval=debug` for cache and caller-frame events or
/// `RUST_LOG=rill_eval=trace` for every node. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}
