//! Running a program from the command line.

use rill_eval::{SharedConsole, SourceOutcome};

use crate::cli::{RunOptions, Source};

/// Exit status when the program file cannot be read.
pub const EXIT_UNREADABLE: i32 = 1;

/// Exit status when the program does not parse.
pub const EXIT_PARSE_FAILED: i32 = 1;

/// Evaluate the program described by `options`, auto-printing visible
/// top-level results to `console`. Returns the process exit status.
///
/// Errors raised by statements are reported and do not change the status;
/// the remaining statements still run.
#[tracing::instrument(level = "debug", skip_all, fields(source = %options.description()))]
pub fn run(options: &RunOptions, console: SharedConsole) -> i32 {
    let text = match &options.source {
        Source::Expressions(exprs) => exprs.join("\n"),
        Source::File(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                console.print_errorln(&format!(
                    "Error: cannot open file '{}': {err}",
                    path.display()
                ));
                return EXIT_UNREADABLE;
            }
        },
    };

    let engine = options.engine_builder().console(console.clone()).build();
    let global = engine.global_env().clone();
    let outcome = engine.parse_and_eval(&options.description(), &text, &global, true, false);
    console.flush();

    match outcome {
        SourceOutcome::Evaluated(results) => {
            tracing::debug!(
                statements = results.len(),
                failed = results.iter().filter(|r| r.is_none()).count(),
                elapsed_ms = engine.elapsed().as_millis(),
                "program finished"
            );
            0
        }
        SourceOutcome::ParseFailed(_) | SourceOutcome::Incomplete => EXIT_PARSE_FAILED,
    }
}
