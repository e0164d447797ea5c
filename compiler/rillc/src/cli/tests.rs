use super::*;
use pretty_assertions::assert_eq;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

fn options(list: &[&str]) -> RunOptions {
    match parse_args(&args(list)) {
        Ok(Invocation::Run(options)) => options,
        other => panic!("expected run options, got {other:?}"),
    }
}

#[test]
fn file_argument_runs_the_file() {
    let options = options(&["prog.R"]);
    assert_eq!(options.source, Source::File(PathBuf::from("prog.R")));
    assert_eq!(options.config, EngineConfig::default());
    assert_eq!(options.description(), "prog.R");
}

#[test]
fn expressions_accumulate_in_order() {
    let options = options(&["-e", "x <- 1", "-e", "x"]);
    assert_eq!(
        options.source,
        Source::Expressions(vec!["x <- 1".to_string(), "x".to_string()])
    );
}

#[test]
fn engine_flags_map_onto_config() {
    let options = options(&[
        "--crash-on-fatal",
        "--pic-depth=0",
        "--max-depth=100",
        "--perf-warnings",
        "-e",
        "1",
    ]);
    assert_eq!(
        options.config,
        EngineConfig {
            crash_on_fatal_error: true,
            max_pic_depth: 0,
            max_depth: 100,
            performance_warnings: true,
        }
    );
}

#[test]
fn help_wins_over_everything_before_it() {
    assert_eq!(parse_args(&args(&["-e", "1", "--help"])), Ok(Invocation::Help));
    assert_eq!(parse_args(&args(&["--version"])), Ok(Invocation::Version));
}

#[test]
fn malformed_command_lines() {
    assert_eq!(parse_args(&args(&[])), Err(CliError::NoSource));
    assert_eq!(parse_args(&args(&["-e"])), Err(CliError::MissingValue("-e")));
    assert_eq!(
        parse_args(&args(&["--pic-depth=many", "a.R"])),
        Err(CliError::InvalidNumber {
            option: "--pic-depth",
            value: "many".to_string(),
        })
    );
    assert_eq!(
        parse_args(&args(&["--fast", "a.R"])),
        Err(CliError::UnknownOption("--fast".to_string()))
    );
    assert_eq!(
        parse_args(&args(&["a.R", "-e", "1"])),
        Err(CliError::ConflictingSources)
    );
    assert_eq!(
        parse_args(&args(&["a.R", "b.R"])),
        Err(CliError::ConflictingSources)
    );
}

#[test]
fn errors_read_as_sentences() {
    assert_eq!(
        CliError::InvalidNumber {
            option: "--max-depth",
            value: "-1".to_string(),
        }
        .to_string(),
        "--max-depth expects a non-negative integer, got '-1'"
    );
}
