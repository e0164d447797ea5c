//! Rill script runner.

use rillc::{init_tracing, parse_args, run, Invocation, USAGE};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args) {
        Ok(Invocation::Help) => println!("{USAGE}"),
        Ok(Invocation::Version) => println!("rill {}", env!("CARGO_PKG_VERSION")),
        Ok(Invocation::Run(options)) => {
            let status = run(&options, rill_eval::stdout_console());
            std::process::exit(status);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}
