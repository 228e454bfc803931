//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use clap::CommandFactory;
use pgplanet_cli::{Cli, CliError, run};

/// Exit status for a run stopped by SIGINT or SIGTERM.
const EXIT_CANCELLED: i32 = 130;

fn main() {
    let Err(err) = run() else {
        return;
    };
    match err {
        CliError::ArgumentParsing(parse) if !parse.use_stderr() => {
            // --help and --version
            let _ = parse.print();
        }
        CliError::ArgumentParsing(parse) => {
            let _ = parse.print();
            std::process::exit(1);
        }
        CliError::MissingArgument { .. } => {
            eprintln!("pgplanet: {err}");
            eprintln!("{}", Cli::command().render_usage());
            std::process::exit(1);
        }
        CliError::Cancelled => {
            eprintln!("pgplanet: {err}");
            std::process::exit(EXIT_CANCELLED);
        }
        other => {
            eprintln!("pgplanet: {other}");
            std::process::exit(1);
        }
    }
}
