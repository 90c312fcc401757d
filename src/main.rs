//! Command-line entry point: read a source file, strip everything without
//! language meaning, JIT-compile, and run. The program's own output goes to
//! stdout straight from the generated code's service calls; diagnostics go
//! to stderr.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Just-in-time compile a cell-machine program and run it.
#[derive(Parser, Debug)]
#[command(name = "bfjit", version, about)]
struct Cli {
    /// Path to the source program.
    program: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let raw = match fs::read_to_string(&cli.program) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("error: could not read {}: {err}", cli.program.display());
            return ExitCode::FAILURE;
        }
    };

    let source: String = raw.chars().filter(|&c| bfjit::frontend::is_meaningful(c)).collect();

    match bfjit::run(&source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
