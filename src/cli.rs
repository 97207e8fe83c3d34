//! Command-line entry helper
//!
//! A facade cannot be conjured from a string the way a reflective runtime
//! would, so the executable lives with the facade author: build the
//! operation table, hand it to [`run`], and the helper does the rest —
//! argument parsing, script execution, report printing, exit code.
//!
//! ```rust,ignore
//! fn main() -> std::process::ExitCode {
//!     let facade = my_app::facade_table();
//!     acceptspec::cli::run(facade)
//! }
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use crate::facade::FacadeTable;
use crate::result::RunResults;
use crate::runner::RunnerBuilder;

#[derive(Parser, Debug)]
#[command(name = "acceptspec")]
#[command(version)]
#[command(about = "Run acceptance-test scripts against an application facade")]
pub struct Cli {
    /// Script files to execute, in order
    #[arg(required = true)]
    pub scripts: Vec<PathBuf>,

    /// Deadline in milliseconds for each facade invocation
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Print every executed line with its outcome
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse the process arguments and run the scripts against `facade`.
/// Exits non-zero when any script has a failed line or was aborted.
pub fn run(facade: FacadeTable) -> ExitCode {
    run_with(facade, Cli::parse())
}

/// Like [`run`], with pre-parsed arguments.
pub fn run_with(facade: FacadeTable, cli: Cli) -> ExitCode {
    let mut builder = RunnerBuilder::new(facade.shared()).files(
        cli.scripts
            .iter()
            .map(|path| path.to_string_lossy().into_owned()),
    );
    if let Some(ms) = cli.timeout {
        builder = builder.timeout(Duration::from_millis(ms));
    }

    let results = match builder.run() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_results(&results, cli.verbose);

    if results.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_results(results: &RunResults, verbose: bool) {
    for name in results.script_names() {
        let script = match results.script(name) {
            Some(script) => script,
            None => continue,
        };
        if verbose {
            for result in script.results().values() {
                if result.has_error() {
                    println!(
                        "FAIL  {}:{}: {} -> {}",
                        script.file(),
                        result.line(),
                        result.command(),
                        result.error_message(),
                    );
                } else {
                    println!(
                        "ok    {}:{}: {} -> {}",
                        script.file(),
                        result.line(),
                        result.command(),
                        result.value_as_string(),
                    );
                }
            }
        }
        print!("{}", script.report());
        println!();
    }
    println!("{}", results.statistics());
}
