//! Nearby Performance Metrics - Main CLI Application
//!
//! Reads the per-trial results of a quick-start performance run, aggregates
//! them and reports whether every latency, throughput and reach target was met.

use clap::Parser;
use nearby_perf_metrics::{app::App, cli::Cli, error::AppError};
use std::process;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("This is likely a bug. Please report it with the trial file that triggered it.");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();

    match run_application(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e.format_for_console(use_color));
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Evaluate the run, print the report to stdout and return the exit code
fn run_application(cli: Cli) -> Result<i32, AppError> {
    let app = App::new(cli)?;

    if let Some(info) = app.info_output()? {
        println!("{}", info);
        return Ok(0);
    }

    let outcome = app.run()?;

    println!("{}", outcome.rendered);

    Ok(outcome.exit_code())
}

/// Print hints for fixing the input that caused `error`
fn print_error_suggestions(error: &AppError) {
    eprintln!();
    for line in error.suggestions() {
        eprintln!("{}", line);
    }
}
