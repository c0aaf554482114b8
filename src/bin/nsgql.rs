//! nsgql CLI Binary
//!
//! Runs one NsgQL query or agent command and prints the result.

use clap::Parser;
use nsgcli::logging::init_logging;
use nsgcli::tooling::cli::{Cli, CliContext};
use owo_colors::OwoColorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", "ERROR:".red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&context.config().logging)) {
        eprintln!("{} {}", "ERROR:".red().bold(), e);
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            print!("{}", output);
        }
        Err(e) => {
            eprintln!("{} {}", "ERROR:".red().bold(), e);
            process::exit(1);
        }
    }
}
