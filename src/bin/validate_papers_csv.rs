//! Validate a papers CSV for required columns and missing fields.
//! Run: cargo run --bin validate_papers_csv -- data/papers.csv
//!
//! Exit codes: 0 = OK, 1 = validation errors.

use clap::Parser;

use papercheck::cli::{handle_validate, ValidateArgs};
use papercheck::logging::init_logging;

#[derive(Debug, Parser)]
#[command(name = "validate_papers_csv", version, about = "Validate a papers CSV")]
struct Cli {
    #[command(flatten)]
    args: ValidateArgs,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    std::process::exit(handle_validate(&cli.args));
}
