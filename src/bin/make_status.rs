//! Generate a STATUS.md from a papers CSV.
//! Run: cargo run --bin make_status -- --papers data/papers.csv --out STATUS.md

use clap::Parser;

use papercheck::cli::{handle_status, StatusArgs};
use papercheck::logging::init_logging;

#[derive(Debug, Parser)]
#[command(name = "make_status", version, about = "Generate a markdown status report")]
struct Cli {
    #[command(flatten)]
    args: StatusArgs,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    std::process::exit(handle_status(&cli.args));
}
