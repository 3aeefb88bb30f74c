use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::data::validate::{validate_papers_csv, ValidationReport, DEFAULT_PAPERS_PATH};
use crate::report::generate_report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `[ERROR]`/`[WARN]` lines on stderr.
    #[default]
    Text,
    /// The whole report as JSON on stdout.
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to papers.csv
    #[arg(default_value = DEFAULT_PAPERS_PATH)]
    pub csv_path: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Path to papers.csv
    #[arg(long)]
    pub papers: PathBuf,

    /// Output markdown path, e.g. STATUS.md
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check required columns and per-row field rules
    Validate(ValidateArgs),
    /// Write a markdown status report for a papers index
    Status(StatusArgs),
}

#[derive(Debug, Parser)]
#[command(name = "papercheck", version, about = "Checks and summarises paper metadata CSVs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

pub fn run_with_args(args: &[String]) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => run(&cli.command),
        Err(err) => {
            let _ = err.print();
            err.exit_code()
        }
    }
}

pub fn run(command: &Command) -> i32 {
    match command {
        Command::Validate(args) => handle_validate(args),
        Command::Status(args) => handle_status(args),
    }
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    path: String,
    passed: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

pub fn handle_validate(args: &ValidateArgs) -> i32 {
    let report = validate_papers_csv(&args.csv_path);

    match args.format {
        OutputFormat::Text => {
            for diagnostic in &report.diagnostics {
                eprintln!("{diagnostic}");
            }
            if report.passed() {
                println!("OK: papers.csv looks valid.");
            }
        }
        OutputFormat::Json => {
            let output = ValidationOutput {
                path: args.csv_path.display().to_string(),
                passed: report.passed(),
                report: &report,
            };
            match serde_json::to_string_pretty(&output) {
                Ok(payload) => println!("{payload}"),
                Err(err) => {
                    eprintln!("failed to serialize validation report: {err}");
                    return 1;
                }
            }
        }
    }

    report.exit_code()
}

pub fn handle_status(args: &StatusArgs) -> i32 {
    match generate_report(&args.papers, &args.out) {
        Ok(_) => {
            println!("Wrote {}", args.out.display());
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
