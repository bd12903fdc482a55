mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::acquisition_tax::AcquisitionTaxArgs;
use commands::retirement::RetirementArgs;

/// Retirement savings gap and acquisition tax calculations
#[derive(Parser)]
#[command(
    name = "rplan",
    version,
    about = "Retirement savings gap and acquisition tax calculations",
    long_about = "A CLI for household financial planning with decimal precision. \
                  Resolves property acquisition tax rates and amounts, and projects \
                  the annual saving needed to close a retirement income gap."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve acquisition tax rates and amounts for one or more acquisitions
    AcquisitionTax(AcquisitionTaxArgs),
    /// Project the retirement savings gap and required annual saving
    Retirement(RetirementArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::AcquisitionTax(args) => commands::acquisition_tax::run_acquisition_tax(args),
        Commands::Retirement(args) => commands::retirement::run_retirement(args),
        Commands::Version => {
            println!("rplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
