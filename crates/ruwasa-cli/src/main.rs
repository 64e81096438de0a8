mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::design::DesignArgs;
use commands::project::ProjectArgs;
use commands::simulate::SimulateArgs;

/// Rural water supply appraisal for solar piped schemes and handpumps
#[derive(Parser)]
#[command(
    name = "ruwasa",
    version,
    about = "Rural water supply appraisal: solar piped schemes vs handpumps",
    long_about = "Appraises rural water supply options by projecting year-by-year costs, \
                  revenues and monetized benefits of a solar-powered piped scheme against \
                  a handpump fleet, with decimal precision. Includes a Monte Carlo \
                  robustness check and a hydraulic pre-design with bill of quantities."
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
    /// Run the year-by-year NPV comparison
    Project(ProjectArgs),
    /// Monte Carlo robustness check on a projection
    Simulate(SimulateArgs),
    /// Size the solar scheme hydraulics and price the bill of quantities
    Design(DesignArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::project::run_project(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Design(args) => commands::design::run_design(args),
        Commands::Version => {
            println!("ruwasa {}", env!("CARGO_PKG_VERSION"));
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
