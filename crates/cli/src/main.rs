//! Marketplace CLI - commission quotes from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Split a $100 charge for a merchant on the free plan
//! mp-cli split --amount 100 --plan free
//!
//! # Same, as JSON for scripts
//! mp-cli split --amount 100 --plan pro --json
//!
//! # Show the rate table
//! mp-cli rates
//! ```
//!
//! # Commands
//!
//! - `split` - Commission and payout for an amount
//! - `rates` - Commission rate per plan

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mp-cli")]
#[command(author, version, about = "Marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split an amount into platform commission and merchant payout
    Split {
        /// Amount in the currency's standard unit (e.g. 19.99)
        #[arg(short, long)]
        amount: String,

        /// Merchant plan (`free`, `pro`)
        #[arg(short, long)]
        plan: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the commission rate of every plan
    Rates {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, commands::CliError> {
    match cli.command {
        Commands::Split { amount, plan, json } => commands::split::render(&amount, &plan, json),
        Commands::Rates { json } => commands::rates::render(json),
    }
}
