//! Finboard CLI - personal finance dashboard in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{accounts, balance, config, export, goals, monthly, stats, status, tx};

/// Finboard - personal finance dashboard in your terminal
#[derive(Parser)]
#[command(name = "fb", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show API health and account summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List and rename accounts
    Accounts {
        #[command(subcommand)]
        command: accounts::AccountCommands,
    },

    /// List, add, edit and delete transactions
    Tx {
        #[command(subcommand)]
        command: tx::TxCommands,
    },

    /// Income, expenses, category breakdown and monthly trend
    Stats(stats::StatsArgs),

    /// Totals for a single month
    Monthly {
        /// Month (1-12), defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Daily balance history per account
    Balance {
        /// Account IDs (comma-separated), defaults to all accounts
        #[arg(long = "account", value_delimiter = ',')]
        accounts: Vec<i64>,
        /// Number of days ending today
        #[arg(long)]
        days: Option<u32>,
        /// Show only the dates reported by the API, aligned across accounts
        #[arg(long)]
        sparse: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the full data export
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Savings goals with progress tracking
    Goals {
        #[command(subcommand)]
        command: goals::GoalCommands,
    },

    /// Show and change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; FINBOARD_LOG takes an EnvFilter directive, `-v` forces debug
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FINBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Accounts { command } => accounts::run(command),
        Commands::Tx { command } => tx::run(command),
        Commands::Stats(args) => stats::run(args),
        Commands::Monthly { month, year, json } => monthly::run(month, year, json),
        Commands::Balance { accounts, days, sparse, json } => balance::run(accounts, days, sparse, json),
        Commands::Export { output } => export::run(output),
        Commands::Goals { command } => goals::run(command),
        Commands::Config { command } => config::run(command),
    }
}
