//! picledger CLI
//!
//! Drives a picledger ledger from the command line.
//!
//! # Commands
//!
//! - `run` - Execute a script of invocations against one store
//! - `operations` - List the supported operations and their arguments
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use commands::run::RunOptions;
use picledger_core::{Config, Ledger};
use picledger_state::{InMemoryStateStore, StateStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// picledger command-line tools.
#[derive(Parser)]
#[command(name = "picledger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Run against a store without predicate query support
    #[arg(global = true, long)]
    no_rich_query: bool,

    /// Largest page size accepted by paginated queries
    #[arg(global = true, long, default_value_t = i32::MAX)]
    max_page_size: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script of {"Args":[...]} invocations, one per line
    Run {
        /// Script file (reads stdin if omitted)
        script: Option<PathBuf>,

        /// Stop at the first failed invocation
        #[arg(short, long)]
        strict: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the supported operations
    Operations {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so script output stays clean.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            script,
            strict,
            format,
        } => {
            let state: Arc<dyn StateStore> = if cli.no_rich_query {
                Arc::new(InMemoryStateStore::without_rich_query())
            } else {
                Arc::new(InMemoryStateStore::new())
            };
            let config = Config::new().max_page_size(cli.max_page_size);
            let ledger = Ledger::new(state, config);
            let options = RunOptions {
                json: format == "json",
                strict,
            };
            commands::run::run(&ledger, script.as_deref(), &options)?;
        }
        Commands::Operations { format } => {
            commands::operations::run(&format)?;
        }
        Commands::Version => {
            println!("picledger CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("picledger Core v{}", picledger_core::VERSION);
        }
    }

    Ok(())
}
