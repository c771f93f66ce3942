use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use trm::core::log::init_logging;

#[derive(Parser)]
#[command(version, about = "Colombian TRM (COP per USD) with ordered source fallback")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// First day of the range (YYYY-MM-DD), defaults to 30 days before --end
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD), defaults to today
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for trm::AppCommand {
    fn from(cmd: Commands) -> trm::AppCommand {
        match cmd {
            Commands::Fetch => trm::AppCommand::Fetch,
            Commands::Summary => trm::AppCommand::Summary,
            Commands::Weekly => trm::AppCommand::Weekly,
            Commands::Export { output } => trm::AppCommand::Export { output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the daily TRM series
    Fetch,
    /// Display latest rate, change and range statistics
    Summary,
    /// Display weekly open/high/low/close
    Weekly,
    /// Write the series to a `date,trm` CSV file
    Export {
        /// Output file, defaults to trm_data.csv under the configured export_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => trm::cli::setup::setup(),
        Some(cmd) => {
            trm::run_command(cmd.into(), cli.config_path.as_deref(), cli.start, cli.end).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
