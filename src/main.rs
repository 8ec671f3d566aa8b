use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xswap::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xswap::AppCommand {
    fn from(cmd: Commands) -> xswap::AppCommand {
        match cmd {
            Commands::Prices { filter } => xswap::AppCommand::Prices { filter },
            Commands::Convert { amount, from, to } => {
                xswap::AppCommand::Convert { amount, from, to }
            }
            Commands::Swap => xswap::AppCommand::Swap,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List spot prices, optionally filtered by currency code
    Prices { filter: Option<String> },
    /// Convert an amount between two currencies
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    /// Open the interactive swap form
    Swap,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xswap::cli::setup::setup(),
        Some(cmd) => xswap::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
