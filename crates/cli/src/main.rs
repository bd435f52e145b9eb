//! bkang CLI - bkang command

use anyhow::Result;
use bkang_core::SystemClock;
use clap::{Parser, Subcommand};
use cli_lib::cmd;
use cli_lib::settings::{GlobalArgs, RetentionArgs, Settings};
use cli_lib::system_config;
use tracing_subscriber::EnvFilter;

/// bkang - Backup snapshots with tiered retention
#[derive(Parser)]
#[command(name = "bkang")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the archive directories (root, current, snapshots)
    Init,
    /// Mirror the backup source into the archive's staging directory
    Sync {
        /// Tree to back up (default: from config)
        #[arg(long)]
        source: Option<String>,
        /// Host holding the archive, "" for local (default: from config)
        #[arg(long)]
        address: Option<String>,
    },
    /// Freeze the staging directory into a snapshot named after the current time
    Snapshot,
    /// Delete snapshots the retention policy no longer keeps
    Prune {
        #[command(flatten)]
        retention: RetentionArgs,
        /// Only print the paths that would be pruned
        #[arg(long)]
        list: bool,
    },
    /// Show snapshots and which retention tiers keep them
    List {
        #[command(flatten)]
        retention: RetentionArgs,
    },
    /// View or edit the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all values
    List,
    /// Print one value
    Get {
        /// Dotted key, e.g. retention.daily
        key: String,
    },
    /// Change one value
    Set {
        /// Dotted key, e.g. retention.daily
        key: String,
        /// New value (-1 means unlimited for retention counts)
        #[arg(allow_negative_numbers = true)]
        value: String,
    },
    /// Print the config file location
    Path {
        /// Write the default config if the file does not exist
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example config
    Example,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::List => cmd::config::run_list().await,
        ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
        ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
        ConfigCommands::Path { create } => cmd::config::run_path(create).await,
        ConfigCommands::Example => cmd::config::run_example().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let command = match cli.command {
        Commands::Config(config_cmd) => return run_config(config_cmd).await,
        other => other,
    };

    let config = system_config::load()?;
    let settings = Settings::resolve(&config, &cli.global);

    match command {
        Commands::Init => cmd::init::run(&settings).await,
        Commands::Sync { source, address } => {
            cmd::sync::run(&settings, source.as_deref(), address.as_deref()).await
        }
        Commands::Snapshot => cmd::snapshot::run(&settings, &SystemClock).await.map(|_| ()),
        Commands::Prune { retention, list } => {
            cmd::prune::run(&settings, &retention, list).await.map(|_| ())
        }
        Commands::List { retention } => cmd::list::run(&settings, &retention, &SystemClock).await,
        Commands::Config(config_cmd) => run_config(config_cmd).await,
    }
}
