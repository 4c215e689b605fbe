use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use reship_cli::{StageArg, commands};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reship")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Sync same-day exchange shipments to partner admin portals",
    long_about = "Reship reads the day's exchange-shipment rows from a tabular export, decides \
                  what remote state transition each order needs, drives a remote admin port \
                  through it, and reports the outcome per order."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the day's order batch without touching any portal
    Plan {
        /// Path to the source CSV export
        #[arg(value_name = "FILE", env = "RESHIP_SOURCE")]
        source: PathBuf,

        /// Channel to process (e.g. 29CM, Zigzag)
        #[arg(short, long, env = "RESHIP_CHANNEL")]
        channel: String,

        /// Ship date to process (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Extra channel profiles (JSON)
        #[arg(long, env = "RESHIP_CHANNELS_FILE")]
        channels: Option<PathBuf>,
    },

    /// Run the sync engine over the day's batch
    Sync {
        /// Path to the source CSV export
        #[arg(value_name = "FILE", env = "RESHIP_SOURCE")]
        source: PathBuf,

        /// Channel to process (e.g. 29CM, Zigzag)
        #[arg(short, long, env = "RESHIP_CHANNEL")]
        channel: String,

        /// Ship date to process (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Extra channel profiles (JSON)
        #[arg(long, env = "RESHIP_CHANNELS_FILE")]
        channels: Option<PathBuf>,

        /// Remote state snapshot to run against (JSON)
        #[arg(long, value_name = "FILE", env = "RESHIP_REMOTE")]
        remote: PathBuf,

        /// Which passes to run
        #[arg(long, value_enum, default_value = "all")]
        stage: StageArg,

        /// Write the run report as JSON
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Plan {
            source,
            channel,
            date,
            channels,
        } => commands::plan::execute(&source, &channel, date, channels.as_deref()),
        Commands::Sync {
            source,
            channel,
            date,
            channels,
            remote,
            stage,
            report,
        } => {
            commands::sync::execute(
                &source,
                &channel,
                date,
                channels.as_deref(),
                &remote,
                stage,
                report,
            )
            .await
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("reship_cli=debug,reship_core=debug,reship_engine=debug")
    } else {
        EnvFilter::new("reship_cli=info,reship_core=info,reship_engine=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
