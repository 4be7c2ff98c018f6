use activity_sync::{handlers, logger, VerbosityLevel};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "activity-sync")]
#[command(about = "Sync recorded activities from Garmin Connect to Strava", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer activities recorded since the last sync
    Sync {
        /// Path to the config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Path to the sync database file
        #[arg(short, long, value_name = "FILE")]
        database: Option<PathBuf>,

        /// Seconds to wait for uploads to finish processing
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Set the last (most recent) synced activity for a user
    InitCursor {
        /// Path to the config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Path to the sync database file
        #[arg(short, long, value_name = "FILE")]
        database: Option<PathBuf>,

        /// Source user id (looked up from the activity when omitted)
        #[arg(long, value_name = "ID")]
        user_id: Option<String>,

        /// Id of the last activity that has been synced
        #[arg(long, alias = "last-ride", value_name = "ID")]
        last_activity: u64,
    },

    /// Show stored cursors and the last sync run
    Status {
        /// Path to the config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Path to the sync database file
        #[arg(short, long, value_name = "FILE")]
        database: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from_flags(cli.verbose, cli.quiet);

    if let Err(e) = logger::rotate_log_if_needed() {
        eprintln!("Warning: failed to rotate log file: {e:#}");
    }
    if let Err(e) = logger::init_logger(verbosity) {
        eprintln!("Warning: failed to initialize logging: {e:#}");
    }

    match cli.command {
        Commands::Sync {
            config,
            database,
            timeout,
        } => {
            handlers::handle_sync(config.as_deref(), database.as_deref(), timeout, verbosity)?;
        }
        Commands::InitCursor {
            config,
            database,
            user_id,
            last_activity,
        } => {
            handlers::handle_init_cursor(
                config.as_deref(),
                database.as_deref(),
                user_id,
                last_activity,
            )?;
        }
        Commands::Status { config, database } => {
            handlers::handle_status(config.as_deref(), database.as_deref())?;
        }
    }

    Ok(())
}
