//! # activity-sync
//!
//! A command-line tool that copies newly recorded activities from Garmin
//! Connect to Strava.
//!
//! ## Overview
//!
//! Each run lists the account's activities on the source (newest first),
//! finds the ones recorded after the last synced activity, downloads each in
//! an interchange format (TCX by default) and uploads it to the destination.
//! A per-user cursor stored in a small JSON file marks the last activity
//! transferred, so later runs pick up where the previous one stopped.
//!
//! ## Architecture
//!
//! - Service access ([`client`]): the [`client::SourceClient`] and
//!   [`client::DestinationClient`] traits plus the Garmin and Strava clients
//! - Sync progress ([`store`]): durable per-user cursors
//! - Core logic ([`sync`]): the incremental sync engine and cursor initializer
//! - Configuration, errors, logging and reporting ([`config`], [`error`],
//!   [`logger`], [`report`])
//! - CLI command handlers ([`handlers`])

/// Source and destination service clients.
pub mod client;

/// Configuration file loading and platform configuration directories.
///
/// The TOML configuration holds service credentials, the cursor store
/// location and sync tuning. It is loaded once per invocation and passed by
/// reference to the components that need it.
pub mod config;

/// Fatal error taxonomy shared by the sync engine and cursor store.
pub mod error;

/// Command handlers invoked by the CLI.
pub mod handlers;

/// Logging configuration.
///
/// Console output goes through `env_logger`; run milestones are also
/// appended to a log file in the config directory, rotated past 10MB.
pub mod logger;

/// Persistence of the latest sync run report.
pub mod report;

/// Durable per-user sync cursors.
pub mod store;

/// Incremental sync engine.
///
/// Computes which activities are newer than the stored cursor, transfers them
/// oldest first while advancing the cursor after each one, and then polls the
/// destination until uploads finish processing or a deadline passes.
pub mod sync;

use log::LevelFilter;

/// How much output commands produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerbosityLevel {
    /// Errors and warnings only, no summary
    Quiet,
    #[default]
    Normal,
    /// Include debug logging
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            VerbosityLevel::Verbose
        } else if quiet {
            VerbosityLevel::Quiet
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            VerbosityLevel::Quiet => LevelFilter::Warn,
            VerbosityLevel::Normal => LevelFilter::Info,
            VerbosityLevel::Verbose => LevelFilter::Debug,
        }
    }
}
