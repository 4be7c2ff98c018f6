use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::client::StravaClient;
use crate::config::AppConfig;
use crate::error::SyncError;
use crate::logger::log_to_file;
use crate::report::SyncReport;
use crate::store::FileCursorStore;
use crate::sync::{RunSummary, SyncEngine};
use crate::VerbosityLevel;

/// Run one sync from the source to the destination
pub fn handle_sync(
    config_path: Option<&Path>,
    database: Option<&Path>,
    timeout_secs: Option<u64>,
    verbosity: VerbosityLevel,
) -> Result<()> {
    let config = AppConfig::load_or_default_path(config_path)?;
    let store_path = config.store_path(database)?;
    let mut store = FileCursorStore::open(&store_path)?;

    let timeout = timeout_secs
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.sync.poll_timeout());

    if verbosity != VerbosityLevel::Quiet {
        println!("{}", "Syncing activities...".cyan().bold());
    }

    let source = super::connect_source(&config.source)?;
    let destination = StravaClient::new(&config.destination);

    let result = SyncEngine::new(&config.sync, &source, &destination, &mut store).sync(timeout);

    match result {
        Ok(summary) => {
            record_run(&SyncReport::completed(&summary));
            if verbosity != VerbosityLevel::Quiet {
                summary.print_summary();
            }
            Ok(())
        }
        Err(err) => {
            if let SyncError::Transfer { summary, .. } = &err {
                record_run(&SyncReport::transfer_failed(summary, err.to_string()));
                if verbosity != VerbosityLevel::Quiet {
                    summary.print_summary();
                }
            } else {
                log_to_file(&format!("Sync failed: {}", err)).ok();
            }
            Err(err.into())
        }
    }
}

fn record_run(report: &SyncReport) {
    if let Err(e) = report.save() {
        log::warn!("Failed to save sync report: {:#}", e);
    }
    if let Err(e) = log_to_file(&describe(&report.summary, report.error.as_deref())) {
        log::warn!("Failed to write log file: {:#}", e);
    }
}

fn describe(summary: &RunSummary, error: Option<&str>) -> String {
    let mut line = format!(
        "Sync for user {}: {} new, {} transferred, {} succeeded, {} failed, {} pending, cursor {} -> {}",
        summary.user_id,
        summary.candidates,
        summary.transferred.len(),
        summary.succeeded,
        summary.failed,
        summary.pending,
        summary.previous_cursor,
        summary.cursor
    );
    if let Some(error) = error {
        line.push_str(&format!(" (stopped: {})", error));
    }
    line
}
