use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::report::load_latest_report;
use crate::store::{CursorStore, FileCursorStore};

/// Show stored cursors and the latest run report without contacting any service
pub fn handle_status(config_path: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let store_path: PathBuf = match database {
        Some(path) => path.to_path_buf(),
        None => AppConfig::load_or_default_path(config_path)?.store_path(None)?,
    };
    let store = FileCursorStore::open(&store_path)?;

    println!("{}", "=== Activity Sync Status ===".bold().cyan());
    println!();
    println!("{}", "Cursor store:".bold());
    println!("  Path: {}", store_path.display());

    let entries = store.entries()?;
    if entries.is_empty() {
        println!(
            "  {} No cursors recorded; run 'activity-sync init-cursor --last-activity <ID>'",
            "Note:".yellow()
        );
    } else {
        for (user_id, activity_id) in entries {
            println!(
                "  User {}: last synced activity {}",
                user_id.to_string().cyan(),
                activity_id
            );
        }
    }

    println!();
    match load_latest_report() {
        Ok(Some(report)) => report.print_summary(),
        Ok(None) => println!("{}", "No sync runs recorded yet".dimmed()),
        Err(e) => log::warn!("Failed to load latest sync report: {:#}", e),
    }

    Ok(())
}
