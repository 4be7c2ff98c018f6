use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::sync::RunSummary;

/// How a sync run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every pending activity was transferred
    Completed,
    /// A download or upload failed and the run stopped early
    TransferFailed,
}

/// Persisted record of the most recent sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// RFC 3339 time the report was generated
    pub timestamp: String,

    pub outcome: RunOutcome,

    /// Transfer error message when `outcome` is `TransferFailed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub summary: RunSummary,
}

impl SyncReport {
    pub fn completed(summary: &RunSummary) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            outcome: RunOutcome::Completed,
            error: None,
            summary: summary.clone(),
        }
    }

    pub fn transfer_failed(summary: &RunSummary, error: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            outcome: RunOutcome::TransferFailed,
            error: Some(error.into()),
            summary: summary.clone(),
        }
    }

    /// Save as the latest report in the config directory
    pub fn save(&self) -> Result<()> {
        crate::config::ConfigManager::ensure_config_dir()?;
        let path = crate::config::ConfigManager::sync_report_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize sync report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write sync report: {}", path.display()))?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sync report: {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse sync report")
    }

    pub fn print_summary(&self) {
        println!("{}", "Last run:".bold());
        println!("  When: {}", self.timestamp);
        match self.outcome {
            RunOutcome::Completed => println!("  Outcome: {}", "completed".green()),
            RunOutcome::TransferFailed => println!("  Outcome: {}", "transfer failed".red()),
        }
        if let Some(error) = &self.error {
            println!("  Error: {}", error);
        }

        let summary = &self.summary;
        println!(
            "  Transferred: {} of {}",
            summary.transferred.len(),
            summary.candidates
        );
        println!(
            "  Uploads: {} succeeded, {} failed, {} pending",
            summary.succeeded, summary.failed, summary.pending
        );
    }
}

/// Load the latest sync report, if one has been written
pub fn load_latest_report() -> Result<Option<SyncReport>> {
    let path = crate::config::ConfigManager::sync_report_path()?;
    if !path.exists() {
        return Ok(None);
    }
    SyncReport::load_from(&path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ActivityId, UserId};
    use tempfile::TempDir;

    fn summary() -> RunSummary {
        let mut summary = RunSummary::new(UserId::new("77"), ActivityId(2));
        summary.candidates = 3;
        summary.transferred = vec![ActivityId(3)];
        summary.succeeded = 1;
        summary.cursor = ActivityId(3);
        summary
    }

    #[test]
    fn test_report_round_trip_on_disk() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("report.json");

        let report = SyncReport::transfer_failed(&summary(), "upload of 4 failed");
        report.save_to(&path)?;

        let loaded = SyncReport::load_from(&path)?;
        assert_eq!(loaded.outcome, RunOutcome::TransferFailed);
        assert_eq!(loaded.error.as_deref(), Some("upload of 4 failed"));
        assert_eq!(loaded.summary, summary());
        Ok(())
    }

    #[test]
    fn test_completed_report_omits_error() -> Result<()> {
        let report = SyncReport::completed(&summary());
        let json = serde_json::to_string(&report)?;
        assert!(json.contains(r#""outcome":"completed""#));
        assert!(!json.contains("error"));
        Ok(())
    }
}
