use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::upload::{UploadJob, UploadState};
use crate::client::{ActivityId, UserId};

/// Outcome of a sync run.
///
/// Uploads that failed or were still processing at the polling deadline are
/// reported here rather than raised as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub user_id: UserId,

    /// Number of activities found newer than the starting cursor
    pub candidates: usize,

    /// Activities downloaded and uploaded, in transfer order
    pub transferred: Vec<ActivityId>,

    pub succeeded: usize,
    pub failed: usize,

    /// Uploads with no result when polling stopped
    pub pending: usize,

    pub previous_cursor: ActivityId,
    pub cursor: ActivityId,
}

impl RunSummary {
    pub fn new(user_id: UserId, previous_cursor: ActivityId) -> Self {
        Self {
            user_id,
            candidates: 0,
            transferred: Vec::new(),
            succeeded: 0,
            failed: 0,
            pending: 0,
            previous_cursor,
            cursor: previous_cursor,
        }
    }

    pub(crate) fn tally(&mut self, jobs: &[UploadJob]) {
        self.succeeded = count(jobs, UploadState::Succeeded);
        self.failed = count(jobs, UploadState::Failed);
        self.pending = count(jobs, UploadState::Pending);
    }

    /// True when every upload was processed successfully
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.pending == 0
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=== Sync Summary ===".bold().cyan());
        println!("  User: {}", self.user_id.to_string().cyan());

        if self.candidates == 0 {
            println!("  {} Already up to date", "✓".green());
            println!("  Last synced activity: {}", self.cursor);
            return;
        }

        println!(
            "  Transferred {} of {} new activities",
            self.transferred.len().to_string().cyan(),
            self.candidates
        );
        println!(
            "  {} Succeeded    {} Failed    {} Pending",
            self.succeeded.to_string().green(),
            self.failed.to_string().red(),
            self.pending.to_string().yellow(),
        );
        println!(
            "  Last synced activity: {} (was {})",
            self.cursor.to_string().cyan(),
            self.previous_cursor
        );

        if self.failed > 0 {
            println!(
                "  {} {} upload(s) were rejected by the destination",
                "Warning:".yellow(),
                self.failed
            );
        }
        if self.pending > 0 {
            println!(
                "  {} {} upload(s) were still processing when polling stopped",
                "Warning:".yellow(),
                self.pending
            );
        }
    }
}

fn count(jobs: &[UploadJob], state: UploadState) -> usize {
    jobs.iter().filter(|job| job.state == state).count()
}
