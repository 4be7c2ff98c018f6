use std::time::Duration;

use anyhow::Result;

use super::pending::{pending_activities, verify_feed_order};
use super::summary::RunSummary;
use super::upload::{poll_uploads, UploadJob};
use crate::client::{Activity, ActivityFile, DestinationClient, SourceClient, UploadHandle};
use crate::config::SyncOptions;
use crate::error::{SyncError, SyncResult};
use crate::store::CursorStore;

/// Incremental transfer of new source activities to the destination
pub struct SyncEngine<'a> {
    options: &'a SyncOptions,
    source: &'a dyn SourceClient,
    destination: &'a dyn DestinationClient,
    cursors: &'a mut dyn CursorStore,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        options: &'a SyncOptions,
        source: &'a dyn SourceClient,
        destination: &'a dyn DestinationClient,
        cursors: &'a mut dyn CursorStore,
    ) -> Self {
        Self {
            options,
            source,
            destination,
            cursors,
        }
    }

    /// Transfer every activity newer than the user's cursor, oldest first,
    /// then wait up to `timeout` for the destination to process the uploads.
    ///
    /// The cursor is advanced and persisted after each activity is uploaded,
    /// so a failure part-way through leaves it at the last transferred
    /// activity. A download or upload failure stops the transfer loop; uploads
    /// already issued are still polled before [`SyncError::Transfer`] is
    /// returned.
    pub fn sync(&mut self, timeout: Duration) -> SyncResult<RunSummary> {
        let feed = self
            .source
            .list_activities()
            .map_err(|e| SyncError::Source(format!("{:#}", e)))?;

        // Every activity in the feed belongs to the signed-in account.
        let user_id = feed
            .first()
            .map(|activity| activity.user_id.clone())
            .ok_or(SyncError::NoActivities)?;

        let previous = self
            .cursors
            .get(&user_id)?
            .ok_or_else(|| SyncError::UninitializedCursor {
                user_id: user_id.to_string(),
            })?;

        if self.options.verify_feed_order {
            verify_feed_order(&feed)?;
        }

        let pending = pending_activities(&feed, previous);
        if !pending.cursor_found {
            log::info!(
                "Last synced activity {} is not in the feed; treating all {} listed activities as new",
                previous,
                feed.len()
            );
        }
        log::info!("Found {} activities that need to be synced", pending.len());

        let mut summary = RunSummary::new(user_id.clone(), previous);
        summary.candidates = pending.len();
        if pending.is_empty() {
            return Ok(summary);
        }

        let mut jobs = Vec::new();
        let mut failure = None;

        for activity in &pending.activities {
            match self.transfer(activity) {
                Ok(handles) => {
                    jobs.extend(
                        handles
                            .into_iter()
                            .map(|handle| UploadJob::new(activity.activity_id, handle)),
                    );
                    self.cursors.set(&user_id, activity.activity_id)?;
                    summary.cursor = activity.activity_id;
                    summary.transferred.push(activity.activity_id);
                    log::debug!("Cursor for user {} advanced to {}", user_id, activity.activity_id);
                }
                Err(e) => {
                    log::error!("Failed to transfer activity {}: {:#}", activity.activity_id, e);
                    failure = Some((activity.activity_id, format!("{:#}", e)));
                    break;
                }
            }
        }

        log::info!(
            "Updated last synced activity for user {} to {}",
            user_id,
            summary.cursor
        );

        if !jobs.is_empty() {
            log::info!("Waiting for {} upload(s) to finish processing", jobs.len());
            poll_uploads(self.destination, &mut jobs, timeout, self.options.poll_interval());
        }

        summary.tally(&jobs);

        if summary.failed > 0 {
            log::warn!("{} upload(s) failed processing on the destination", summary.failed);
        }
        if summary.pending > 0 {
            log::warn!(
                "{} upload(s) were still processing when polling stopped",
                summary.pending
            );
        }

        match failure {
            Some((activity_id, reason)) => Err(SyncError::Transfer {
                activity_id,
                reason,
                summary: Box::new(summary),
            }),
            None => Ok(summary),
        }
    }

    fn transfer(&self, activity: &Activity) -> Result<Vec<UploadHandle>> {
        let format = self.options.format;
        let data = self.source.download_activity(activity.activity_id, format)?;

        let file = ActivityFile {
            activity_id: activity.activity_id,
            format,
            data,
        };

        log::info!("Uploading activity {}", activity.activity_id);
        self.destination.upload(&file)
    }
}
