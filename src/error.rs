use std::path::PathBuf;

use crate::client::ActivityId;
use crate::sync::RunSummary;

/// Fatal errors that abort a sync or cursor operation.
///
/// Conditions that only affect part of a run (uploads that failed or never
/// finished processing on the destination) are not errors; they are counted
/// in [`RunSummary`] instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The configuration file is missing, unreadable, or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The cursor store file could not be opened, read, or written.
    #[error("cursor store unavailable at {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cursor store file exists but does not contain a valid mapping.
    #[error("cursor store at {} is corrupt: {source}", path.display())]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The source returned no activities, so no user id can be resolved.
    #[error("no activities returned from the source service")]
    NoActivities,

    /// No cursor has been recorded for the user yet.
    #[error(
        "no last-synced activity recorded for user {user_id}; run 'activity-sync init-cursor --last-activity <ID>' first"
    )]
    UninitializedCursor { user_id: String },

    /// The source feed was not in newest-first order.
    #[error("source feed is not newest-first: activity {newer} is listed before {older}")]
    FeedOrderViolation { newer: ActivityId, older: ActivityId },

    /// A call to the source failed before any activity was transferred.
    #[error("source request failed: {0}")]
    Source(String),

    /// Downloading or uploading an activity failed mid-run.
    ///
    /// Cursor advances made for earlier activities in the same run are kept;
    /// `summary` describes the work that did complete.
    #[error("failed to transfer activity {activity_id}: {reason}")]
    Transfer {
        activity_id: ActivityId,
        reason: String,
        summary: Box<RunSummary>,
    },
}

impl SyncError {
    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::StoreUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_cursor_mentions_init_command() {
        let err = SyncError::UninitializedCursor {
            user_id: "1234".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1234"));
        assert!(msg.contains("init-cursor"));
    }

    #[test]
    fn test_feed_order_violation_names_both_ids() {
        let err = SyncError::FeedOrderViolation {
            newer: ActivityId(3),
            older: ActivityId(7),
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_store_unavailable_includes_path() {
        let err = SyncError::store_io(
            "/nonexistent/cursors.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/nonexistent/cursors.json"));
    }
}
