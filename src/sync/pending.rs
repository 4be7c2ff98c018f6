use crate::client::{Activity, ActivityId};
use crate::error::{SyncError, SyncResult};

/// Activities that still need to be transferred, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSet {
    pub activities: Vec<Activity>,
    /// Whether the cursor activity was present in the feed
    pub cursor_found: bool,
}

impl PendingSet {
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }
}

/// Compute the pending activities from a newest-first feed.
///
/// Everything listed before the cursor activity is pending; the cursor
/// activity and everything after it is already synced. When the cursor is not
/// in the feed at all, every listed activity is pending. The result is
/// reversed into transfer order.
pub fn pending_activities(feed: &[Activity], cursor: ActivityId) -> PendingSet {
    let mut activities: Vec<Activity> = feed
        .iter()
        .take_while(|activity| activity.activity_id != cursor)
        .cloned()
        .collect();

    let cursor_found = activities.len() < feed.len();
    activities.reverse();

    PendingSet {
        activities,
        cursor_found,
    }
}

/// Check that feed ids are strictly descending.
pub fn verify_feed_order(feed: &[Activity]) -> SyncResult<()> {
    match feed
        .windows(2)
        .find(|pair| pair[0].activity_id <= pair[1].activity_id)
    {
        Some(pair) => Err(SyncError::FeedOrderViolation {
            newer: pair[0].activity_id,
            older: pair[1].activity_id,
        }),
        None => Ok(()),
    }
}
