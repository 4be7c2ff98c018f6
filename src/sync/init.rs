use crate::client::{ActivityId, SourceClient, UserId};
use crate::error::{SyncError, SyncResult};
use crate::store::CursorStore;

/// Seeds or overwrites a user's cursor by hand.
///
/// The write is unconditional: it may move the cursor backwards, which is how
/// an operator forces activities to be transferred again.
pub struct CursorInitializer<'a> {
    source: Option<&'a dyn SourceClient>,
    cursors: &'a mut dyn CursorStore,
}

impl<'a> CursorInitializer<'a> {
    /// `source` is only needed when `init` is called without a user id.
    pub fn new(source: Option<&'a dyn SourceClient>, cursors: &'a mut dyn CursorStore) -> Self {
        Self { source, cursors }
    }

    /// Record `last_activity` as the user's last synced activity and return
    /// the user id written.
    pub fn init(&mut self, user_id: Option<UserId>, last_activity: ActivityId) -> SyncResult<UserId> {
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => self.resolve_user(last_activity)?,
        };

        if let Some(previous) = self.cursors.get(&user_id)? {
            if previous != last_activity {
                log::warn!(
                    "Overwriting last synced activity for user {}: {} -> {}",
                    user_id,
                    previous,
                    last_activity
                );
            }
        }

        self.cursors.set(&user_id, last_activity)?;
        log::info!(
            "Set last synced activity for user {} to {}",
            user_id,
            last_activity
        );

        Ok(user_id)
    }

    fn resolve_user(&self, activity_id: ActivityId) -> SyncResult<UserId> {
        let source = self.source.ok_or_else(|| {
            SyncError::Config("a user id is required when the source service is unavailable".to_string())
        })?;

        let activity = source
            .get_activity(activity_id)
            .map_err(|e| SyncError::Source(format!("{:#}", e)))?;

        log::debug!("Activity {} belongs to user {}", activity_id, activity.user_id);
        Ok(activity.user_id)
    }
}
