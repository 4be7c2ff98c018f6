//! Durable per-user sync cursors.
//!
//! The store file is a flat JSON object mapping user ids to the id of the
//! last activity transferred for that user:
//!
//! ```json
//! { "1234567": 305 }
//! ```
//!
//! Only one process may write the file at a time.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::client::{ActivityId, UserId};
use crate::error::{SyncError, SyncResult};

/// Storage for the last-synced activity of each user.
pub trait CursorStore {
    fn get(&self, user_id: &UserId) -> SyncResult<Option<ActivityId>>;

    /// Record `activity_id` for `user_id`. The update is durable once this
    /// returns.
    fn set(&mut self, user_id: &UserId, activity_id: ActivityId) -> SyncResult<()>;

    fn entries(&self) -> SyncResult<Vec<(UserId, ActivityId)>>;
}

/// Cursor store backed by a single JSON file
#[derive(Debug)]
pub struct FileCursorStore {
    path: PathBuf,
    cursors: BTreeMap<UserId, ActivityId>,
}

impl FileCursorStore {
    /// Open the store, creating an empty one if the file does not exist.
    pub fn open(path: &Path) -> SyncResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SyncError::store_io(path, e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| SyncError::store_io(path, e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| SyncError::store_io(path, e))?;

        let cursors = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content).map_err(|e| SyncError::StoreCorrupt {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        log::debug!("Opened cursor store {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            cursors,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Write a sibling file, fsync it, then rename it over the store.
    fn persist(&self) -> SyncResult<()> {
        let content = serde_json::to_vec_pretty(&self.cursors)
            .map_err(|e| SyncError::store_io(&self.path, e.into()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = File::create(&tmp_path).map_err(|e| SyncError::store_io(&tmp_path, e))?;
        tmp.write_all(&content)
            .and_then(|_| tmp.sync_all())
            .map_err(|e| SyncError::store_io(&tmp_path, e))?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(|e| SyncError::store_io(&self.path, e))?;

        #[cfg(unix)]
        {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                File::open(parent)
                    .and_then(|dir| dir.sync_all())
                    .map_err(|e| SyncError::store_io(parent, e))?;
            }
        }

        Ok(())
    }
}

impl CursorStore for FileCursorStore {
    fn get(&self, user_id: &UserId) -> SyncResult<Option<ActivityId>> {
        Ok(self.cursors.get(user_id).copied())
    }

    fn set(&mut self, user_id: &UserId, activity_id: ActivityId) -> SyncResult<()> {
        self.cursors.insert(user_id.clone(), activity_id);
        self.persist()
    }

    fn entries(&self) -> SyncResult<Vec<(UserId, ActivityId)>> {
        Ok(self
            .cursors
            .iter()
            .map(|(user, activity)| (user.clone(), *activity))
            .collect())
    }
}
