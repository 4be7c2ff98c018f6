//! In-memory source, destination and cursor store used by the integration tests.

#![allow(dead_code)]

use activity_sync::client::{
    Activity, ActivityFile, ActivityFormat, ActivityId, DestinationClient, SourceClient,
    UploadHandle, UploadStatus, UserId,
};
use activity_sync::config::SyncOptions;
use activity_sync::error::SyncResult;
use activity_sync::store::CursorStore;
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const USER: &str = "1234567";

pub fn user() -> UserId {
    UserId::new(USER)
}

/// Feed of activities for `USER`, given newest first.
pub fn feed(ids: &[u64]) -> Vec<Activity> {
    ids.iter().map(|id| Activity::new(*id, USER)).collect()
}

pub fn fast_options() -> SyncOptions {
    SyncOptions {
        poll_interval_ms: 1,
        ..Default::default()
    }
}

pub struct FakeSource {
    pub activities: Vec<Activity>,
    pub broken_downloads: HashSet<u64>,
    pub downloads: RefCell<Vec<(u64, ActivityFormat)>>,
}

impl FakeSource {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self {
            activities,
            broken_downloads: HashSet::new(),
            downloads: RefCell::new(Vec::new()),
        }
    }

    pub fn downloaded(&self) -> Vec<u64> {
        self.downloads.borrow().iter().map(|(id, _)| *id).collect()
    }
}

impl SourceClient for FakeSource {
    fn list_activities(&self) -> Result<Vec<Activity>> {
        Ok(self.activities.clone())
    }

    fn get_activity(&self, activity_id: ActivityId) -> Result<Activity> {
        self.activities
            .iter()
            .find(|a| a.activity_id == activity_id)
            .cloned()
            .ok_or_else(|| anyhow!("activity {} not found", activity_id))
    }

    fn download_activity(&self, activity_id: ActivityId, format: ActivityFormat) -> Result<Vec<u8>> {
        if self.broken_downloads.contains(&activity_id.0) {
            return Err(anyhow!("download of {} timed out", activity_id));
        }
        self.downloads.borrow_mut().push((activity_id.0, format));
        Ok(format!("<activity id=\"{}\"/>", activity_id).into_bytes())
    }
}

/// How the destination eventually treats an uploaded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    /// Ready after the given number of status checks
    SucceedsAfter(usize),
    Fails,
    Never,
}

pub struct FakeDestination {
    pub processing: HashMap<u64, Processing>,
    pub rejected_uploads: HashSet<u64>,
    pub handles_per_upload: usize,
    pub uploads: RefCell<Vec<u64>>,
    checks: RefCell<HashMap<String, usize>>,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self {
            processing: HashMap::new(),
            rejected_uploads: HashSet::new(),
            handles_per_upload: 1,
            uploads: RefCell::new(Vec::new()),
            checks: RefCell::new(HashMap::new()),
        }
    }

    pub fn uploaded(&self) -> Vec<u64> {
        self.uploads.borrow().clone()
    }

    pub fn status_checks(&self) -> usize {
        self.checks.borrow().values().sum()
    }
}

impl DestinationClient for FakeDestination {
    fn upload(&self, file: &ActivityFile) -> Result<Vec<UploadHandle>> {
        let id = file.activity_id.0;
        if self.rejected_uploads.contains(&id) {
            return Err(anyhow!("HTTP 503 uploading {}", file.file_name()));
        }
        self.uploads.borrow_mut().push(id);
        Ok((0..self.handles_per_upload)
            .map(|n| UploadHandle::new(format!("{id}-{n}")))
            .collect())
    }

    fn check_status(&self, handle: &UploadHandle) -> Result<UploadStatus> {
        let activity: u64 = handle
            .as_str()
            .split('-')
            .next()
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| anyhow!("unknown handle {}", handle))?;

        let mut checks = self.checks.borrow_mut();
        let seen = checks.entry(handle.to_string()).or_insert(0);
        *seen += 1;

        let processing = self
            .processing
            .get(&activity)
            .copied()
            .unwrap_or(Processing::SucceedsAfter(1));

        let status = match processing {
            Processing::SucceedsAfter(n) if *seen >= n => UploadStatus {
                workflow: "ready".to_string(),
                activity: Some(activity + 1_000_000),
            },
            Processing::Fails => UploadStatus {
                workflow: "Error".to_string(),
                activity: None,
            },
            _ => UploadStatus {
                workflow: "processing".to_string(),
                activity: None,
            },
        };
        Ok(status)
    }
}

/// Cursor store that remembers every write.
#[derive(Default)]
pub struct RecordingStore {
    pub cursors: BTreeMap<UserId, ActivityId>,
    pub writes: Vec<(UserId, ActivityId)>,
}

impl RecordingStore {
    pub fn with_cursor(user: &UserId, activity: u64) -> Self {
        let mut store = Self::default();
        store.cursors.insert(user.clone(), ActivityId(activity));
        store
    }

    pub fn written_ids(&self) -> Vec<u64> {
        self.writes.iter().map(|(_, id)| id.0).collect()
    }
}

impl CursorStore for RecordingStore {
    fn get(&self, user_id: &UserId) -> SyncResult<Option<ActivityId>> {
        Ok(self.cursors.get(user_id).copied())
    }

    fn set(&mut self, user_id: &UserId, activity_id: ActivityId) -> SyncResult<()> {
        self.cursors.insert(user_id.clone(), activity_id);
        self.writes.push((user_id.clone(), activity_id));
        Ok(())
    }

    fn entries(&self) -> SyncResult<Vec<(UserId, ActivityId)>> {
        Ok(self.cursors.iter().map(|(u, a)| (u.clone(), *a)).collect())
    }
}
