//! Service client abstractions.
//!
//! The sync engine only talks to the source and destination services through
//! the [`SourceClient`] and [`DestinationClient`] traits. The shipped
//! implementations are [`GarminClient`] and [`StravaClient`].

pub mod garmin;
pub mod strava;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use garmin::GarminClient;
pub use strava::StravaClient;

/// Identifier of an activity on the source service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub u64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActivityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(ActivityId)
    }
}

/// Identifier of the account owning an activity on the source service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded activity as listed by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub activity_id: ActivityId,
    pub user_id: UserId,
}

impl Activity {
    pub fn new(activity_id: u64, user_id: impl Into<String>) -> Self {
        Self {
            activity_id: ActivityId(activity_id),
            user_id: UserId::new(user_id),
        }
    }
}

/// Exercise interchange format used for downloads and uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFormat {
    #[default]
    Tcx,
    Gpx,
    Fit,
}

impl ActivityFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityFormat::Tcx => "tcx",
            ActivityFormat::Gpx => "gpx",
            ActivityFormat::Fit => "fit",
        }
    }
}

impl fmt::Display for ActivityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Downloaded activity data held in memory between download and upload.
#[derive(Debug, Clone)]
pub struct ActivityFile {
    pub activity_id: ActivityId,
    pub format: ActivityFormat,
    pub data: Vec<u8>,
}

impl ActivityFile {
    /// File name presented to the destination, e.g. `12345.tcx`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.activity_id, self.format)
    }
}

/// Opaque token identifying an in-progress upload on the destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadHandle(String);

impl UploadHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processing status of an upload as reported by the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStatus {
    /// Workflow state; `"Error"` means processing failed.
    pub workflow: String,
    /// The created destination activity, once processing has finished.
    pub activity: Option<u64>,
}

impl UploadStatus {
    pub const ERROR_WORKFLOW: &'static str = "Error";

    pub fn is_error(&self) -> bool {
        self.workflow == Self::ERROR_WORKFLOW
    }
}

/// Read access to the service activities are synced from.
pub trait SourceClient {
    /// List the account's activities.
    ///
    /// Implementations must return activities newest first. The sync engine
    /// relies on this order to find the already-synced boundary and does not
    /// re-sort the feed.
    fn list_activities(&self) -> Result<Vec<Activity>>;

    /// Fetch a single activity's metadata.
    fn get_activity(&self, activity_id: ActivityId) -> Result<Activity>;

    /// Download an activity's data in the given format.
    fn download_activity(&self, activity_id: ActivityId, format: ActivityFormat) -> Result<Vec<u8>>;
}

/// Write access to the service activities are synced to.
pub trait DestinationClient {
    /// Upload an activity. A single upload may produce several handles.
    fn upload(&self, file: &ActivityFile) -> Result<Vec<UploadHandle>>;

    /// Query the processing status of an upload.
    fn check_status(&self, handle: &UploadHandle) -> Result<UploadStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_id_parse_and_display() {
        let id: ActivityId = " 12345 ".parse().unwrap();
        assert_eq!(id, ActivityId(12345));
        assert_eq!(id.to_string(), "12345");
        assert!("abc".parse::<ActivityId>().is_err());
    }

    #[test]
    fn test_activity_format_serde() {
        let fmt: ActivityFormat = serde_json::from_str(r#""gpx""#).unwrap();
        assert_eq!(fmt, ActivityFormat::Gpx);
        assert_eq!(serde_json::to_string(&ActivityFormat::Tcx).unwrap(), r#""tcx""#);
        assert_eq!(ActivityFormat::default(), ActivityFormat::Tcx);
    }

    #[test]
    fn test_activity_file_name() {
        let file = ActivityFile {
            activity_id: ActivityId(42),
            format: ActivityFormat::Fit,
            data: Vec::new(),
        };
        assert_eq!(file.file_name(), "42.fit");
    }

    #[test]
    fn test_upload_status_error_detection() {
        let failed = UploadStatus {
            workflow: "Error".to_string(),
            activity: None,
        };
        assert!(failed.is_error());

        let processing = UploadStatus {
            workflow: "Your activity is still being processed.".to_string(),
            activity: None,
        };
        assert!(!processing.is_error());
    }
}
