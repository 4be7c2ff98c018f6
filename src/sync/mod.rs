// Module declarations
mod engine;
mod init;
mod pending;
mod summary;
mod upload;

// Re-export public types and functions
pub use engine::SyncEngine;
pub use init::CursorInitializer;
pub use pending::{pending_activities, verify_feed_order, PendingSet};
pub use summary::RunSummary;
pub use upload::{poll_uploads, UploadJob, UploadState};
