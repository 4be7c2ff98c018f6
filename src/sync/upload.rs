use std::thread;
use std::time::{Duration, Instant};

use crate::client::{ActivityId, DestinationClient, UploadHandle, UploadStatus};

/// Processing state of one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Pending,
    Succeeded,
    Failed,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadState::Pending)
    }
}

/// An upload issued during the current run
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub activity_id: ActivityId,
    pub handle: UploadHandle,
    pub state: UploadState,
    /// Activity created on the destination, once known
    pub destination_activity: Option<u64>,
}

impl UploadJob {
    pub fn new(activity_id: ActivityId, handle: UploadHandle) -> Self {
        Self {
            activity_id,
            handle,
            state: UploadState::Pending,
            destination_activity: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == UploadState::Pending
    }

    /// Apply a status report. Terminal states never change.
    pub fn observe(&mut self, status: &UploadStatus) {
        if self.state.is_terminal() {
            return;
        }

        if status.is_error() {
            self.state = UploadState::Failed;
        } else if let Some(activity) = status.activity {
            self.state = UploadState::Succeeded;
            self.destination_activity = Some(activity);
        }
    }
}

/// Poll the destination until every job is terminal or `timeout` elapses.
///
/// Each round checks every pending job once and then sleeps `interval`, so
/// two checks of the same handle are always separated by a pause. At least
/// one round runs even with a zero timeout. Returns the number of rounds.
pub fn poll_uploads(
    destination: &dyn DestinationClient,
    jobs: &mut [UploadJob],
    timeout: Duration,
    interval: Duration,
) -> usize {
    if jobs.is_empty() {
        return 0;
    }

    let started = Instant::now();
    let mut rounds = 0;

    loop {
        rounds += 1;

        for job in jobs.iter_mut().filter(|job| job.is_pending()) {
            match destination.check_status(&job.handle) {
                Ok(status) => {
                    job.observe(&status);
                    match job.state {
                        UploadState::Succeeded => log::info!(
                            "Activity {} processed (upload {})",
                            job.activity_id,
                            job.handle
                        ),
                        UploadState::Failed => log::warn!(
                            "Destination rejected activity {} (upload {})",
                            job.activity_id,
                            job.handle
                        ),
                        UploadState::Pending => log::debug!(
                            "Upload {} still processing: {}",
                            job.handle,
                            status.workflow
                        ),
                    }
                }
                Err(e) => log::warn!("Failed to check upload {}: {:#}", job.handle, e),
            }
        }

        let remaining = jobs.iter().filter(|job| job.is_pending()).count();
        if remaining == 0 {
            break;
        }

        if started.elapsed() >= timeout {
            log::warn!(
                "Gave up waiting on {} upload(s) after {:.1}s",
                remaining,
                started.elapsed().as_secs_f64()
            );
            break;
        }

        thread::sleep(interval);
    }

    rounds
}
