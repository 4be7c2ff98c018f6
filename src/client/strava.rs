//! Strava upload client
//!
//! Uploads go through the v3 `uploads` endpoint, which processes files
//! asynchronously; the returned upload id is polled until Strava reports
//! either an error or the id of the created activity.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{ActivityFile, DestinationClient, UploadHandle, UploadStatus};
use crate::config::DestinationConfig;

/// Strava API client authenticated with a bearer access token
pub struct StravaClient {
    agent: ureq::Agent,
    base_url: String,
    access_token: String,
}

/// Response body of `POST /uploads` and `GET /uploads/{id}`
#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: u64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    activity_id: Option<u64>,
}

impl UploadResponse {
    fn into_status(self) -> UploadStatus {
        match self.error {
            Some(error) => {
                log::debug!("Upload {} reported error: {}", self.id, error);
                UploadStatus {
                    workflow: UploadStatus::ERROR_WORKFLOW.to_string(),
                    activity: None,
                }
            }
            None => UploadStatus {
                workflow: self.status.unwrap_or_default(),
                activity: self.activity_id,
            },
        }
    }
}

impl StravaClient {
    pub fn new(config: &DestinationConfig) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl DestinationClient for StravaClient {
    fn upload(&self, file: &ActivityFile) -> Result<Vec<UploadHandle>> {
        let boundary = format!("activity-sync-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, file);

        let mut response = self
            .agent
            .post(&format!("{}/uploads", self.base_url))
            .header("Authorization", &self.authorization())
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={}", boundary),
            )
            .send(&body[..])
            .with_context(|| format!("Failed to upload {}", file.file_name()))?;

        let upload: UploadResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse upload response")?;

        log::debug!("Strava accepted {} as upload {}", file.file_name(), upload.id);

        Ok(vec![UploadHandle::new(upload.id.to_string())])
    }

    fn check_status(&self, handle: &UploadHandle) -> Result<UploadStatus> {
        let mut response = self
            .agent
            .get(&format!("{}/uploads/{}", self.base_url, handle))
            .header("Authorization", &self.authorization())
            .call()
            .with_context(|| format!("Failed to query upload {}", handle))?;

        let upload: UploadResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse upload status response")?;

        Ok(upload.into_status())
    }
}

fn multipart_body(boundary: &str, file: &ActivityFile) -> Vec<u8> {
    let mut body = Vec::with_capacity(file.data.len() + 512);

    for (name, value) in [
        ("data_type", file.format.as_str().to_string()),
        ("external_id", file.activity_id.to_string()),
    ] {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            file.file_name()
        )
        .as_bytes(),
    );
    body.extend_from_slice(&file.data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    body
}
