//! Notification delivery to an ntfy server.
//!
//! Posts one JSON message per record with `notify` set. Delivery failures are
//! reported to the caller, which logs and continues with the remaining
//! records; a failed delivery does not abort the run or block state
//! persistence.

use std::fmt;

use serde_json::json;

use crate::config::NtfyTargetConfig;
use crate::extract::ReleaseInfo;

/// Error type for notification delivery
#[derive(Debug)]
pub enum NotifyError {
    Client { reason: String },
    Transport { reason: String },
    Status { status: u16, body: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Client { reason } => {
                write!(f, "Failed to build HTTP client: {}", reason)
            }
            NotifyError::Transport { reason } => {
                write!(f, "While sending notification: {}", reason)
            }
            NotifyError::Status { status, body } => {
                write!(f, "While sending notification status {}, text {}", status, body)
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// Client publishing to a single ntfy topic.
#[derive(Clone)]
pub struct NtfyClient {
    client: reqwest::Client,
    base_url: String,
    topic: String,
    icon_tag: String,
}

impl NtfyClient {
    /// Build a client for the configured target.
    pub fn new(target: &NtfyTargetConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(target.no_verify)
            .build()
            .map_err(|e| NotifyError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: target.base_url.trim_end_matches('/').to_string(),
            topic: target.topic.clone(),
            icon_tag: target.icon_tag.clone(),
        })
    }

    /// Deliver a notification for one record.
    ///
    /// # Errors
    /// Returns [`NotifyError`] on transport failure or a non-200 response.
    pub async fn send(&self, row: &ReleaseInfo) -> Result<(), NotifyError> {
        let payload = json!({
            "topic": self.topic,
            "title": row.title,
            "message": row.description,
            "tags": [self.icon_tag],
            "click": row.preview_url,
        });

        let response = self
            .client
            .post(format!("{}/", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        tracing::debug!("notification delivered for {}", row.id);
        Ok(())
    }
}
