//! Payload fetching.
//!
//! Fetches a source's endpoint and hands the extractor an already-parsed JSON
//! tree. Header values are variable-substituted with the source's base
//! context before sending, so secrets like `$DONATION_ALERTS_SECRET` resolve
//! from the run environment.

use std::fmt;

use serde_json::Value;

use crate::config::EventSourceConfig;
use crate::vars::{apply_vars, VarMap};

/// Error type for payload fetching. All variants are fatal to the source
/// being processed but leave other sources unaffected.
#[derive(Debug)]
pub enum FetchError {
    Client {
        reason: String,
    },
    Transport {
        url: String,
        reason: String,
    },
    Status {
        url: String,
        status: u16,
        expected: u16,
        body: String,
    },
    Decode {
        url: String,
        reason: String,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Client { reason } => {
                write!(f, "Failed to build HTTP client: {}", reason)
            }
            FetchError::Transport { url, reason } => {
                write!(f, "While fetching {}: {}", url, reason)
            }
            FetchError::Status {
                url,
                status,
                expected,
                body,
            } => write!(
                f,
                "While fetching {}, status {} != {}, text {}",
                url, status, expected, body
            ),
            FetchError::Decode { url, reason } => {
                write!(f, "While decoding response from {}: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// HTTP payload source shared across all sources in a run.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher.
    ///
    /// # Arguments
    /// * `no_verify` - skip TLS certificate verification
    pub fn new(no_verify: bool) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(no_verify)
            .build()
            .map_err(|e| FetchError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }

    /// Fetch a source's endpoint and parse the response body as JSON.
    ///
    /// # Arguments
    /// * `entry` - source config, already template-expanded
    /// * `variables` - base variable context for header substitution
    ///
    /// # Errors
    /// Returns [`FetchError`] on transport failure, a status other than
    /// `entry.valid_status`, or a non-JSON body.
    pub async fn fetch_payload(
        &self,
        entry: &EventSourceConfig,
        variables: &VarMap,
    ) -> Result<Value, FetchError> {
        tracing::info!("[{}] fetching {}...", entry.id, entry.url);

        let mut request = self.client.get(&entry.url);
        for (name, value) in &entry.headers {
            request = request.header(name, apply_vars(value, variables));
        }

        let response = request.send().await.map_err(|e| FetchError::Transport {
            url: entry.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| FetchError::Transport {
            url: entry.url.clone(),
            reason: e.to_string(),
        })?;

        if status != entry.valid_status {
            return Err(FetchError::Status {
                url: entry.url.clone(),
                status,
                expected: entry.valid_status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: entry.url.clone(),
            reason: e.to_string(),
        })
    }
}
