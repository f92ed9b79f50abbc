//! Configuration types and YAML loader.
//!
//! A config document names a notification target, a cron schedule, a base
//! variable environment and an ordered list of event sources. Optional fields
//! have documented defaults so source entries can stay minimal.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::vars::VarMap;

/// How many candidate positions of an indexable payload are scanned and kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// Walk forward from index 0, keep the first suitable revision
    #[default]
    FirstMatch,
    /// Walk backward from index -1, keep the first suitable revision
    LastMatch,
    /// Walk forward from index 0, keep every suitable revision
    All,
}

/// One remote event source to poll for new revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSourceConfig {
    /// Unique identifier for this source
    pub id: String,

    /// Optional template name to expand this entry with ("" = none)
    #[serde(default)]
    pub template: String,

    /// Endpoint to fetch; JSON response becomes the payload
    #[serde(default)]
    pub url: String,

    /// Request headers; values are variable-substituted before sending
    #[serde(default)]
    pub headers: VarMap,

    /// Notification title template
    #[serde(default = "default_title")]
    pub title: String,

    /// Payload path template locating the revision value
    #[serde(default = "default_revision_path")]
    pub revision_path: String,

    /// Payload path template locating the human-readable description
    #[serde(default = "default_description_path")]
    pub description_path: String,

    /// Payload path template locating a click-through URL
    #[serde(default = "default_preview_url_path")]
    pub preview_url_path: String,

    /// Expected HTTP status of the fetch
    #[serde(default = "default_valid_status")]
    pub valid_status: u16,

    #[serde(default)]
    pub index_mode: IndexMode,

    /// Optional filter; a candidate revision is accepted only if this pattern
    /// matches at the start of the revision's string form
    #[serde(default)]
    pub revision_regexp: Option<String>,
}

fn default_title() -> String {
    "New release $ID, $REVISION".to_string()
}

fn default_revision_path() -> String {
    "version".to_string()
}

fn default_description_path() -> String {
    "description".to_string()
}

fn default_preview_url_path() -> String {
    "html_url".to_string()
}

fn default_valid_status() -> u16 {
    200
}

impl EventSourceConfig {
    /// Create a config with the given id and every other field defaulted.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: String::new(),
            url: String::new(),
            headers: VarMap::new(),
            title: default_title(),
            revision_path: default_revision_path(),
            description_path: default_description_path(),
            preview_url_path: default_preview_url_path(),
            valid_status: default_valid_status(),
            index_mode: IndexMode::default(),
            revision_regexp: None,
        }
    }
}

/// Where notifications are delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NtfyTargetConfig {
    /// ntfy topic to publish to
    pub topic: String,

    /// ntfy server base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Tag attached to every notification (rendered as an icon by ntfy)
    #[serde(default = "default_icon_tag")]
    pub icon_tag: String,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub no_verify: bool,
}

fn default_base_url() -> String {
    "https://ntfy.sh".to_string()
}

fn default_icon_tag() -> String {
    "newspaper".to_string()
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cron schedule used for crontab generation
    #[serde(default = "default_cron_schedule")]
    pub cron_schedule: String,

    pub target: NtfyTargetConfig,

    /// Event sources, processed in document order
    #[serde(default)]
    pub events: Vec<EventSourceConfig>,

    /// Base variable environment seeding every source's variable context
    /// (e.g. secrets referenced from header templates)
    #[serde(default)]
    pub env: VarMap,
}

fn default_cron_schedule() -> String {
    "0 16 * * *".to_string()
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, reason: String },
    Parse { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, reason } => {
                write!(f, "Failed to read config file {}: {}", path, reason)
            }
            ConfigError::Parse { path, reason } => {
                write!(f, "Failed to parse config file {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Load application configuration from a YAML file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or is not a valid
    /// config document.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
