//! Per-run orchestration.
//!
//! One run loads config and state, processes every configured source in
//! order, prints the results table, delivers notifications for new revisions
//! and persists state. Per-source failures are logged with the source id and
//! never abort the rest of the run; only config/state/client setup failures
//! are fatal.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{AppConfig, ConfigError, EventSourceConfig};
use crate::extract::{process_event, ExtractError, ReleaseInfo};
use crate::fetch::{FetchError, Fetcher};
use crate::notify::{NotifyError, NtfyClient};
use crate::report::render_results;
use crate::state::{StateError, StateStore};
use crate::templates::{TemplateError, TemplateRegistry};
use crate::vars::VarMap;

pub const CONFIG_FILE: &str = "config.yaml";
pub const CRONTAB_FILE: &str = "crontab";

/// Options for one run, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding `config.yaml` and `state.yaml`
    pub data_dir: PathBuf,
    /// Skip reading and writing saved state
    pub no_store: bool,
    /// Write a crontab file for the configured schedule
    pub write_crontab: bool,
}

/// Error type for run-level failures
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
    State(StateError),
    Fetch(FetchError),
    Notify(NotifyError),
    Crontab { path: String, reason: String },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Config(err) => write!(f, "{}", err),
            RunError::State(err) => write!(f, "{}", err),
            RunError::Fetch(err) => write!(f, "{}", err),
            RunError::Notify(err) => write!(f, "{}", err),
            RunError::Crontab { path, reason } => {
                write!(f, "Failed to write crontab file {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for RunError {}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        RunError::Config(err)
    }
}

impl From<StateError> for RunError {
    fn from(err: StateError) -> Self {
        RunError::State(err)
    }
}

impl From<NotifyError> for RunError {
    fn from(err: NotifyError) -> Self {
        RunError::Notify(err)
    }
}

/// Error covering one source's fetch-and-extract; fatal to that source only.
#[derive(Debug)]
pub enum SourceError {
    Fetch(FetchError),
    Extract(ExtractError),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Fetch(err) => write!(f, "{}", err),
            SourceError::Extract(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<FetchError> for SourceError {
    fn from(err: FetchError) -> Self {
        SourceError::Fetch(err)
    }
}

impl From<ExtractError> for SourceError {
    fn from(err: ExtractError) -> Self {
        SourceError::Extract(err)
    }
}

/// Expand a source with its named template, if one is named.
pub fn expand_event(
    registry: &TemplateRegistry,
    entry: EventSourceConfig,
) -> Result<EventSourceConfig, TemplateError> {
    if entry.template.is_empty() {
        return Ok(entry);
    }
    let name = entry.template.clone();
    registry.expand(&name, entry)
}

/// Fill in `prev_revision` and `notify` for extracted records.
pub fn diff_against_state(records: &mut [ReleaseInfo], state: &StateStore) {
    for row in records {
        row.prev_revision = state.get(&row.id).to_string();
        row.notify = row.prev_revision != row.revision;
    }
}

/// Fetch one source's payload and extract its records.
async fn process_source(
    fetcher: &Fetcher,
    entry: &EventSourceConfig,
    env: &VarMap,
) -> Result<Vec<ReleaseInfo>, SourceError> {
    let mut variables = env.clone();
    variables.insert("ID".to_string(), entry.id.clone());

    let payload: Value = fetcher.fetch_payload(entry, &variables).await?;
    Ok(process_event(entry, &payload, env)?)
}

fn write_crontab(schedule: &str, data_dir: &Path) -> Result<(), RunError> {
    let exe = env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "relwatch".to_string());
    let line = format!("{} {} --data-dir {}\n", schedule, exe, data_dir.display());

    fs::write(CRONTAB_FILE, line).map_err(|e| RunError::Crontab {
        path: CRONTAB_FILE.to_string(),
        reason: e.to_string(),
    })
}

/// Execute one full run.
///
/// # Errors
/// Returns [`RunError`] for config/state loading, HTTP client setup, crontab
/// writing or state saving failures. Per-source and per-delivery failures are
/// logged and absorbed.
pub async fn run(opts: &RunOptions) -> Result<(), RunError> {
    let config = AppConfig::load_from_file(opts.data_dir.join(CONFIG_FILE))?;
    let mut state = if opts.no_store {
        StateStore::ephemeral()
    } else {
        StateStore::load(&opts.data_dir)?
    };
    let registry = TemplateRegistry::with_known_templates();
    let fetcher = Fetcher::new(config.target.no_verify).map_err(RunError::Fetch)?;

    // Check all events
    let mut out = Vec::new();
    for entry in &config.events {
        let entry = match expand_event(&registry, entry.clone()) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::error!("{}, event skipped", err);
                continue;
            }
        };

        match process_source(&fetcher, &entry, &config.env).await {
            Ok(mut records) => {
                diff_against_state(&mut records, &state);
                out.append(&mut records);
            }
            Err(err) => {
                tracing::error!("[{}] source failed: {}", entry.id, err);
            }
        }
    }

    // Print results
    println!("{}", render_results(&out));

    // Send notifications and update state
    let ntfy = NtfyClient::new(&config.target)?;
    for row in &out {
        if !row.notify {
            continue;
        }

        if let Err(err) = ntfy.send(row).await {
            tracing::error!("[{}] {}", row.id, err);
        }

        state.set(row.id.clone(), row.revision.clone());
    }

    // Create crontab, if required
    if opts.write_crontab {
        write_crontab(&config.cron_schedule, &opts.data_dir)?;
    }

    state.save()?;
    Ok(())
}
