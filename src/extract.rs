//! Revision extraction from parsed payloads.
//!
//! [`process_event`] walks a payload using the source's `revision_path`
//! template, producing zero or more [`ReleaseInfo`] records depending on the
//! configured [`IndexMode`]. Paths containing `$INDEX` are re-resolved per
//! iteration with the current index substituted in; the loop terminates when
//! the path stops resolving. A missing revision path is normal termination,
//! not an error.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{EventSourceConfig, IndexMode};
use crate::payload::{parse_path, resolve, PathError};
use crate::vars::{apply_vars, VarMap};

/// Description used when the description path is missing or non-string.
pub const NO_DESCRIPTION: &str = "(no description)";

/// One extracted revision record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Source id, or `"{source_id}//{revision}"` in `all` mode so multiple
    /// records from one source stay distinguishable in the state store
    pub id: String,
    pub title: String,
    pub revision: String,
    pub description: String,
    pub preview_url: String,

    /// Last seen revision for this id; filled in by the state-diff step
    #[serde(default)]
    pub prev_revision: String,

    /// Whether this record should be delivered; filled in by the state-diff step
    #[serde(default)]
    pub notify: bool,
}

/// Error type for extraction.
///
/// Only malformed configuration surfaces here: path syntax errors and invalid
/// regular expressions. Missing paths are not errors (see module docs).
#[derive(Debug)]
pub enum ExtractError {
    Path(PathError),
    Regexp { pattern: String, reason: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Path(err) => write!(f, "{}", err),
            ExtractError::Regexp { pattern, reason } => {
                write!(f, "Invalid revision_regexp '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<PathError> for ExtractError {
    fn from(err: PathError) -> Self {
        ExtractError::Path(err)
    }
}

/// String form of a payload value: strings unquoted, everything else as its
/// JSON text.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve a path template against the payload and keep the value only if it
/// is a string. Missing path or non-string value degrades to `None`; path
/// syntax errors propagate.
fn lookup_string(
    payload: &Value,
    path_template: &str,
    variables: &VarMap,
) -> Result<Option<String>, ExtractError> {
    let path = apply_vars(path_template, variables);
    let segments = parse_path(&path)?;
    Ok(match resolve(payload, &segments) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    })
}

/// Extract revision records from a payload according to the source config.
///
/// The variable context is created fresh per call, seeded from `env` plus
/// `ID`; `INDEX` and `REVISION` are set per iteration, so stale values never
/// leak between sources or between calls.
///
/// # Arguments
/// * `entry` - source config, already template-expanded
/// * `payload` - parsed JSON response body
/// * `env` - base variable environment for the run
///
/// # Returns
/// Records in iteration order: at most one for `first_match`/`last_match`,
/// zero or more for `all`. `prev_revision` and `notify` are left at their
/// defaults for the caller's state-diff step.
///
/// # Errors
/// Returns [`ExtractError`] for an invalid `revision_regexp` or a path that
/// is syntactically malformed after substitution.
pub fn process_event(
    entry: &EventSourceConfig,
    payload: &Value,
    env: &VarMap,
) -> Result<Vec<ReleaseInfo>, ExtractError> {
    let mut variables = env.clone();
    variables.insert("ID".to_string(), entry.id.clone());

    let filter = match &entry.revision_regexp {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| ExtractError::Regexp {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?),
        None => None,
    };

    let with_index = entry.revision_path.contains("$INDEX");
    let from_end = entry.index_mode == IndexMode::LastMatch;
    let index_all = entry.index_mode == IndexMode::All;
    let mut index: i64 = if from_end { -1 } else { 0 };
    let mut out = Vec::new();

    loop {
        variables.insert("INDEX".to_string(), index.to_string());

        // Find revision
        let path = apply_vars(&entry.revision_path, &variables);
        tracing::debug!("[{}] trying to read {} from payload", entry.id, path);
        let segments = parse_path(&path)?;
        let revision = match resolve(payload, &segments) {
            Some(value) => value_to_string(value),
            None => break,
        };

        // Starts-with match, like a regexp anchored at position 0
        let suitable = match &filter {
            Some(re) => re.find(&revision).map_or(false, |m| m.start() == 0),
            None => true,
        };

        if suitable {
            tracing::info!("[{}] adding {} to release info", entry.id, revision);
            let result_id = if index_all {
                format!("{}//{}", entry.id, revision)
            } else {
                entry.id.clone()
            };
            variables.insert("REVISION".to_string(), revision.clone());

            let description = lookup_string(payload, &entry.description_path, &variables)?
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());
            let preview_url =
                lookup_string(payload, &entry.preview_url_path, &variables)?.unwrap_or_default();
            let title = apply_vars(&entry.title, &variables);

            out.push(ReleaseInfo {
                id: result_id,
                title,
                revision,
                description,
                preview_url,
                prev_revision: String::new(),
                notify: false,
            });

            if !index_all {
                break;
            }
        }

        // Go to the next candidate
        if !with_index {
            break;
        } else if from_end {
            index -= 1;
        } else {
            index += 1;
        }
    }

    Ok(out)
}
