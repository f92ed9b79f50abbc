//! # relwatch: Declarative Release Watcher
//!
//! relwatch polls configured remote JSON endpoints for new "releases"
//! (software releases, donation events, anything with a revision), extracts
//! revision records using a declarative path specification, compares them
//! against previously seen revisions and pushes ntfy notifications for
//! anything new.
//!
//! ## Features
//!
//! - **Declarative extraction**: address revisions inside any JSON payload
//!   with dotted/bracketed paths like `data[$INDEX].id`
//! - **Indexing modes**: take the first match, the last match (walking
//!   backward with negative indices) or every match in a sequence
//! - **Variable substitution**: `$ID`, `$INDEX`, `$REVISION` and run
//!   environment variables expand inside paths, titles and headers
//! - **Template registry**: named transforms specialize a generic source
//!   config for known APIs (Gitea releases, DonationAlerts donations)
//!
//! ## Example config
//!
//! ```yaml
//! target:
//!   topic: my-releases
//! env:
//!   DONATION_ALERTS_SECRET: "..."
//! events:
//!   - id: some-repo
//!     template: gitea_release
//!     url: https://git.example.org/owner/repo
//!   - id: donations
//!     template: donationalerts_alerts
//!   - id: plain-api
//!     url: https://api.example.org/releases.json
//!     revision_path: releases[-1].version
//!     index_mode: last_match
//! ```

// Core modules
pub mod config;
pub mod extract;
pub mod payload;
pub mod templates;
pub mod vars;

// Collaborators around the extraction core
pub mod fetch;
pub mod notify;
pub mod report;
pub mod runner;
pub mod state;

// Re-export key types
pub use config::{AppConfig, ConfigError, EventSourceConfig, IndexMode, NtfyTargetConfig};
pub use extract::{process_event, ExtractError, ReleaseInfo};
pub use payload::{parse_path, resolve, PathError, PathSegment};
pub use templates::{TemplateError, TemplateFn, TemplateRegistry};
pub use vars::{apply_vars, VarMap};

// Re-export collaborator types
pub use fetch::{FetchError, Fetcher};
pub use notify::{NotifyError, NtfyClient};
pub use runner::{run, RunError, RunOptions};
pub use state::{StateError, StateStore};
