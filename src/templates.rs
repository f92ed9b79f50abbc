//! Template registry for expanding source configs into known API shapes.
//!
//! A template is a named, pure transform that rewrites a generic
//! [`EventSourceConfig`] into one specialized for a known external API. The
//! registry is open: callers can register additional templates without
//! touching the extractor.

use std::collections::HashMap;
use std::fmt;

use url::Url;

use crate::config::{EventSourceConfig, IndexMode};

/// Error type for template expansion
#[derive(Debug, Clone)]
pub enum TemplateError {
    NotFound(String),
    InvalidConfig { template: String, reason: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NotFound(name) => write!(f, "Unknown template: {}", name),
            TemplateError::InvalidConfig { template, reason } => {
                write!(f, "Template '{}' rejected config: {}", template, reason)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Trait for template transform functions
pub trait TemplateFn: Send + Sync {
    /// Expand a base config into the template's specialized form
    fn expand(&self, base: EventSourceConfig) -> Result<EventSourceConfig, TemplateError>;
}

/// Simple function-based implementation of TemplateFn
impl<F> TemplateFn for F
where
    F: Fn(EventSourceConfig) -> Result<EventSourceConfig, TemplateError> + Send + Sync,
{
    fn expand(&self, base: EventSourceConfig) -> Result<EventSourceConfig, TemplateError> {
        self(base)
    }
}

/// Registry for storing and applying template transforms
pub struct TemplateRegistry {
    templates: HashMap<String, Box<dyn TemplateFn>>,
}

impl TemplateRegistry {
    /// Create a new empty template registry
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Create a registry with the built-in templates registered
    pub fn with_known_templates() -> Self {
        let mut registry = Self::new();
        registry.register("gitea_release", Box::new(gitea_release));
        registry.register("donationalerts_alerts", Box::new(donationalerts_alerts));
        registry
    }

    /// Register a template transform under a name
    pub fn register(&mut self, name: impl Into<String>, func: Box<dyn TemplateFn>) {
        self.templates.insert(name.into(), func);
    }

    /// Expand a base config with the named template.
    ///
    /// # Errors
    /// * `TemplateError::NotFound` - no template registered under `name`
    /// * `TemplateError::InvalidConfig` - the template rejected the base
    ///   config (e.g. an unparseable URL)
    pub fn expand(
        &self,
        name: &str,
        base: EventSourceConfig,
    ) -> Result<EventSourceConfig, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        template.expand(base)
    }

    /// Check if a template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Get list of all registered template names
    pub fn list_templates(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_known_templates()
    }
}

/// URL-rewriting template for Gitea release feeds.
///
/// Takes the repository URL from the base config and derives the REST
/// endpoint for its latest release, keeping `id` and `headers` untouched.
fn gitea_release(mut e: EventSourceConfig) -> Result<EventSourceConfig, TemplateError> {
    let invalid = |reason: String| TemplateError::InvalidConfig {
        template: "gitea_release".to_string(),
        reason,
    };

    let parts = Url::parse(&e.url).map_err(|err| invalid(format!("url '{}': {}", e.url, err)))?;
    let host = parts
        .host_str()
        .ok_or_else(|| invalid(format!("url '{}' has no host", e.url)))?;
    let repo_path = parts.path();

    e.title = format!("{}: Release {}, $REVISION", host, repo_path);
    e.url = format!(
        "{}://{}/api/v1/repos{}/releases/latest",
        parts.scheme(),
        host,
        repo_path
    );
    e.revision_path = "name".to_string();
    e.description_path = "body".to_string();
    e.preview_url_path = "html_url".to_string();

    Ok(e)
}

/// Full-replacement template for DonationAlerts donation feeds.
///
/// Only `id` survives from the base config; everything else points at the
/// fixed DonationAlerts endpoint. The bearer token stays a variable
/// placeholder and is resolved from the run environment at fetch time.
fn donationalerts_alerts(e: EventSourceConfig) -> Result<EventSourceConfig, TemplateError> {
    let mut out = EventSourceConfig::new(e.id);
    out.url = "https://www.donationalerts.com/api/v1/alerts/donations".to_string();
    out.headers.insert(
        "Authorization".to_string(),
        "Bearer $DONATION_ALERTS_SECRET".to_string(),
    );
    out.index_mode = IndexMode::All;
    out.title = "DonationAlerts: New donation".to_string();
    out.revision_path = "data[$INDEX].id".to_string();
    out.description_path = "data[$INDEX].message".to_string();
    Ok(out)
}
