//! Escrow backend connection settings.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Where the escrow backend lives and which session to present to it.
///
/// Loaded from an optional JSON file; CLI flags and `MOUNTESCROW_*`
/// environment variables override individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Raw `Cookie` header value forwarded as-is.
    #[serde(default)]
    pub session_cookie: Option<String>,

    #[serde(default)]
    pub csrf_token: Option<String>,

    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            session_cookie: None,
            csrf_token: None,
            timeout_secs: defaults::timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read backend config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse backend config: {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins `path` onto the base URL with exactly one `/` between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

mod defaults {
    pub fn base_url() -> String {
        "http://localhost:5000/api".into()
    }

    pub fn timeout_secs() -> u64 {
        30
    }
}
