// src/config.rs
// =============================================================================
// Runtime configuration: which backend to talk to and how.
//
// The CLI fills this in from flags and environment variables; library users
// can build one directly or start from BrowserConfig::default().
// =============================================================================

use crate::backend::{AnyBackend, GithubBackend, ServiceBackend};
use crate::error::FetchError;
use std::time::Duration;

/// Where the HTTP service listens unless told otherwise.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// The repository browser HTTP service at `base_url`.
    Service { base_url: String },
    /// GitHub's API and raw content host, no service in between.
    Github,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    pub backend: BackendKind,
    pub branch: String,
    pub timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Service {
                base_url: DEFAULT_BACKEND_URL.to_string(),
            },
            branch: DEFAULT_BRANCH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BrowserConfig {
    pub fn build_backend(&self) -> Result<AnyBackend, FetchError> {
        let backend = match &self.backend {
            BackendKind::Service { base_url } => {
                AnyBackend::Service(ServiceBackend::new(base_url, &self.branch, self.timeout)?)
            }
            BackendKind::Github => {
                AnyBackend::Github(GithubBackend::new(&self.branch, self.timeout)?)
            }
        };
        Ok(backend)
    }
}
