// src/backend/mod.rs
// =============================================================================
// This module defines the collaborator that actually lists repositories and
// serves file contents, plus the concrete clients:
//
// - ServiceBackend: the small HTTP service (GET /repo/tree, GET /repo/file)
// - GithubBackend:  talks to api.github.com / raw.githubusercontent.com itself
// - MemoryBackend:  in-process tables, used by tests and offline demos
//
// The browser only ever sees the RepoBackend trait.
//
// Rust concepts:
// - Traits: a shared interface several types can implement
// - `impl Future + Send` in a trait: async methods whose futures can be moved
//   into tokio::spawn
// =============================================================================

mod github;
mod memory;
mod service;

pub use github::GithubBackend;
pub use memory::MemoryBackend;
pub use service::ServiceBackend;

use crate::error::FetchError;
use crate::locator::RepositoryLocator;
use crate::tree::FileEntry;
use reqwest::{Client, Response};
use std::future::Future;
use tracing::debug;
use url::Url;

/// Read-only source of repository listings and file contents.
///
/// Both operations are idempotent and side-effect free from the browser's
/// point of view. Timeouts are the implementation's business.
pub trait RepoBackend: Send + Sync {
    /// Flat listing of the repository's file paths, in backend order.
    fn tree(
        &self,
        locator: &RepositoryLocator,
    ) -> impl Future<Output = Result<Vec<FileEntry>, FetchError>> + Send;

    /// Text content of one file.
    fn file_content(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// The backend chosen at runtime by the CLI configuration.
pub enum AnyBackend {
    Service(ServiceBackend),
    Github(GithubBackend),
}

impl RepoBackend for AnyBackend {
    async fn tree(&self, locator: &RepositoryLocator) -> Result<Vec<FileEntry>, FetchError> {
        match self {
            AnyBackend::Service(backend) => backend.tree(locator).await,
            AnyBackend::Github(backend) => backend.tree(locator).await,
        }
    }

    async fn file_content(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> Result<String, FetchError> {
        match self {
            AnyBackend::Service(backend) => backend.file_content(locator, path).await,
            AnyBackend::Github(backend) => backend.file_content(locator, path).await,
        }
    }
}

// Appends path segments to a base URL, percent-encoding each one
//
// Example:
//   base = "https://raw.githubusercontent.com/"
//   segments = ["owner", "repo", "main", "my file.md"]
//   -> "https://raw.githubusercontent.com/owner/repo/main/my%20file.md"
pub(crate) fn with_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, FetchError> {
    let mut joined = base.clone();
    joined
        .path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(joined)
}

// Sends a GET request and turns any non-2xx status into FetchError::Status
pub(crate) async fn get_checked(
    client: &Client,
    url: Url,
    accept: Option<&str>,
) -> Result<Response, FetchError> {
    debug!(%url, "GET");

    let mut request = client.get(url.clone());
    if let Some(accept) = accept {
        request = request.header(reqwest::header::ACCEPT, accept);
    }
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

// Shared HTTP client settings for the reqwest-based backends
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<Client, FetchError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("repo-browser/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_segments_encodes_each_segment() {
        let base = Url::parse("https://raw.githubusercontent.com/").unwrap();
        let url = with_segments(&base, ["o", "r", "main", "docs", "my file#1.md"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/o/r/main/docs/my%20file%231.md"
        );
    }

    #[test]
    fn test_with_segments_keeps_base_path() {
        let base = Url::parse("http://localhost:8000/api").unwrap();
        let url = with_segments(&base, ["repo", "tree"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/repo/tree");

        let base = Url::parse("http://localhost:8000/api/").unwrap();
        let url = with_segments(&base, ["repo", "tree"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/repo/tree");
    }
}
