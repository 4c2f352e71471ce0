// src/backend/service.rs
// =============================================================================
// Client for the repository browser's HTTP service.
//
// Endpoints:
//   GET {base}/repo/tree?owner=..&repo=..&branch=..
//       -> { "files": [ { "path": "src/main.rs", ... }, ... ] }
//   GET {base}/repo/file?owner=..&repo=..&file_path=..&branch=..
//       -> { "content": "..." }
//
// Query values are URL-encoded, so paths with spaces or '&' survive the trip.
// =============================================================================

use super::{get_checked, http_client, with_segments, RepoBackend};
use crate::error::FetchError;
use crate::locator::RepositoryLocator;
use crate::tree::FileEntry;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct TreeResponse {
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
}

pub struct ServiceBackend {
    client: Client,
    base_url: Url,
    branch: String,
}

impl ServiceBackend {
    pub fn new(base_url: &str, branch: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: Url::parse(base_url)?,
            branch: branch.to_string(),
        })
    }

    fn tree_url(&self, locator: &RepositoryLocator) -> Result<Url, FetchError> {
        let mut url = with_segments(&self.base_url, ["repo", "tree"])?;
        url.query_pairs_mut()
            .append_pair("owner", &locator.owner)
            .append_pair("repo", &locator.repo)
            .append_pair("branch", &self.branch);
        Ok(url)
    }

    fn file_url(&self, locator: &RepositoryLocator, path: &str) -> Result<Url, FetchError> {
        let mut url = with_segments(&self.base_url, ["repo", "file"])?;
        url.query_pairs_mut()
            .append_pair("owner", &locator.owner)
            .append_pair("repo", &locator.repo)
            .append_pair("file_path", path)
            .append_pair("branch", &self.branch);
        Ok(url)
    }
}

impl RepoBackend for ServiceBackend {
    async fn tree(&self, locator: &RepositoryLocator) -> Result<Vec<FileEntry>, FetchError> {
        let url = self.tree_url(locator)?;
        let response = get_checked(&self.client, url, None).await?;
        let body: TreeResponse = response.json().await?;
        Ok(body.files)
    }

    async fn file_content(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> Result<String, FetchError> {
        let url = self.file_url(locator, path)?;
        let response = get_checked(&self.client, url, None).await?;
        let body: ContentResponse = response.json().await?;
        Ok(body.content)
    }
}
