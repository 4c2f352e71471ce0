// src/backend/github.rs
// =============================================================================
// This module talks to GitHub directly, without the HTTP service in between.
//
// Strategy:
// - List the whole repository with one call to the git trees API:
//     GET https://api.github.com/repos/{owner}/{repo}/git/trees/{branch}?recursive=1
//   and keep only the "blob" items (files), in the order GitHub returns them
// - Fetch file contents from raw.githubusercontent.com, which serves the raw
//   bytes of a file at a branch without any JSON/base64 wrapping
//
// Why not the contents API for files?
// - It base64-encodes the body and caps files at 1 MB
// - Raw URLs are simpler and don't count against the API rate limit
//
// Rust concepts:
// - serde rename: GitHub calls the field "type", which is a Rust keyword
// - Iterator chains: filter + map to turn tree items into FileEntry values
// =============================================================================

use super::{get_checked, http_client, with_segments, RepoBackend};
use crate::error::FetchError;
use crate::locator::RepositoryLocator;
use crate::tree::FileEntry;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use url::Url;

const GITHUB_API: &str = "https://api.github.com/";
const RAW_URL: &str = "https://raw.githubusercontent.com/";
const GITHUB_JSON: &str = "application/vnd.github.v3+json";

// Response of the git trees API (only the fields we use)
#[derive(Debug, Deserialize)]
struct GithubTree {
    tree: Vec<GithubTreeItem>,
    // Set when the repository is too large for one recursive listing
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GithubTreeItem {
    path: String,
    // "blob" for files, "tree" for directories, "commit" for submodules
    #[serde(rename = "type")]
    item_type: String,
}

pub struct GithubBackend {
    client: Client,
    api_base: Url,
    raw_base: Url,
    branch: String,
}

impl GithubBackend {
    // Creates a backend reading the given branch of every repository
    //
    // Parameters:
    //   branch: branch name, e.g. "main"
    //   timeout: per-request timeout
    pub fn new(branch: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_base: Url::parse(GITHUB_API)?,
            raw_base: Url::parse(RAW_URL)?,
            branch: branch.to_string(),
        })
    }

    // Builds the recursive git trees URL
    //
    // Example:
    //   rust-lang/rust @ main
    //   -> https://api.github.com/repos/rust-lang/rust/git/trees/main?recursive=1
    fn tree_url(&self, locator: &RepositoryLocator) -> Result<Url, FetchError> {
        let mut url = with_segments(
            &self.api_base,
            [
                "repos",
                locator.owner.as_str(),
                locator.repo.as_str(),
                "git",
                "trees",
                self.branch.as_str(),
            ],
        )?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    // Builds the raw content URL; the file path keeps its '/' separators
    //
    // Example:
    //   rust-lang/rust @ main, "src/lib.rs"
    //   -> https://raw.githubusercontent.com/rust-lang/rust/main/src/lib.rs
    fn raw_url(&self, locator: &RepositoryLocator, path: &str) -> Result<Url, FetchError> {
        let prefix = [
            locator.owner.as_str(),
            locator.repo.as_str(),
            self.branch.as_str(),
        ];
        with_segments(&self.raw_base, prefix.into_iter().chain(path.split('/')))
    }
}

// Keeps only files ("blob" items), preserving GitHub's order
fn blobs(tree: GithubTree) -> Vec<FileEntry> {
    tree.tree
        .into_iter()
        .filter(|item| item.item_type == "blob")
        .map(|item| FileEntry::new(item.path))
        .collect()
}

impl RepoBackend for GithubBackend {
    async fn tree(&self, locator: &RepositoryLocator) -> Result<Vec<FileEntry>, FetchError> {
        let url = self.tree_url(locator)?;
        let response = get_checked(&self.client, url, Some(GITHUB_JSON)).await?;
        let tree: GithubTree = response.json().await?;

        if tree.truncated {
            warn!(%locator, "GitHub truncated the tree listing; some files are missing");
        }

        Ok(blobs(tree))
    }

    async fn file_content(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> Result<String, FetchError> {
        let url = self.raw_url(locator, path)?;
        let response = get_checked(&self.client, url, None).await?;
        let content = response.text().await?;
        Ok(content)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does GitHub need a User-Agent?
//    - The GitHub API rejects requests without one (HTTP 403)
//    - http_client() in backend/mod.rs sets "repo-browser/<version>" for us
//
// 2. What does .chain() do?
//    - Joins two iterators end to end
//    - Here: [owner, repo, branch] followed by the pieces of the file path
//
// 3. Why `impl RepoBackend for GithubBackend` with `async fn`?
//    - The trait promises a future that is Send
//    - Writing `async fn` in the impl is allowed as long as the future really
//      is Send; the compiler checks that for us
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GithubBackend {
        GithubBackend::new("main", Duration::from_secs(10)).unwrap()
    }

    fn locator() -> RepositoryLocator {
        RepositoryLocator {
            owner: "rust-lang".to_string(),
            repo: "rust".to_string(),
        }
    }

    #[test]
    fn test_tree_url() {
        let url = backend().tree_url(&locator()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/rust-lang/rust/git/trees/main?recursive=1"
        );
    }

    #[test]
    fn test_raw_url_keeps_path_separators() {
        let url = backend().raw_url(&locator(), "src/tools/my tool.rs").unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/rust-lang/rust/main/src/tools/my%20tool.rs"
        );
    }

    #[test]
    fn test_blobs_keeps_files_in_order() {
        let body = r#"{
            "sha": "abc",
            "tree": [
                {"path": "src", "type": "tree", "mode": "040000"},
                {"path": "src/main.rs", "type": "blob", "mode": "100644"},
                {"path": "vendor/lib", "type": "commit", "mode": "160000"},
                {"path": "README.md", "type": "blob", "mode": "100644"}
            ],
            "truncated": false
        }"#;
        let tree: GithubTree = serde_json::from_str(body).unwrap();
        assert_eq!(
            blobs(tree),
            vec![FileEntry::new("src/main.rs"), FileEntry::new("README.md")]
        );
    }

    #[test]
    fn test_truncated_defaults_to_false() {
        let tree: GithubTree = serde_json::from_str(r#"{"tree": []}"#).unwrap();
        assert!(!tree.truncated);
    }
}
