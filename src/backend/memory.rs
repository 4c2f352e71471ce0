// src/backend/memory.rs
// =============================================================================
// In-process backend: repositories are plain tables of (path, content).
//
// Counts every call and can delay answers per repository or per file, which
// is what the race tests need (a slow first request overtaken by a fast one).
// =============================================================================

use super::RepoBackend;
use crate::error::FetchError;
use crate::locator::RepositoryLocator;
use crate::tree::FileEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct MemoryRepo {
    files: Vec<(String, String)>,
    latency: Duration,
    file_latency: HashMap<String, Duration>,
}

/// A backend serving fixed repositories from memory, intended primarily for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    repos: HashMap<RepositoryLocator, MemoryRepo>,
    tree_calls: AtomicUsize,
    content_calls: AtomicUsize,
}

fn locator(owner: &str, repo: &str) -> RepositoryLocator {
    RepositoryLocator {
        owner: owner.to_string(),
        repo: repo.to_string(),
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a repository; file order is the listing order.
    pub fn with_repo(mut self, owner: &str, repo: &str, files: &[(&str, &str)]) -> Self {
        let entry = self.repos.entry(locator(owner, repo)).or_default();
        entry.files = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.to_string()))
            .collect();
        self
    }

    /// Delays every answer about this repository.
    pub fn with_latency(mut self, owner: &str, repo: &str, latency: Duration) -> Self {
        self.repos.entry(locator(owner, repo)).or_default().latency = latency;
        self
    }

    /// Delays content answers for one file, overriding the repository latency.
    pub fn with_file_latency(
        mut self,
        owner: &str,
        repo: &str,
        path: &str,
        latency: Duration,
    ) -> Self {
        self.repos
            .entry(locator(owner, repo))
            .or_default()
            .file_latency
            .insert(path.to_string(), latency);
        self
    }

    pub fn tree_calls(&self) -> usize {
        self.tree_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }
}

async fn delay(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

impl RepoBackend for MemoryBackend {
    async fn tree(&self, locator: &RepositoryLocator) -> Result<Vec<FileEntry>, FetchError> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);

        let repo = self
            .repos
            .get(locator)
            .ok_or_else(|| FetchError::Unavailable(format!("no repository {locator}")))?;
        delay(repo.latency).await;

        Ok(repo
            .files
            .iter()
            .map(|(path, _)| FileEntry::new(path.as_str()))
            .collect())
    }

    async fn file_content(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> Result<String, FetchError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);

        let repo = self
            .repos
            .get(locator)
            .ok_or_else(|| FetchError::Unavailable(format!("no repository {locator}")))?;
        delay(repo.file_latency.get(path).copied().unwrap_or(repo.latency)).await;

        repo.files
            .iter()
            .find(|(candidate, _)| candidate == path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| FetchError::Unavailable(format!("no file {path} in {locator}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new().with_repo(
            "a",
            "b",
            &[("src/main.rs", "fn main() {}"), ("README.md", "# b")],
        )
    }

    #[tokio::test]
    async fn test_tree_lists_files_in_order() {
        let backend = backend();
        let files = backend.tree(&locator("a", "b")).await.unwrap();
        assert_eq!(files, vec![FileEntry::new("src/main.rs"), FileEntry::new("README.md")]);
        assert_eq!(backend.tree_calls(), 1);
    }

    #[tokio::test]
    async fn test_file_content() {
        let backend = backend();
        let text = backend.file_content(&locator("a", "b"), "README.md").await.unwrap();
        assert_eq!(text, "# b");
        assert_eq!(backend.content_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_repo_and_file_fail() {
        let backend = backend();
        assert!(matches!(
            backend.tree(&locator("x", "y")).await,
            Err(FetchError::Unavailable(_))
        ));
        assert!(backend.file_content(&locator("a", "b"), "missing").await.is_err());
        // Failed calls are still counted
        assert_eq!(backend.tree_calls(), 1);
        assert_eq!(backend.content_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let backend = backend().with_latency("a", "b", Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        backend.tree(&locator("a", "b")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
