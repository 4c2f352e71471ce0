// src/error.rs
// =============================================================================
// Error types shared by the backend clients and the browser controller.
//
// Three layers:
// - FetchError:   what a backend reports for one request (HTTP, status, URL)
// - BackendError: which controller operation failed (tree vs content)
// - BrowserError: anything the presentation layer may need to show,
//                 i.e. a bad URL or a failed fetch
//
// Controller errors are kept as data (Clone + PartialEq) so they can live in
// the state snapshot. The underlying FetchError is flattened into a reason
// string at that boundary.
// =============================================================================

use crate::locator::{ParseError, RepositoryLocator};
use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, TLS or body decoding failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-HTTP backends (the in-memory backend) report failures here.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("could not load file tree for {locator}: {reason}")]
    TreeFetchFailed {
        locator: RepositoryLocator,
        reason: String,
    },

    #[error("could not load file content for {path}: {reason}")]
    ContentFetchFailed { path: String, reason: String },
}

/// Which dimension of the browser an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Tree,
    Content,
}

/// The error surfaced to the presentation layer as part of browser state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl BrowserError {
    pub fn scope(&self) -> ErrorScope {
        match self {
            BrowserError::Parse(_)
            | BrowserError::Backend(BackendError::TreeFetchFailed { .. }) => ErrorScope::Tree,
            BrowserError::Backend(BackendError::ContentFetchFailed { .. }) => ErrorScope::Content,
        }
    }

    /// Short message for the UI, one per kind of failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            BrowserError::Parse(_) => "could not parse repository URL",
            BrowserError::Backend(BackendError::TreeFetchFailed { .. }) => {
                "could not load file tree"
            }
            BrowserError::Backend(BackendError::ContentFetchFailed { .. }) => {
                "could not load file content"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> RepositoryLocator {
        RepositoryLocator {
            owner: "a".to_string(),
            repo: "b".to_string(),
        }
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let parse = BrowserError::from(ParseError::Malformed("x".to_string()));
        let tree = BrowserError::from(BackendError::TreeFetchFailed {
            locator: locator(),
            reason: "HTTP 404".to_string(),
        });
        let content = BrowserError::from(BackendError::ContentFetchFailed {
            path: "a.txt".to_string(),
            reason: "HTTP 404".to_string(),
        });

        assert_eq!(parse.user_message(), "could not parse repository URL");
        assert_eq!(tree.user_message(), "could not load file tree");
        assert_eq!(content.user_message(), "could not load file content");

        assert_eq!(parse.scope(), ErrorScope::Tree);
        assert_eq!(tree.scope(), ErrorScope::Tree);
        assert_eq!(content.scope(), ErrorScope::Content);
    }

    #[test]
    fn test_display_includes_context() {
        let error = BackendError::TreeFetchFailed {
            locator: locator(),
            reason: "HTTP 404 from http://x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "could not load file tree for a/b: HTTP 404 from http://x"
        );

        let status = FetchError::Status {
            status: 500,
            url: "http://x/repo/tree".to_string(),
        };
        assert_eq!(status.to_string(), "HTTP 500 from http://x/repo/tree");
    }
}
