// src/lib.rs
// =============================================================================
// repo-browser: browse a public repository's file tree and read its files.
//
// Data flow:
//   URL --locator::parse--> RepositoryLocator
//       --backend.tree-->   flat FileEntry list
//       --tree::build-->    TreeNode (rendered by the UI)
//   click --backend.file_content (or ContentCache)--> file text
//
// BrowserController holds the state machine and guards against stale
// responses; Browser runs it on tokio against a RepoBackend.
// =============================================================================

pub mod backend;
pub mod browser;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod locator;
pub mod tree;

pub use backend::{AnyBackend, GithubBackend, MemoryBackend, RepoBackend, ServiceBackend};
pub use browser::Browser;
pub use cache::{ContentCache, ContentKey, ContentRecord};
pub use config::{BackendKind, BrowserConfig};
pub use controller::{
    Action, BrowserController, BrowserSnapshot, ContentRequest, ContentStatus, Epoch, Request,
    TreeRequest, TreeStatus,
};
pub use error::{BackendError, BrowserError, ErrorScope, FetchError};
pub use locator::{ParseError, RepositoryLocator};
pub use tree::{FileEntry, NodeKind, TreeNode};
