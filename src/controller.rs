// src/controller.rs
// =============================================================================
// The browser's state machine.
//
// Two dimensions, each with its own epoch counter:
//
//   repository:  Idle -> Loading -> Ready        (Failed on a bad URL or fetch)
//   content:     NoSelection -> Loading -> Ready (Failed on a fetch)
//
// The controller never performs I/O. Operations hand back a request
// (TreeRequest / ContentRequest) tagged with the epoch it was issued under;
// whoever executes it feeds the result back with TreeLoaded / ContentLoaded.
// A result whose epoch is no longer current is dropped without touching state,
// so the last load/select always wins no matter which response lands first.
//
// Everything goes through dispatch(); the named methods are thin wrappers.
// =============================================================================

use crate::cache::{ContentCache, ContentKey};
use crate::error::{BackendError, BrowserError, ErrorScope, FetchError};
use crate::locator::{self, RepositoryLocator};
use crate::tree::{self, FileEntry, TreeNode};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Monotonic request counter for one class of request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentStatus {
    #[default]
    NoSelection,
    Loading,
    Ready,
    Failed,
}

/// Fetch the listing of `locator`; answer with [`Action::TreeLoaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRequest {
    pub epoch: Epoch,
    pub locator: RepositoryLocator,
}

/// Fetch the text of `path`; answer with [`Action::ContentLoaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub epoch: Epoch,
    pub locator: RepositoryLocator,
    pub path: String,
}

impl ContentRequest {
    pub fn key(&self) -> ContentKey {
        ContentKey::new(&self.locator, self.path.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Tree(TreeRequest),
    Content(ContentRequest),
}

#[derive(Debug)]
pub enum Action {
    LoadRepository(String),
    SelectFile(String),
    TreeLoaded {
        request: TreeRequest,
        result: Result<Vec<FileEntry>, FetchError>,
    },
    ContentLoaded {
        request: ContentRequest,
        result: Result<String, FetchError>,
    },
}

/// Everything the presentation layer renders.
///
/// `locator` always names the repository `tree` was built from; a load in
/// progress shows up in `loading_locator` until its listing arrives.
#[derive(Debug, Clone, Default)]
pub struct BrowserSnapshot {
    pub locator: Option<RepositoryLocator>,
    pub loading_locator: Option<RepositoryLocator>,
    pub tree: Option<Arc<TreeNode>>,
    pub selection: Option<String>,
    pub content: Option<String>,
    pub error: Option<BrowserError>,
    pub tree_status: TreeStatus,
    pub content_status: ContentStatus,
    pub is_tree_loading: bool,
    pub is_content_loading: bool,
    /// Bumped by every accepted selection, cache hits included.
    pub content_epoch: Epoch,
}

#[derive(Debug, Default)]
pub struct BrowserController {
    locator: Option<RepositoryLocator>,
    loading_locator: Option<RepositoryLocator>,
    tree: Option<Arc<TreeNode>>,
    tree_status: TreeStatus,
    tree_epoch: Epoch,
    selection: Option<String>,
    content: Option<String>,
    content_status: ContentStatus,
    content_epoch: Epoch,
    error: Option<BrowserError>,
    cache: ContentCache,
}

impl BrowserController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single state-update entry point.
    ///
    /// Returns the backend request the caller must now execute, if any.
    pub fn dispatch(&mut self, action: Action) -> Option<Request> {
        match action {
            Action::LoadRepository(url) => self.on_load_repository(&url).map(Request::Tree),
            Action::SelectFile(path) => self.on_select_file(path).map(Request::Content),
            Action::TreeLoaded { request, result } => {
                self.on_tree_loaded(request, result);
                None
            }
            Action::ContentLoaded { request, result } => {
                self.on_content_loaded(request, result);
                None
            }
        }
    }

    pub fn load_repository(&mut self, url: &str) -> Option<TreeRequest> {
        match self.dispatch(Action::LoadRepository(url.to_string())) {
            Some(Request::Tree(request)) => Some(request),
            _ => None,
        }
    }

    /// Returns `None` on a cache hit, or when the selection is not allowed
    /// (tree not ready, or the path is not a file of the current tree).
    pub fn select_file(&mut self, path: &str) -> Option<ContentRequest> {
        match self.dispatch(Action::SelectFile(path.to_string())) {
            Some(Request::Content(request)) => Some(request),
            _ => None,
        }
    }

    pub fn finish_tree(
        &mut self,
        request: TreeRequest,
        result: Result<Vec<FileEntry>, FetchError>,
    ) {
        self.dispatch(Action::TreeLoaded { request, result });
    }

    pub fn finish_content(
        &mut self,
        request: ContentRequest,
        result: Result<String, FetchError>,
    ) {
        self.dispatch(Action::ContentLoaded { request, result });
    }

    fn on_load_repository(&mut self, url: &str) -> Option<TreeRequest> {
        let locator = match locator::parse(url) {
            Ok(locator) => locator,
            Err(error) => {
                // No load starts, but the rejected URL is still the latest
                // request: orphan any listing in flight so it can't land on
                // top of this error. Tree and selection stay as they are.
                warn!(%error, "rejected repository URL");
                self.tree_epoch = self.tree_epoch.next();
                self.loading_locator = None;
                self.tree_status = TreeStatus::Failed;
                self.error = Some(error.into());
                return None;
            }
        };

        self.tree_epoch = self.tree_epoch.next();
        // Orphans any content fetch for the old selection
        self.content_epoch = self.content_epoch.next();

        // The displayed tree keeps its own locator until the new listing lands
        self.loading_locator = Some(locator.clone());
        self.tree_status = TreeStatus::Loading;
        self.selection = None;
        self.content = None;
        self.content_status = ContentStatus::NoSelection;
        self.error = None;

        debug!(%locator, epoch = self.tree_epoch.0, "requesting tree");
        Some(TreeRequest {
            epoch: self.tree_epoch,
            locator,
        })
    }

    fn on_tree_loaded(
        &mut self,
        request: TreeRequest,
        result: Result<Vec<FileEntry>, FetchError>,
    ) {
        // Superseded by a newer load (or a rejected URL): drop it untouched
        if request.epoch != self.tree_epoch {
            debug!(
                locator = %request.locator,
                epoch = request.epoch.0,
                "discarding stale tree response"
            );
            return;
        }

        // Either way this load is over
        self.loading_locator = None;

        match result {
            Ok(entries) => {
                // Flat listing -> hierarchy; replaces the old tree wholesale
                let tree = tree::build(&entries);
                info!(locator = %request.locator, entries = entries.len(), "tree loaded");
                self.tree = Some(Arc::new(tree));
                self.locator = Some(request.locator);
                self.tree_status = TreeStatus::Ready;
                self.clear_error(ErrorScope::Tree);
            }
            Err(error) => {
                // Keep the last good tree (and its locator) on screen
                warn!(locator = %request.locator, %error, "tree fetch failed");
                self.tree_status = TreeStatus::Failed;
                self.error = Some(
                    BackendError::TreeFetchFailed {
                        locator: request.locator,
                        reason: error.to_string(),
                    }
                    .into(),
                );
            }
        }
    }

    fn on_select_file(&mut self, path: String) -> Option<ContentRequest> {
        if self.tree_status != TreeStatus::Ready {
            debug!(%path, status = ?self.tree_status, "ignoring selection, tree not ready");
            return None;
        }
        let Some(locator) = self.locator.clone() else {
            return None;
        };
        let is_file = self
            .tree
            .as_ref()
            .and_then(|tree| tree.find(&path))
            .is_some_and(TreeNode::is_file);
        if !is_file {
            debug!(%path, "ignoring selection, not a file of the current tree");
            return None;
        }

        // Bumped on hits too, so a cached pick beats an older fetch still in flight
        self.content_epoch = self.content_epoch.next();
        self.selection = Some(path.clone());
        self.clear_error(ErrorScope::Content);

        let key = ContentKey::new(&locator, path.as_str());
        if let Some(record) = self.cache.get(&key) {
            debug!(%path, "content cache hit");
            self.content = Some(record.text.clone());
            self.content_status = ContentStatus::Ready;
            return None;
        }

        self.content = None;
        self.content_status = ContentStatus::Loading;

        debug!(%locator, %path, epoch = self.content_epoch.0, "requesting content");
        Some(ContentRequest {
            epoch: self.content_epoch,
            locator,
            path,
        })
    }

    fn on_content_loaded(&mut self, request: ContentRequest, result: Result<String, FetchError>) {
        if request.epoch != self.content_epoch {
            debug!(
                path = %request.path,
                epoch = request.epoch.0,
                "discarding stale content response"
            );
            return;
        }

        match result {
            Ok(text) => {
                self.cache.put(request.key(), text.clone());
                self.content = Some(text);
                self.content_status = ContentStatus::Ready;
                self.clear_error(ErrorScope::Content);
            }
            Err(error) => {
                warn!(path = %request.path, %error, "content fetch failed");
                self.content = None;
                self.content_status = ContentStatus::Failed;
                self.error = Some(
                    BackendError::ContentFetchFailed {
                        path: request.path,
                        reason: error.to_string(),
                    }
                    .into(),
                );
            }
        }
    }

    fn clear_error(&mut self, scope: ErrorScope) {
        if self.error.as_ref().map(BrowserError::scope) == Some(scope) {
            self.error = None;
        }
    }

    /// Repository the current tree belongs to.
    pub fn locator(&self) -> Option<&RepositoryLocator> {
        self.locator.as_ref()
    }

    /// Repository whose listing is being fetched right now.
    pub fn loading_locator(&self) -> Option<&RepositoryLocator> {
        self.loading_locator.as_ref()
    }

    pub fn tree(&self) -> Option<&TreeNode> {
        self.tree.as_deref()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn error(&self) -> Option<&BrowserError> {
        self.error.as_ref()
    }

    pub fn tree_status(&self) -> TreeStatus {
        self.tree_status
    }

    pub fn content_status(&self) -> ContentStatus {
        self.content_status
    }

    pub fn is_tree_loading(&self) -> bool {
        self.tree_status == TreeStatus::Loading
    }

    pub fn is_content_loading(&self) -> bool {
        self.content_status == ContentStatus::Loading
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        BrowserSnapshot {
            locator: self.locator.clone(),
            loading_locator: self.loading_locator.clone(),
            tree: self.tree.clone(),
            selection: self.selection.clone(),
            content: self.content.clone(),
            error: self.error.clone(),
            tree_status: self.tree_status,
            content_status: self.content_status,
            is_tree_loading: self.is_tree_loading(),
            is_content_loading: self.is_content_loading(),
            content_epoch: self.content_epoch,
        }
    }
}
