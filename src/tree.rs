// src/tree.rs
// =============================================================================
// This module turns the backend's flat list of file paths into a tree.
//
// Input:   ["src/a.js", "src/b.js", "readme.md"]
// Output:  (root)
//          ├── src/
//          │   ├── a.js
//          │   └── b.js
//          └── readme.md
//
// Rules:
// - Children keep the order in which their first path was seen (no sorting)
// - A node is a directory if and only if some path goes *through* it
// - Duplicate paths collapse into one node
// - Malformed paths ("", "a//b", "/a", "a/") are dropped, never fatal
//
// The tree is built in a flat arena first (Vec + HashMap keyed by full path),
// then converted to nested TreeNodes. This keeps child lookups O(1) while
// still allowing a file to be promoted to a directory by a later entry.
//
// Rust concepts:
// - Pure function: build() has no hidden state, same input -> same tree
// - Recursion: to convert the arena into nested nodes and to render it
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::debug;

/// One flat path as listed by the backend.
///
/// Backends may send more fields (GitHub sends `mode`, `sha`, ...); they are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
}

impl FileEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
}

/// A file or directory in the derived tree.
///
/// `full_path` is the parent's `full_path` + `/` + `name`; the synthetic root
/// has an empty name and an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub full_path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Looks up a node by its full path, starting from this node.
    ///
    /// An empty path returns `self`.
    pub fn find(&self, full_path: &str) -> Option<&TreeNode> {
        if full_path.is_empty() {
            return Some(self);
        }

        let mut node = self;
        for segment in full_path.split('/') {
            node = node.children.iter().find(|child| child.name == segment)?;
        }
        Some(node)
    }

    /// Full paths of every file below this node, depth first, in child order.
    pub fn file_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_files(&mut paths);
        paths
    }

    fn collect_files<'a>(&'a self, paths: &mut Vec<&'a str>) {
        if self.is_file() {
            paths.push(&self.full_path);
        }
        for child in &self.children {
            child.collect_files(paths);
        }
    }

    /// Renders the children as an indented listing, directories suffixed with '/'.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.render_into(&mut out, 0);
        }
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let suffix = if self.is_directory() { "/" } else { "" };
        // Writing into a String cannot fail
        let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), self.name, suffix);
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

// Arena slot used while building; index 0 is the root
struct Slot {
    name: String,
    full_path: String,
    is_dir: bool,
    children: Vec<usize>,
}

const ROOT: usize = 0;

/// Builds the tree for a flat listing.
///
/// Never fails: malformed entries are skipped and an empty listing gives an
/// empty root directory.
pub fn build(entries: &[FileEntry]) -> TreeNode {
    let mut slots = vec![Slot {
        name: String::new(),
        full_path: String::new(),
        is_dir: true,
        children: Vec::new(),
    }];
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let Some(segments) = split_path(&entry.path) else {
            debug!(path = %entry.path, "dropping malformed tree entry");
            continue;
        };

        let last = segments.len() - 1;
        let mut parent = ROOT;

        for (depth, segment) in segments.iter().enumerate() {
            let full_path = if parent == ROOT {
                segment.to_string()
            } else {
                format!("{}/{}", slots[parent].full_path, segment)
            };

            let slot = match by_path.get(&full_path) {
                Some(&existing) => existing,
                None => {
                    let created = slots.len();
                    slots.push(Slot {
                        name: segment.to_string(),
                        full_path: full_path.clone(),
                        is_dir: false,
                        children: Vec::new(),
                    });
                    slots[parent].children.push(created);
                    by_path.insert(full_path, created);
                    created
                }
            };

            // Used as a non-terminal segment -> it is a directory
            if depth < last {
                slots[slot].is_dir = true;
            }
            parent = slot;
        }
    }

    materialize(&slots, ROOT)
}

// Splits a path into segments, or None if the path is empty or has an empty segment
fn split_path(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }
    Some(segments)
}

fn materialize(slots: &[Slot], index: usize) -> TreeNode {
    let slot = &slots[index];
    TreeNode {
        name: slot.name.clone(),
        full_path: slot.full_path.clone(),
        kind: if slot.is_dir {
            NodeKind::Directory
        } else {
            NodeKind::File
        },
        children: slot
            .children
            .iter()
            .map(|&child| materialize(slots, child))
            .collect(),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `let ... else`?
//    - let Some(x) = expr else { ... }; binds x if the pattern matches
//    - Otherwise the else block runs, and it must leave the scope
//      (here: `continue` to the next entry)
//
// 2. Why an arena (Vec<Slot>) instead of building TreeNodes directly?
//    - A parent and its child can't both be borrowed mutably at once
//    - Indices (usize) sidestep that: slots[parent].children.push(created)
//    - Once everything is inserted we convert to the nested, owned tree
//
// 3. Why `let _ = writeln!(...)`?
//    - writeln! on a String returns fmt::Result, which can't actually fail
//    - `let _ =` says "we know, ignore it" without an unwrap()
// -----------------------------------------------------------------------------
