// src/cache.rs
// =============================================================================
// Session-scoped memo of file contents, keyed by (owner, repo, path).
//
// Contents are treated as a read-only snapshot: once stored, an entry is never
// replaced or evicted for the rest of the session. Text is stored exactly as
// received (no trimming, no re-encoding).
// =============================================================================

use crate::locator::RepositoryLocator;
use std::collections::HashMap;

/// Identifies one file of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl ContentKey {
    pub fn new(locator: &RepositoryLocator, path: impl Into<String>) -> Self {
        Self {
            owner: locator.owner.clone(),
            repo: locator.repo.clone(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub key: ContentKey,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ContentCache {
    records: HashMap<ContentKey, ContentRecord>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ContentKey) -> Option<&ContentRecord> {
        self.records.get(key)
    }

    /// Stores `text` under `key`. A key that is already present keeps its first text.
    pub fn put(&mut self, key: ContentKey, text: String) {
        self.records
            .entry(key)
            .or_insert_with_key(|key| ContentRecord {
                key: key.clone(),
                text,
            });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(owner: &str, repo: &str, path: &str) -> ContentKey {
        ContentKey {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_get_returns_stored_text_unchanged() {
        let mut cache = ContentCache::new();
        let texts = ["", "plain", "  padded\r\n\n", "ünïcödé ✓ 日本語", "\u{feff}bom"];

        for (i, text) in texts.iter().enumerate() {
            let k = key("o", "r", &format!("file{i}"));
            cache.put(k.clone(), text.to_string());
            assert_eq!(cache.get(&k).map(|record| record.text.as_str()), Some(*text));
        }
        assert_eq!(cache.len(), texts.len());
    }

    #[test]
    fn test_missing_key() {
        let mut cache = ContentCache::new();
        assert!(cache.is_empty());
        cache.put(key("o", "r", "a.txt"), "a".to_string());
        assert!(cache.get(&key("o", "r", "b.txt")).is_none());
        // Same path in another repository is a different key
        assert!(cache.get(&key("o", "other", "a.txt")).is_none());
    }

    #[test]
    fn test_first_put_wins() {
        let mut cache = ContentCache::new();
        let k = key("o", "r", "a.txt");
        cache.put(k.clone(), "first".to_string());
        cache.put(k.clone(), "second".to_string());
        assert_eq!(cache.get(&k).unwrap().text, "first");
        assert_eq!(cache.get(&k).unwrap().key, k);
    }

    #[test]
    fn test_key_from_locator() {
        let locator = RepositoryLocator {
            owner: "rust-lang".to_string(),
            repo: "rust".to_string(),
        };
        assert_eq!(
            ContentKey::new(&locator, "README.md"),
            key("rust-lang", "rust", "README.md")
        );
    }
}
