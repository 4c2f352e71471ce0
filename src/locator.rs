// src/locator.rs
// =============================================================================
// This module turns a repository URL typed by the user into an owner/repo pair.
//
// The rule is positional: split the input on '/', and take token 3 as the
// owner and token 4 as the repository name.
//
//   "https://github.com/rust-lang/rust/tree/master"
//    0      1 2          3         4    5    6
//
// Anything after token 4 is ignored, so trailing slashes and deep links into
// the repository both work. A bare "owner/repo" (no scheme, no host) only has
// two tokens and is rejected.
//
// Rust concepts:
// - Result<T, E>: parse() never panics, it always returns one of the two
// - Display: lets us print a locator as "owner/repo"
// =============================================================================

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// Position of the owner and repo tokens after splitting on '/'
const OWNER_TOKEN: usize = 3;
const REPO_TOKEN: usize = 4;

/// Identifies a repository to the backend.
///
/// Both fields are always non-empty when produced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryLocator {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepositoryLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Why a repository URL could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than five '/'-separated tokens, or an empty owner/repo token.
    /// Holds the input as typed.
    #[error("could not parse repository URL: {0:?}")]
    Malformed(String),
}

// Parses a repository URL into a RepositoryLocator
//
// Accepted:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo/
//   - https://github.com/owner/repo/blob/main/README.md
//
// Rejected:
//   - owner/repo                  (too few tokens)
//   - https://github.com/owner    (too few tokens)
//   - https://github.com//repo    (empty owner)
pub fn parse(url: &str) -> Result<RepositoryLocator, ParseError> {
    let tokens: Vec<&str> = url.split('/').collect();

    let malformed = || ParseError::Malformed(url.to_string());

    let owner = tokens.get(OWNER_TOKEN).copied().ok_or_else(malformed)?;
    let repo = tokens.get(REPO_TOKEN).copied().ok_or_else(malformed)?;

    if owner.is_empty() || repo.is_empty() {
        return Err(malformed());
    }

    Ok(RepositoryLocator {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(owner: &str, repo: &str) -> RepositoryLocator {
        RepositoryLocator {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    #[test]
    fn test_parse_plain_url() {
        assert_eq!(
            parse("https://github.com/rust-lang/rust"),
            Ok(locator("rust-lang", "rust"))
        );
    }

    #[test]
    fn test_parse_ignores_trailing_segments() {
        assert_eq!(parse("https://github.com/a/b/"), Ok(locator("a", "b")));
        assert_eq!(
            parse("https://github.com/a/b/blob/main/src/lib.rs"),
            Ok(locator("a", "b"))
        );
    }

    #[test]
    fn test_parse_takes_tokens_three_and_four_verbatim() {
        // No host check and no ".git" stripping: the tokens are used as-is
        assert_eq!(
            parse("http://example.org/someone/thing.git"),
            Ok(locator("someone", "thing.git"))
        );
    }

    #[test]
    fn test_parse_rejects_bare_owner_repo() {
        assert_eq!(
            parse("rust-lang/rust"),
            Err(ParseError::Malformed("rust-lang/rust".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_short_or_empty_input() {
        for input in [
            "",
            "https://github.com",
            "https://github.com/owner",
            "https://github.com/owner/",
        ] {
            assert!(parse(input).is_err(), "expected {input:?} to be rejected");
        }
    }

    #[test]
    fn test_parse_rejects_empty_owner() {
        assert!(parse("https://github.com//repo").is_err());
    }

    #[test]
    fn test_display_is_owner_slash_repo() {
        assert_eq!(locator("a", "b").to_string(), "a/b");
    }
}
