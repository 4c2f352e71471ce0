// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two layers:
// - Cli / Commands: the process arguments (backend flags + a subcommand)
// - SessionCommand: the one-line commands typed inside `repo-browser browse`
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct definitions
// - `env = "..."`: a flag can fall back to an environment variable
// =============================================================================

use clap::{Parser, Subcommand};
use repo_browser::config::{
    BackendKind, BrowserConfig, DEFAULT_BACKEND_URL, DEFAULT_BRANCH, DEFAULT_TIMEOUT_SECS,
};
use std::time::Duration;

// This struct represents our entire CLI application
//
// The backend flags are `global`, so they can be written before or after the
// subcommand: `repo-browser --github tree URL` == `repo-browser tree URL --github`
#[derive(Parser, Debug)]
#[command(
    name = "repo-browser",
    version,
    about = "Browse the file tree of a GitHub repository and read its files",
    long_about = "repo-browser lists every file of a public repository as a tree and prints \
                  file contents on demand. It talks to the repo-browser HTTP service by default, \
                  or straight to GitHub with --github."
)]
pub struct Cli {
    /// Base URL of the repo-browser HTTP service
    #[arg(long, global = true, env = "REPO_BROWSER_BACKEND", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Talk to api.github.com / raw.githubusercontent.com directly instead of the service
    #[arg(long, global = true)]
    pub github: bool,

    /// Branch to browse
    #[arg(long, global = true, env = "REPO_BROWSER_BRANCH", default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    // Turns the flags into the library's configuration struct
    pub fn config(&self) -> BrowserConfig {
        let backend = if self.github {
            BackendKind::Github
        } else {
            BackendKind::Service {
                base_url: self.backend_url.clone(),
            }
        };

        BrowserConfig {
            backend,
            branch: self.branch.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the file tree of a repository
    ///
    /// Example: repo-browser tree https://github.com/rust-lang/rust
    Tree {
        /// Repository URL (e.g., https://github.com/user/repo)
        repo_url: String,

        /// Output the tree as JSON instead of an indented listing
        #[arg(long)]
        json: bool,
    },

    /// Print the content of one file
    ///
    /// Example: repo-browser show https://github.com/rust-lang/rust README.md
    Show {
        /// Repository URL (e.g., https://github.com/user/repo)
        repo_url: String,

        /// Path of the file inside the repository (e.g., src/main.rs)
        path: String,
    },

    /// Interactive session: open repositories and read files line by line
    Browse {
        /// Repository to open right away
        repo_url: Option<String>,
    },
}

/// A line typed during `repo-browser browse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Open(String),
    Cat(String),
    Tree,
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    // Parses one input line; None for blank lines and unknown commands
    //
    // Examples:
    //   "open https://github.com/a/b" -> Open("https://github.com/a/b")
    //   "cat src/main.rs"             -> Cat("src/main.rs")
    //   "q"                           -> Quit
    pub fn parse(line: &str) -> Option<SessionCommand> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word, rest.is_empty()) {
            ("open", false) => Some(SessionCommand::Open(rest.to_string())),
            ("cat", false) => Some(SessionCommand::Cat(rest.to_string())),
            ("tree", true) => Some(SessionCommand::Tree),
            ("status", true) => Some(SessionCommand::Status),
            ("help", true) => Some(SessionCommand::Help),
            ("quit" | "exit" | "q", true) => Some(SessionCommand::Quit),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `global = true` do?
//    - The flag is accepted by every subcommand, not just the top level
//
// 2. What is split_once?
//    - Splits a string at the first match and returns both halves
//    - Returns None if there is no match (a one-word command like "tree")
//
// 3. Why match on a tuple?
//    - (word, rest.is_empty()) lets one match check both the command name and
//      whether it got an argument, so "open" without a URL falls to `_ => None`
// -----------------------------------------------------------------------------
