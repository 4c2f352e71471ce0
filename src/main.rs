// src/main.rs
// =============================================================================
// This is the entry point of the repo-browser CLI.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Build the configured backend and a Browser around it
// 4. Dispatch to the subcommand handler
// 5. Exit with proper code (0 = success, 1 = browser error, 2 = internal error)
//
// Rust concepts used:
// - async/await: backend requests run on the tokio runtime
// - tokio::select!: wait for "user typed a line" OR "a response arrived"
// - Result<T, E> + anyhow: errors bubble up to main with `?`
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, SessionCommand};
use repo_browser::{AnyBackend, Browser, BrowserSnapshot, ContentStatus};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Anything unexpected (bad backend URL, stdout closed, ...) ends up here
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `tree --json` output on stdout stays parseable
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repo_browser=warn"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// Returns:
//   Ok(0) = success
//   Ok(1) = the browser ended in an error state (bad URL, fetch failed)
//   Err   = unexpected error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let backend = cli
        .config()
        .build_backend()
        .context("could not set up the backend client")?;
    let browser = Browser::new(backend);

    match cli.command {
        Commands::Tree { repo_url, json } => handle_tree(browser, &repo_url, json).await,
        Commands::Show { repo_url, path } => handle_show(browser, &repo_url, &path).await,
        Commands::Browse { repo_url } => handle_browse(browser, repo_url).await,
    }
}

// Handles the 'tree' subcommand
// Parameters:
//   repo_url: repository URL (e.g., "https://github.com/user/repo")
//   json: print the tree as JSON instead of an indented listing
async fn handle_tree(
    mut browser: Browser<AnyBackend>,
    repo_url: &str,
    json: bool,
) -> Result<i32> {
    // Keep stdout clean for JSON consumers
    if !json {
        println!("🔍 Loading repository: {}", repo_url);
    }

    // Parse the URL and start the listing request, then wait for it
    browser.load_repository(repo_url);
    browser.settle().await;

    // A bad URL or a failed fetch leaves an error in the snapshot
    let snapshot = browser.snapshot();
    if report_error(&snapshot) {
        return Ok(1);
    }
    let Some(tree) = snapshot.tree else {
        return Ok(1);
    };

    // Output results in the requested format
    if json {
        println!("{}", serde_json::to_string_pretty(&*tree)?);
    } else {
        print!("{}", tree.render());
        println!("\n📄 {} file(s)", tree.file_paths().len());
    }

    Ok(0)
}

// Handles the 'show' subcommand: load the tree, then select one file
//
// The file has to be selected through the tree, same as in `browse`, so a
// directory or a path that isn't in the listing is reported instead of fetched.
async fn handle_show(
    mut browser: Browser<AnyBackend>,
    repo_url: &str,
    path: &str,
) -> Result<i32> {
    // Step 1: load the listing
    browser.load_repository(repo_url);
    browser.settle().await;
    if report_error(&browser.snapshot()) {
        return Ok(1);
    }

    // Step 2: select the file; this is a no-op for paths that aren't files
    browser.select_file(path);
    browser.settle().await;

    let snapshot = browser.snapshot();
    if report_error(&snapshot) {
        return Ok(1);
    }

    // No content means the selection was refused
    match snapshot.content {
        Some(content) => {
            print!("{}", content);
            Ok(0)
        }
        None => {
            eprintln!("❌ {} is not a file in this repository", path);
            Ok(1)
        }
    }
}

// Handles the 'browse' subcommand
//
// Input lines and backend responses are handled as they come: a user can
// `open` another repository while the previous listing is still loading, and
// the late listing is simply ignored.
async fn handle_browse(
    mut browser: Browser<AnyBackend>,
    repo_url: Option<String>,
) -> Result<i32> {
    print_session_help();

    // The last snapshot we printed; used to print only what changed
    let mut shown = browser.snapshot();
    if let Some(url) = repo_url {
        browser.load_repository(&url);
        shown = report_changes(&shown, browser.snapshot());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                // None = stdin closed (Ctrl-D)
                let Some(line) = line.context("could not read from stdin")? else {
                    break;
                };

                match SessionCommand::parse(&line) {
                    Some(SessionCommand::Open(url)) => browser.load_repository(&url),
                    Some(SessionCommand::Cat(path)) => {
                        browser.select_file(&path);
                        if browser.snapshot().selection.as_deref() != Some(path.as_str()) {
                            println!("⚠️  {} is not a file of a loaded repository", path);
                        }
                    }
                    Some(SessionCommand::Tree) => match &browser.snapshot().tree {
                        Some(tree) => print!("{}", tree.render()),
                        None => println!("⚠️  No repository loaded"),
                    },
                    Some(SessionCommand::Status) => print_status(&browser.snapshot()),
                    Some(SessionCommand::Help) => print_session_help(),
                    Some(SessionCommand::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => println!("⚠️  Unknown command, type 'help'"),
                }
            }
            // A backend answer landed; the browser already applied it
            _ = browser.next_response() => {}
        }

        shown = report_changes(&shown, browser.snapshot());
    }

    Ok(0)
}

// Prints what changed between the last snapshot we showed and the current one,
// and returns the current one
fn report_changes(before: &BrowserSnapshot, after: BrowserSnapshot) -> BrowserSnapshot {
    if after.error != before.error {
        report_error(&after);
    }

    if after.loading_locator != before.loading_locator {
        if let Some(locator) = &after.loading_locator {
            println!("⏳ Loading {}...", locator);
        }
    }

    let tree_changed = match (&before.tree, &after.tree) {
        (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
        (None, Some(_)) => true,
        _ => false,
    };
    if let (true, Some(tree)) = (tree_changed, &after.tree) {
        print!("{}", tree.render());
        println!("📄 {} file(s)", tree.file_paths().len());
    }

    if content_changed(before, &after) {
        if let (Some(path), Some(content)) = (&after.selection, &after.content) {
            println!("───── {} ─────", path);
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }

    after
}

// True when `after` has file content the user hasn't seen printed yet
//
// Every accepted selection bumps the content epoch, so `cat` on the file that
// is already shown (a cache hit) still counts as new.
fn content_changed(before: &BrowserSnapshot, after: &BrowserSnapshot) -> bool {
    after.content_status == ContentStatus::Ready
        && (before.content_status != ContentStatus::Ready
            || before.content_epoch != after.content_epoch)
}

// Prints the current error, if any; returns whether there was one
fn report_error(snapshot: &BrowserSnapshot) -> bool {
    match &snapshot.error {
        Some(error) => {
            eprintln!("❌ {}: {}", error.user_message(), error);
            true
        }
        None => false,
    }
}

fn print_status(snapshot: &BrowserSnapshot) {
    let repository = snapshot
        .locator
        .as_ref()
        .map(|locator| locator.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("📊 Status:");
    println!("   Repository: {} ({:?})", repository, snapshot.tree_status);
    println!(
        "   Selection:  {} ({:?})",
        snapshot.selection.as_deref().unwrap_or("-"),
        snapshot.content_status
    );
    if let Some(locator) = &snapshot.loading_locator {
        println!("   Loading:    {}", locator);
    }
    if let Some(error) = &snapshot.error {
        println!("   Error:      {}", error.user_message());
    }
}

fn print_session_help() {
    println!("Commands:");
    println!("   open <url>    load a repository (e.g. open https://github.com/user/repo)");
    println!("   cat <path>    show a file of the loaded repository");
    println!("   tree          print the file tree again");
    println!("   status        show what is loaded / loading");
    println!("   help          this list");
    println!("   quit          leave (Ctrl-D works too)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_browser::{BrowserController, FileEntry};

    // A controller with one repository loaded and README.md already shown
    fn showing_readme() -> BrowserController {
        let mut controller = BrowserController::new();
        let load = controller.load_repository("https://github.com/a/b").unwrap();
        controller.finish_tree(load, Ok(vec![FileEntry::new("README.md")]));
        let select = controller.select_file("README.md").unwrap();
        controller.finish_content(select, Ok("# a/b".to_string()));
        controller
    }

    #[test]
    fn test_content_changed_when_fetch_lands() {
        let mut controller = BrowserController::new();
        let load = controller.load_repository("https://github.com/a/b").unwrap();
        controller.finish_tree(load, Ok(vec![FileEntry::new("README.md")]));
        let select = controller.select_file("README.md").unwrap();
        let loading = controller.snapshot();

        controller.finish_content(select, Ok("# a/b".to_string()));
        assert!(content_changed(&loading, &controller.snapshot()));
    }

    #[test]
    fn test_cat_on_shown_file_prints_again() {
        let mut controller = showing_readme();
        let shown = controller.snapshot();
        assert!(!content_changed(&shown, &controller.snapshot()));

        // Served from the cache: same selection, same status, new epoch
        assert!(controller.select_file("README.md").is_none());
        assert!(content_changed(&shown, &controller.snapshot()));
    }
}
