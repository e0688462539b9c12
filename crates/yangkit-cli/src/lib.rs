//! # yangkit-cli — Command-Line Interface for yangkit
//!
//! Provides the `yangkit` binary.
//!
//! ## Subcommands
//!
//! - `yangkit run` (the default) builds a schema context from the bundled
//!   RFC 8345 resources, inspects the target module, and commits a sample
//!   document to a fresh data tree.
//! - `yangkit check` parses and links arbitrary YANG files and prints one
//!   summary line per module.
//!
//! ```bash
//! yangkit -v
//! yangkit run --dump
//! yangkit --config validator.yaml run
//! yangkit check my-module.yang --lib ietf-inet-types@2013-07-15.yang
//! ```
//!
//! Handlers live here so that tests can call them without a process
//! boundary; `main.rs` only parses arguments and sets up logging.

pub mod check;
pub mod config;
pub mod procedure;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. A relative path that exists below
/// `repo_root` is joined to it; otherwise it is left relative to the
/// current directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}
