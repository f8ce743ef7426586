//! Public API for git operations.
//!
//! This module provides the stable public API for git-related functionality:
//! - Cloning repositories with libgit2
//! - SSH key credentials and the passphrase prompt
//! - Clone outcomes and errors
//!
//! ## Example: Cloning from a local mirror
//!
//! ```rust,no_run
//! use gh_recurse::core::{CancellationToken, Cloner, RepositoryJob};
//! use gh_recurse::git::GitCloner;
//! use std::path::PathBuf;
//!
//! let cloner = GitCloner::from_base_url("file:///srv/mirror", PathBuf::from("."));
//! let job = RepositoryJob::new("my-org", "my-repo");
//! if let Err(e) = cloner.clone_repo(&job, &CancellationToken::new()) {
//!     eprintln!("{e}");
//! }
//! ```

// Cloning
pub use super::clone::GitCloner;

// Credentials
pub use super::credentials::{ensure_private_key, prompt_passphrase, SshCredentials};

// Outcomes
pub use super::status::{CloneError, CloneOutcome};
