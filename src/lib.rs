//! # gh-recurse
//!
//! `gh-recurse` clones every repository of a GitHub organisation, forks
//! included, using a fixed pool of concurrent workers. It powers the
//! `gh-recurse` CLI tool.
//!
//! ## Core Features
//!
//! - **Organisation Listing**: Paginated listing of all repositories and forks.
//! - **Bounded Worker Pool**: `W` workers share one job queue and one completion barrier.
//! - **SSH Credentials**: A single passphrase prompt unlocks the key for every clone.
//! - **Fail Fast**: Existing checkouts are skipped, any other failure cancels the run.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gh_recurse::core::{CloneDispatcher, RepositoryJob};
//! use gh_recurse::git::CloneError;
//!
//! #[tokio::main]
//! async fn main() {
//!     let jobs = vec![RepositoryJob::new("my-org", "api"), RepositoryJob::new("my-org", "web")];
//!     let dispatcher = CloneDispatcher::new(
//!         |job: &RepositoryJob| -> Result<(), CloneError> {
//!             println!("would clone {job}");
//!             Ok(())
//!         },
//!         4,
//!     );
//!     dispatcher.dispatch(jobs).await.unwrap();
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod github;
pub mod utils;
