//! GitHub organisation listing

pub(crate) mod client;

// Re-export commonly used items
pub use client::{list_organization, GitHubClient, ListError, RepoKind, RepositoryLister};
