//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod git;

pub use self::git::{create_remote_repo, create_remote_org};

use gh_recurse::core::RepositoryJob;

/// Builds jobs for `org` from a list of names
pub fn jobs(org: &str, names: &[&str]) -> Vec<RepositoryJob> {
    names.iter().map(|name| RepositoryJob::new(org, *name)).collect()
}
