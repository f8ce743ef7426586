//! Repository clone jobs

use std::fmt;
use std::path::{Path, PathBuf};

/// A single repository to clone, identified by its owning organisation and name
///
/// Jobs are immutable once enqueued and are consumed by exactly one worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepositoryJob {
    pub owner: String,
    pub name: String,
}

impl RepositoryJob {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// SSH remote for this repository, e.g. `git@github.com:rust-lang/cargo`
    pub fn ssh_url(&self, host: &str) -> String {
        format!("git@{}:{}/{}", host, self.owner, self.name)
    }

    /// Directory the repository is cloned into
    pub fn destination(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }
}

impl fmt::Display for RepositoryJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
