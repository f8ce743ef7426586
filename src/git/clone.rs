//! Repository cloning through libgit2

use git2::build::RepoBuilder;
use git2::{CertificateCheckStatus, ErrorClass, ErrorCode, FetchOptions, RemoteCallbacks};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::credentials::SshCredentials;
use super::status::CloneError;
use crate::core::config::EXISTS_ERROR_MARKER;
use crate::core::{Cloner, RepositoryJob};
use crate::utils::is_non_empty_dir;

// libgit2 keeps asking for credentials while authentication fails
const MAX_CREDENTIAL_ATTEMPTS: usize = 1;

/// Clones repositories with libgit2 into a fixed root directory
#[derive(Debug, Clone)]
pub struct GitCloner {
    remote_base: String,
    dest_root: PathBuf,
    credentials: Option<Arc<SshCredentials>>,
    insecure: bool,
}

impl GitCloner {
    /// Clones `git@<host>:<owner>/<name>` authenticating with the given key pair
    pub fn over_ssh(host: &str, dest_root: PathBuf, credentials: Arc<SshCredentials>) -> Self {
        Self {
            remote_base: format!("git@{host}:"),
            dest_root,
            credentials: Some(credentials),
            insecure: false,
        }
    }

    /// Clones `<base><owner>/<name>` without credentials, e.g. from a `file://` mirror
    pub fn from_base_url(base: &str, dest_root: PathBuf) -> Self {
        let remote_base = if base.ends_with('/') || base.ends_with(':') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        Self {
            remote_base,
            dest_root,
            credentials: None,
            insecure: false,
        }
    }

    /// Accepts every remote host certificate instead of verifying it
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Remote URL for a job
    pub fn remote_url(&self, job: &RepositoryJob) -> String {
        format!("{}{}/{}", self.remote_base, job.owner, job.name)
    }

    fn callbacks<'a>(&'a self, job: &'a RepositoryJob, cancel: &CancellationToken) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();

        if let Some(credentials) = &self.credentials {
            let attempts = Cell::new(0usize);
            callbacks.credentials(move |_url, username_from_url, _allowed| {
                if attempts.get() >= MAX_CREDENTIAL_ATTEMPTS {
                    return Err(git2::Error::new(
                        ErrorCode::Auth,
                        ErrorClass::Ssh,
                        format!(
                            "authentication failed for {} with key {}",
                            job,
                            credentials.private_key().display()
                        ),
                    ));
                }
                attempts.set(attempts.get() + 1);
                credentials.to_cred(username_from_url)
            });
        }

        if self.insecure {
            callbacks.certificate_check(|_cert, _host| Ok(CertificateCheckStatus::CertificateOk));
        }

        let token = cancel.clone();
        callbacks.transfer_progress(move |_progress| !token.is_cancelled());

        callbacks
    }
}

impl Cloner for GitCloner {
    fn clone_repo(&self, job: &RepositoryJob, cancel: &CancellationToken) -> Result<(), CloneError> {
        let destination = job.destination(&self.dest_root);
        if is_non_empty_dir(&destination) {
            return Err(CloneError::DestinationExists(format!(
                "'{}' {}",
                destination.display(),
                EXISTS_ERROR_MARKER
            )));
        }
        if cancel.is_cancelled() {
            return Err(CloneError::Cancelled);
        }

        let url = self.remote_url(job);
        debug!("Cloning {} into {}", url, destination.display());

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.callbacks(job, cancel));

        RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(&url, &destination)
            .map(|_| ())
            .map_err(|err| classify_error(err, cancel))
    }
}

/// Maps a libgit2 failure onto the clone error taxonomy
fn classify_error(err: git2::Error, cancel: &CancellationToken) -> CloneError {
    if cancel.is_cancelled() && err.code() == ErrorCode::User {
        return CloneError::Cancelled;
    }
    if err.code() == ErrorCode::Exists || err.message().contains(EXISTS_ERROR_MARKER) {
        return CloneError::DestinationExists(err.message().to_string());
    }
    CloneError::Git(err)
}
