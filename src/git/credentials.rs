//! SSH key credentials shared by every clone

use anyhow::{Context, Result};
use git2::Cred;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::config::{Settings, SSH_USERNAME};

/// An SSH key pair and the passphrase that unlocks it
///
/// Built once before the worker pool starts and shared read-only between
/// workers, so no locking is needed.
#[derive(Clone)]
pub struct SshCredentials {
    username: String,
    public_key: PathBuf,
    private_key: PathBuf,
    passphrase: String,
}

impl SshCredentials {
    pub fn new(public_key: PathBuf, private_key: PathBuf, passphrase: String) -> Self {
        Self {
            username: SSH_USERNAME.to_string(),
            public_key,
            private_key,
            passphrase,
        }
    }

    /// Uses the key pair paths from the resolved settings
    pub fn from_settings(settings: &Settings, passphrase: String) -> Self {
        Self::new(
            settings.public_key.clone(),
            settings.private_key.clone(),
            passphrase,
        )
    }

    pub fn private_key(&self) -> &Path {
        &self.private_key
    }

    /// Builds the libgit2 credential for one authentication attempt
    ///
    /// The username embedded in the remote URL wins over the default `git`.
    pub fn to_cred(&self, username_from_url: Option<&str>) -> Result<Cred, git2::Error> {
        let username = username_from_url.unwrap_or(&self.username);
        let public_key = self.public_key.is_file().then_some(self.public_key.as_path());
        let passphrase = (!self.passphrase.is_empty()).then_some(self.passphrase.as_str());

        Cred::ssh_key(username, public_key, &self.private_key, passphrase)
    }
}

impl fmt::Debug for SshCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshCredentials")
            .field("username", &self.username)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Fails early when the private key is missing, before any prompt or clone
pub fn ensure_private_key(private_key: &Path) -> Result<()> {
    if !private_key.is_file() {
        anyhow::bail!("SSH private key not found at {}", private_key.display());
    }
    Ok(())
}

/// Prompts once for the SSH key passphrase with a masked terminal read
///
/// An empty answer is accepted for keys without a passphrase.
pub fn prompt_passphrase() -> Result<String> {
    dialoguer::Password::new()
        .with_prompt("Enter passphrase")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read SSH key passphrase")
}
