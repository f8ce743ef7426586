//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Clone jobs and the worker pool that processes them
//! - The completion barrier the pool waits on
//! - Statistics tracking
//! - Settings loading
//!
//! Internal implementation details are not exposed through this API.

// Core types
pub use super::barrier::CompletionBarrier;
pub use super::dispatcher::{CloneDispatcher, Cloner, DispatchError};
pub use super::job::RepositoryJob;
pub use super::stats::CloneStatistics;

// Configuration
pub use super::config::{CliOverrides, ConfigSource, Settings, DEFAULT_CONCURRENCY};

// Progress display
pub use super::progress::create_spinner;

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};

// Cancellation token handed to every Cloner
pub use tokio_util::sync::CancellationToken;
