//! Statistics tracking for clone runs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::git::CloneOutcome;

/// Counters for a clone run
///
/// Uses atomic counters for lock-free updates from every worker, while the
/// per-repository lists stay behind a Mutex.
#[derive(Debug, Default)]
pub struct CloneStatistics {
    pub cloned_repos: AtomicU64,
    pub skipped_repos: AtomicU64,
    pub failed_repos: AtomicU64,
    pub skipped_list: Mutex<Vec<String>>,
    pub failure_list: Mutex<Vec<(String, String)>>, // (repo_name, error_message)
}

impl CloneStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a job that finished without a fatal error
    pub fn record(&self, repo_name: &str, outcome: &CloneOutcome) {
        match outcome {
            CloneOutcome::Cloned => {
                self.cloned_repos.fetch_add(1, Ordering::Relaxed);
            }
            CloneOutcome::Skipped => {
                self.skipped_repos.fetch_add(1, Ordering::Relaxed);
                self.skipped_list
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(repo_name.to_string());
            }
        }
    }

    /// Records a job that failed fatally
    pub fn record_failure(&self, repo_name: &str, message: &str) {
        self.failed_repos.fetch_add(1, Ordering::Relaxed);
        self.failure_list
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((repo_name.to_string(), message.to_string()));
    }

    pub fn cloned(&self) -> u64 {
        self.cloned_repos.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped_repos.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed_repos.load(Ordering::Relaxed)
    }

    /// Total jobs that reached a terminal state
    pub fn processed(&self) -> u64 {
        self.cloned() + self.skipped() + self.failed()
    }

    /// Names of skipped repositories, sorted for stable output
    pub fn skipped_names(&self) -> Vec<String> {
        let mut names = self
            .skipped_list
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        names.sort();
        names
    }

    /// One-line summary of the run
    pub fn generate_summary(&self, duration: Duration) -> String {
        let duration_secs = duration.as_secs_f64();
        let failed = self.failed();

        if failed > 0 {
            format!(
                "🔴 Stopped after {:.1}s • {} cloned • {} skipped • {} failed",
                duration_secs,
                self.cloned(),
                self.skipped(),
                failed
            )
        } else {
            format!(
                "✅ Completed in {:.1}s • {} cloned • {} skipped",
                duration_secs,
                self.cloned(),
                self.skipped()
            )
        }
    }

    /// Lists repositories that need attention, one per line
    pub fn generate_detailed_summary(&self) -> String {
        let mut lines = Vec::new();

        let failures = self
            .failure_list
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if !failures.is_empty() {
            lines.push(format!("🔴 FAILED REPOS ({})", failures.len()));
            for (i, (repo_name, error)) in failures.iter().enumerate() {
                let tree_char = if i == failures.len() - 1 { "└─" } else { "├─" };
                lines.push(format!("   {tree_char} {repo_name:20} # {error}"));
            }
            lines.push(String::new());
        }

        let skipped = self.skipped_names();
        if !skipped.is_empty() {
            lines.push(format!("🟠 ALREADY PRESENT ({})", skipped.len()));
            for (i, repo_name) in skipped.iter().enumerate() {
                let tree_char = if i == skipped.len() - 1 { "└─" } else { "├─" };
                lines.push(format!("   {tree_char} {repo_name}"));
            }
        }

        if lines.last() == Some(&String::new()) {
            lines.pop();
        }

        lines.join("\n")
    }
}
