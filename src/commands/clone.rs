//! Organisation clone command implementation
//!
//! Lists every repository of an organisation, prompts once for the SSH key
//! passphrase and clones everything through the worker pool.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::{
    create_spinner, set_terminal_title, set_terminal_title_and_flush, CloneDispatcher,
    CloneStatistics, Cloner, RepositoryJob, Settings,
};
use crate::git::{ensure_private_key, prompt_passphrase, GitCloner, SshCredentials};
use crate::github::{list_organization, GitHubClient, RepositoryLister};

const NO_REPOS_MESSAGE: &str = "No repositories found for organisation";

/// Handles the clone command for one organisation
pub async fn handle_clone_command(org: &str, settings: &Settings) -> Result<()> {
    // Set terminal title to indicate gh-recurse is running
    set_terminal_title("🚀 gh-recurse");

    let result = run_clone(org, settings).await;

    // Set terminal title to green checkbox to indicate completion
    set_terminal_title_and_flush("✅ gh-recurse");

    result
}

async fn run_clone(org: &str, settings: &Settings) -> Result<()> {
    let start_time = Instant::now();

    let client = GitHubClient::new(settings.api_url.as_str(), settings.token.clone())
        .context("Failed to build GitHub client")?;
    let jobs = list_repositories(&client, org).await?;

    if jobs.is_empty() {
        println!("{NO_REPOS_MESSAGE} {org}.");
        return Ok(());
    }

    ensure_private_key(&settings.private_key)?;
    std::fs::create_dir_all(&settings.dest)
        .with_context(|| format!("Failed to create {}", settings.dest.display()))?;

    let passphrase = prompt_passphrase()?;
    let credentials = Arc::new(SshCredentials::from_settings(settings, passphrase));

    if settings.insecure {
        warn!("⚠️  Remote host certificates will not be verified (--insecure)");
    }
    let cloner = GitCloner::over_ssh(&settings.ssh_host, settings.dest.clone(), credentials)
        .insecure(settings.insecure);

    clone_repositories(jobs, cloner, settings.concurrency, start_time).await?;
    Ok(())
}

/// Lists every repository of `org` behind a spinner
pub async fn list_repositories(
    lister: &dyn RepositoryLister,
    org: &str,
) -> Result<Vec<RepositoryJob>> {
    let spinner = create_spinner(&format!("🔍 Listing repositories for {org}..."))?;
    let result = list_organization(lister, org).await;
    spinner.finish_and_clear();

    let jobs = result.with_context(|| format!("Failed to list repositories for {org}"))?;
    info!("Found {} repositories in {}", jobs.len(), org);
    Ok(jobs)
}

/// Runs the worker pool over `jobs` and prints the summary
///
/// Returns the run's statistics, or the first fatal clone error.
pub async fn clone_repositories<C: Cloner>(
    jobs: Vec<RepositoryJob>,
    cloner: C,
    concurrency: usize,
    start_time: Instant,
) -> Result<Arc<CloneStatistics>> {
    let total_repos = jobs.len();
    let repo_word = if total_repos == 1 {
        "repository"
    } else {
        "repositories"
    };
    info!("🚀 Cloning {total_repos} {repo_word} ({concurrency} concurrent)");

    let dispatcher = CloneDispatcher::new(cloner, concurrency);
    let result = dispatcher.dispatch(jobs).await;
    let statistics = dispatcher.statistics();

    println!();
    println!("{}", statistics.generate_summary(start_time.elapsed()));
    let detailed = statistics.generate_detailed_summary();
    if !detailed.is_empty() {
        println!();
        println!("{detailed}");
    }

    result.context("Clone run aborted")?;
    Ok(statistics)
}
