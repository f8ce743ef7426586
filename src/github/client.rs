//! Organisation repository listing through the GitHub REST API

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::core::config::{API_PAGE_SIZE, DEFAULT_API_URL, USER_AGENT};
use crate::core::RepositoryJob;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Which repositories of an organisation to list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoKind {
    All,
    Forks,
}

impl RepoKind {
    /// Value of the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoKind::All => "all",
            RepoKind::Forks => "forks",
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from listing an organisation. All of them are fatal.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("no access token; set GITHUB_OAUTH_TOKEN or `token` in the config file")]
    MissingToken,

    #[error("GitHub rejected the access token ({status})")]
    Unauthorized { status: StatusCode },

    #[error("organisation {0:?} not found")]
    OrgNotFound(String),

    #[error("GitHub returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Source of repository names for an organisation
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    async fn list_repositories(&self, org: &str, kind: RepoKind) -> Result<Vec<RepositoryJob>, ListError>;
}

/// Lists every repository of `org`, forks included
///
/// Lists kind `all` then kind `forks` and concatenates the results. A name
/// seen twice becomes a single job so no repository is cloned twice.
pub async fn list_organization(
    lister: &dyn RepositoryLister,
    org: &str,
) -> Result<Vec<RepositoryJob>, ListError> {
    let mut repos = lister.list_repositories(org, RepoKind::All).await?;
    let forks = lister.list_repositories(org, RepoKind::Forks).await?;
    repos.extend(forks);

    let mut seen = HashSet::with_capacity(repos.len());
    repos.retain(|job| seen.insert(job.name.clone()));
    Ok(repos)
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
}

/// Minimal GitHub REST client: one paginated endpoint
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
    page_size: usize,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, ListError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            page_size: API_PAGE_SIZE,
        })
    }

    /// Client for api.github.com
    pub fn github(token: Option<String>) -> Result<Self, ListError> {
        Self::new(DEFAULT_API_URL, token)
    }

    /// Overrides the number of repositories requested per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, API_PAGE_SIZE);
        self
    }

    async fn fetch_page(
        &self,
        token: &str,
        org: &str,
        kind: RepoKind,
        page: usize,
    ) -> Result<Vec<ApiRepository>, ListError> {
        let url = format!("{}/orgs/{}/repos", self.api_url, org);
        debug!("GET {} type={} page={}", url, kind, page);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("type", kind.as_str().to_string()),
                ("per_page", self.page_size.to_string()),
                ("page", page.to_string()),
            ])
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ListError::Unauthorized { status }),
            StatusCode::NOT_FOUND => Err(ListError::OrgNotFound(org.to_string())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(ListError::Status { status, body })
            }
        }
    }
}

#[async_trait]
impl RepositoryLister for GitHubClient {
    async fn list_repositories(&self, org: &str, kind: RepoKind) -> Result<Vec<RepositoryJob>, ListError> {
        let token = self.token.as_deref().ok_or(ListError::MissingToken)?;

        let mut jobs = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.fetch_page(token, org, kind, page).await?;
            let last_page = batch.len() < self.page_size;
            jobs.extend(batch.into_iter().map(|repo| RepositoryJob::new(org, repo.name)));
            if last_page {
                break;
            }
            page += 1;
        }

        debug!("Listed {} {} repositories for {}", jobs.len(), kind, org);
        Ok(jobs)
    }
}
