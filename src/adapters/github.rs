//! GitHub adapter.
//!
//! Speaks the GitHub REST API v3; a custom base URL serves GitHub
//! Enterprise instances. See: https://docs.github.com/en/rest

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::http::{self, non_empty, ApiFailure};
use super::Forge;
use crate::error::Result;
use crate::types::{filter_repositories, ListOptions, Repository, Tag};

/// GitHub API base URL
const GITHUB_API_URL: &str = "https://api.github.com";

const TAGS_PER_PAGE: u32 = 100;
const DEFAULT_LIST_PER_PAGE: u32 = 100;

/// GitHub backend for the `Forge` trait.
pub struct GitHubForge {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubForge {
    /// Create an adapter against github.com.
    pub fn new(token: impl Into<String>, http: reqwest::Client) -> Self {
        Self::with_base_url(GITHUB_API_URL, token, http)
    }

    /// Create an adapter against a custom API root (GitHub Enterprise uses
    /// `https://{domain}/api/v3`).
    pub fn with_base_url(
        api_url: impl Into<String>,
        token: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn list_all(
        &self,
        endpoint: &str,
        owner: &str,
        per_page: u32,
    ) -> std::result::Result<Vec<Repository>, ApiFailure> {
        let mut all = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = format!(
                "{}/{}/{}/repos?per_page={}&page={}",
                self.api_url, endpoint, owner, per_page, page
            );
            let repos: Vec<GitHubRepo> = http::get_json(&self.http, &url, &self.token).await?;
            let page_len = repos.len() as u32;
            all.extend(repos.into_iter().map(to_repository));
            if page_len < per_page {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}

#[async_trait]
impl Forge for GitHubForge {
    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, repo);
        let gh: GitHubRepo = http::get_json(&self.http, &url, &self.token)
            .await
            .map_err(|e| e.into_repo_error(owner, repo))?;
        Ok(to_repository(gh))
    }

    async fn fetch_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
        let mut all_tags = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = format!(
                "{}/repos/{}/{}/tags?per_page={}&page={}",
                self.api_url, owner, repo, TAGS_PER_PAGE, page
            );
            let tags: Vec<GitHubTag> = http::get_json(&self.http, &url, &self.token)
                .await
                .map_err(|e| e.into_repo_error(owner, repo))?;
            let page_len = tags.len() as u32;
            all_tags.extend(tags.into_iter().map(|t| Tag {
                name: t.name,
                commit: t.commit.map(|c| c.sha).unwrap_or_default(),
            }));
            if page_len < TAGS_PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(all_tags)
    }

    async fn list_repositories(
        &self,
        owner: &str,
        options: &ListOptions,
    ) -> Result<Vec<Repository>> {
        let per_page = if options.per_page == 0 {
            DEFAULT_LIST_PER_PAGE
        } else {
            options.per_page
        };

        let repos = match self.list_all("orgs", owner, per_page).await {
            Ok(repos) => repos,
            Err(ApiFailure::NotFound) => {
                debug!(owner, "org listing returned 404, trying user endpoint");
                self.list_all("users", owner, per_page)
                    .await
                    .map_err(|e| e.into_owner_error(owner))?
            }
            Err(ApiFailure::Other(err)) => return Err(err),
        };

        Ok(filter_repositories(repos, options))
    }
}

/// GitHub repository response
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    name: String,
    owner: Option<GitHubUser>,
    description: Option<String>,
    homepage: Option<String>,
    #[serde(default)]
    html_url: String,
    language: Option<String>,
    license: Option<GitHubLicense>,
    default_branch: Option<String>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    private: bool,
    mirror_url: Option<String>,
    parent: Option<GitHubParent>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    subscribers_count: u64,
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    topics: Vec<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    #[serde(default)]
    login: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubLicense {
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubParent {
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubTag {
    name: String,
    commit: Option<GitHubCommit>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
}

fn to_repository(gh: GitHubRepo) -> Repository {
    // "NOASSERTION" is GitHub's no-license sentinel, not an SPDX identifier.
    let license = gh
        .license
        .and_then(|l| l.spdx_id)
        .filter(|spdx| !spdx.is_empty() && spdx != "NOASSERTION");

    let (owner, logo_url) = match gh.owner {
        Some(user) => (user.login, non_empty(user.avatar_url)),
        None => (String::new(), None),
    };

    Repository {
        full_name: gh.full_name,
        owner,
        name: gh.name,
        description: non_empty(gh.description),
        homepage: non_empty(gh.homepage),
        html_url: gh.html_url,
        language: non_empty(gh.language),
        license,
        default_branch: non_empty(gh.default_branch),
        fork: gh.fork,
        archived: gh.archived,
        private: gh.private,
        mirror_url: non_empty(gh.mirror_url),
        source_name: gh.parent.map(|p| p.full_name),
        size: gh.size,
        stargazers_count: gh.stargazers_count,
        forks_count: gh.forks_count,
        open_issues_count: gh.open_issues_count,
        subscribers_count: gh.subscribers_count,
        has_issues: gh.has_issues,
        // GitHub has no per-repository pull request toggle
        pull_requests_enabled: true,
        topics: gh.topics,
        logo_url,
        created_at: gh.created_at,
        updated_at: gh.updated_at,
        pushed_at: gh.pushed_at,
    }
}
