//! Gitea/Forgejo adapter.
//!
//! Speaks the Gitea REST API v1, which Forgejo (and codeberg.org) serve
//! compatibly. Topics live behind a secondary endpoint whose failure is
//! tolerated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{self, non_empty, ApiFailure};
use super::Forge;
use crate::error::Result;
use crate::types::{filter_repositories, ListOptions, Repository, Tag};

const TAGS_PAGE_SIZE: u32 = 50;
const DEFAULT_LIST_PAGE_SIZE: u32 = 50;

/// Gitea/Forgejo backend for the `Forge` trait.
pub struct GiteaForge {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GiteaForge {
    /// Create an adapter for the Gitea or Forgejo instance at `base_url`
    /// (e.g. `https://codeberg.org`); the `/api/v1` root is appended here.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            api_url: format!("{}/api/v1", base_url.into().trim_end_matches('/')),
            token: token.into(),
        }
    }

    async fn fetch_topics(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let url = format!("{}/repos/{}/{}/topics", self.api_url, owner, repo);
        let response: GiteaTopics = http::get_json(&self.http, &url, &self.token)
            .await
            .map_err(|e| e.into_repo_error(owner, repo))?;
        Ok(response.topics)
    }

    async fn list_all(
        &self,
        endpoint: &str,
        owner: &str,
        limit: u32,
    ) -> std::result::Result<Vec<Repository>, ApiFailure> {
        let mut all = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = format!(
                "{}/{}/{}/repos?page={}&limit={}",
                self.api_url, endpoint, owner, page, limit
            );
            let repos: Vec<GiteaRepo> = http::get_json(&self.http, &url, &self.token).await?;
            let page_len = repos.len() as u32;
            all.extend(repos.into_iter().map(to_repository));
            if page_len < limit {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}

#[async_trait]
impl Forge for GiteaForge {
    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, repo);
        let gitea_repo: GiteaRepo = http::get_json(&self.http, &url, &self.token)
            .await
            .map_err(|e| e.into_repo_error(owner, repo))?;
        let mut repository = to_repository(gitea_repo);

        // Topics live behind a secondary call; its failure leaves the
        // repository without topics rather than failing the fetch.
        match self.fetch_topics(owner, repo).await {
            Ok(topics) => repository.topics = topics,
            Err(err) => warn!(owner, repo, error = %err, "failed to fetch repository topics"),
        }

        Ok(repository)
    }

    async fn fetch_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
        let mut all_tags = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = format!(
                "{}/repos/{}/{}/tags?page={}&limit={}",
                self.api_url, owner, repo, page, TAGS_PAGE_SIZE
            );
            let tags: Vec<GiteaTag> = http::get_json(&self.http, &url, &self.token)
                .await
                .map_err(|e| e.into_repo_error(owner, repo))?;
            let page_len = tags.len() as u32;
            all_tags.extend(tags.into_iter().map(|t| Tag {
                name: t.name,
                commit: t.commit.map(|c| c.sha).unwrap_or_default(),
            }));
            if page_len < TAGS_PAGE_SIZE {
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
        let limit = if options.per_page == 0 {
            DEFAULT_LIST_PAGE_SIZE
        } else {
            options.per_page
        };

        let repos = match self.list_all("orgs", owner, limit).await {
            Ok(repos) => repos,
            Err(ApiFailure::NotFound) => {
                debug!(owner, "org listing returned 404, trying user endpoint");
                self.list_all("users", owner, limit)
                    .await
                    .map_err(|e| e.into_owner_error(owner))?
            }
            Err(ApiFailure::Other(err)) => return Err(err),
        };

        Ok(filter_repositories(repos, options))
    }
}

/// Gitea repository response
#[derive(Debug, Deserialize)]
struct GiteaRepo {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    name: String,
    owner: Option<GiteaUser>,
    description: Option<String>,
    website: Option<String>,
    #[serde(default)]
    html_url: String,
    language: Option<String>,
    default_branch: Option<String>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    mirror: bool,
    original_url: Option<String>,
    parent: Option<GiteaRepoRef>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    stars_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    has_pull_requests: bool,
    avatar_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GiteaUser {
    #[serde(default)]
    login: String,
}

#[derive(Debug, Deserialize)]
struct GiteaRepoRef {
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct GiteaTopics {
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GiteaTag {
    name: String,
    commit: Option<GiteaCommit>,
}

#[derive(Debug, Deserialize)]
struct GiteaCommit {
    sha: String,
}

fn to_repository(r: GiteaRepo) -> Repository {
    // original_url only names a mirror source when the repo is one
    let mirror_url = if r.mirror {
        non_empty(r.original_url)
    } else {
        None
    };

    Repository {
        full_name: r.full_name,
        owner: r.owner.map(|o| o.login).unwrap_or_default(),
        name: r.name,
        description: non_empty(r.description),
        homepage: non_empty(r.website),
        html_url: r.html_url,
        language: non_empty(r.language),
        default_branch: non_empty(r.default_branch),
        fork: r.fork,
        archived: r.archived,
        private: r.private,
        mirror_url,
        source_name: r.parent.map(|p| p.full_name),
        size: r.size,
        stargazers_count: r.stars_count,
        forks_count: r.forks_count,
        open_issues_count: r.open_issues_count,
        has_issues: r.has_issues,
        pull_requests_enabled: r.has_pull_requests,
        logo_url: non_empty(r.avatar_url),
        created_at: r.created_at,
        updated_at: r.updated_at,
        ..Repository::default()
    }
}
