//! GitLab adapter.
//!
//! Speaks the GitLab REST API v4 for gitlab.com and self-hosted instances.
//! Projects are addressed by their URL-encoded `owner%2Frepo` path;
//! pagination follows the `x-next-page` response header.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::http::{self, non_empty, ApiFailure};
use super::Forge;
use crate::error::{ForgeError, Result};
use crate::types::{filter_repositories, ListOptions, Repository, Tag};

const TAGS_PER_PAGE: u32 = 100;
const DEFAULT_LIST_PER_PAGE: u32 = 100;

/// GitLab backend for the `Forge` trait.
pub struct GitLabForge {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitLabForge {
    /// Create an adapter for the GitLab instance at `base_url`
    /// (e.g. `https://gitlab.com`); the `/api/v4` root is appended here.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            api_url: format!("{}/api/v4", base_url.into().trim_end_matches('/')),
            token: token.into(),
        }
    }

    fn project_path(owner: &str, repo: &str) -> String {
        urlencoding::encode(&format!("{}/{}", owner, repo)).into_owned()
    }

    async fn list_all(
        &self,
        base_url: &str,
    ) -> std::result::Result<Vec<Repository>, ApiFailure> {
        let mut all = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = format!("{}&page={}", base_url, page);
            let response = http::get(&self.http, &url, &self.token).await?;
            let next = next_page(&response);
            let projects: Vec<GitLabProject> = response.json().await?;
            all.extend(projects.into_iter().map(to_repository));
            match next {
                Some(n) => page = n,
                None => break,
            }
        }
        Ok(all)
    }
}

#[async_trait]
impl Forge for GitLabForge {
    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = format!(
            "{}/projects/{}?license=true",
            self.api_url,
            Self::project_path(owner, repo)
        );
        let project: GitLabProject = http::get_json(&self.http, &url, &self.token)
            .await
            .map_err(|e| e.into_repo_error(owner, repo))?;
        Ok(to_repository(project))
    }

    async fn fetch_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
        let mut all_tags = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = format!(
                "{}/projects/{}/repository/tags?per_page={}&page={}",
                self.api_url,
                Self::project_path(owner, repo),
                TAGS_PER_PAGE,
                page
            );
            let response = http::get(&self.http, &url, &self.token)
                .await
                .map_err(|e| e.into_repo_error(owner, repo))?;
            let next = next_page(&response);
            let tags: Vec<GitLabTag> = response.json().await.map_err(ForgeError::from)?;
            all_tags.extend(tags.into_iter().map(|t| Tag {
                name: t.name,
                commit: t.commit.map(|c| c.id).unwrap_or_default(),
            }));
            match next {
                Some(n) => page = n,
                None => break,
            }
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
        let encoded = urlencoding::encode(owner).into_owned();

        let group_url = format!(
            "{}/groups/{}/projects?per_page={}",
            self.api_url, encoded, per_page
        );
        let repos = match self.list_all(&group_url).await {
            Ok(repos) => repos,
            Err(ApiFailure::NotFound) => {
                debug!(owner, "group listing returned 404, trying user endpoint");
                let user_url = format!(
                    "{}/users/{}/projects?per_page={}",
                    self.api_url, encoded, per_page
                );
                self.list_all(&user_url)
                    .await
                    .map_err(|e| e.into_owner_error(owner))?
            }
            Err(ApiFailure::Other(err)) => return Err(err),
        };

        Ok(filter_repositories(repos, options))
    }
}

/// Reads GitLab's `x-next-page` pagination header; absent or empty means the
/// final page.
fn next_page(response: &reqwest::Response) -> Option<u32> {
    response
        .headers()
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// GitLab project response
#[derive(Debug, Deserialize)]
struct GitLabProject {
    #[serde(default)]
    path_with_namespace: String,
    #[serde(default)]
    name: String,
    description: Option<String>,
    #[serde(default)]
    web_url: String,
    default_branch: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    visibility: String,
    #[serde(default)]
    star_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    merge_requests_enabled: bool,
    #[serde(default)]
    topics: Vec<String>,
    namespace: Option<GitLabNamespace>,
    license: Option<GitLabLicense>,
    forked_from_project: Option<GitLabProjectRef>,
    created_at: Option<DateTime<Utc>>,
    last_activity_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GitLabNamespace {
    #[serde(default)]
    path: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabLicense {
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabProjectRef {
    #[serde(default)]
    path_with_namespace: String,
}

#[derive(Debug, Deserialize)]
struct GitLabTag {
    name: String,
    commit: Option<GitLabCommit>,
}

#[derive(Debug, Deserialize)]
struct GitLabCommit {
    id: String,
}

fn to_repository(p: GitLabProject) -> Repository {
    let (owner, logo_url) = match p.namespace {
        Some(ns) => (ns.path, non_empty(ns.avatar_url)),
        None => (String::new(), None),
    };

    let (fork, source_name) = match p.forked_from_project {
        Some(parent) => (true, Some(parent.path_with_namespace)),
        None => (false, None),
    };

    Repository {
        full_name: p.path_with_namespace,
        owner,
        name: p.name,
        description: non_empty(p.description),
        html_url: p.web_url,
        default_branch: non_empty(p.default_branch),
        archived: p.archived,
        private: p.visibility == "private",
        // License keys are only present on single-project fetches with
        // `license=true`; list payloads omit them.
        license: p.license.and_then(|l| non_empty(l.key)),
        fork,
        source_name,
        stargazers_count: p.star_count,
        forks_count: p.forks_count,
        open_issues_count: p.open_issues_count,
        // GitLab has no per-project issues toggle in this payload
        has_issues: true,
        pull_requests_enabled: p.merge_requests_enabled,
        topics: p.topics,
        logo_url,
        created_at: p.created_at,
        updated_at: p.last_activity_at,
        ..Repository::default()
    }
}
