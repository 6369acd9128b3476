//! Bitbucket adapter.
//!
//! Speaks the Bitbucket Cloud REST API 2.0. Pagination is cursor-based:
//! each page carries the absolute URL of the next one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::http::{self, non_empty};
use super::Forge;
use crate::error::Result;
use crate::types::{filter_repositories, ListOptions, Repository, Tag};

/// Bitbucket API base URL
const BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

const TAGS_PAGE_LEN: u32 = 100;
const DEFAULT_LIST_PAGE_LEN: u32 = 100;

/// Bitbucket backend for the `Forge` trait.
pub struct BitbucketForge {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl BitbucketForge {
    /// Create an adapter against bitbucket.org.
    pub fn new(token: impl Into<String>, http: reqwest::Client) -> Self {
        Self::with_base_url(BITBUCKET_API_URL, token, http)
    }

    /// Create an adapter against a custom API root (for testing).
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
}

#[async_trait]
impl Forge for BitbucketForge {
    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = format!("{}/repositories/{}/{}", self.api_url, owner, repo);
        let bb: BitbucketRepo = http::get_json(&self.http, &url, &self.token)
            .await
            .map_err(|e| e.into_repo_error(owner, repo))?;
        Ok(to_repository(bb))
    }

    async fn fetch_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
        let mut all_tags = Vec::new();
        let mut url = format!(
            "{}/repositories/{}/{}/refs/tags?pagelen={}",
            self.api_url, owner, repo, TAGS_PAGE_LEN
        );

        loop {
            let page: BitbucketPage<BitbucketTag> = http::get_json(&self.http, &url, &self.token)
                .await
                .map_err(|e| e.into_repo_error(owner, repo))?;
            all_tags.extend(page.values.into_iter().map(|t| Tag {
                name: t.name,
                commit: t.target.map(|target| target.hash).unwrap_or_default(),
            }));
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(all_tags)
    }

    /// Bitbucket has a single listing endpoint for workspaces and users, so
    /// there is no org-vs-user fallback; a 404 here is owner-not-found.
    async fn list_repositories(
        &self,
        owner: &str,
        options: &ListOptions,
    ) -> Result<Vec<Repository>> {
        let pagelen = if options.per_page == 0 {
            DEFAULT_LIST_PAGE_LEN
        } else {
            options.per_page
        };

        let mut all = Vec::new();
        let mut url = format!(
            "{}/repositories/{}?pagelen={}",
            self.api_url, owner, pagelen
        );
        loop {
            let page: BitbucketPage<BitbucketRepo> = http::get_json(&self.http, &url, &self.token)
                .await
                .map_err(|e| e.into_owner_error(owner))?;
            all.extend(page.values.into_iter().map(to_repository));
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(filter_repositories(all, options))
    }
}

/// One page of a cursor-paginated Bitbucket collection.
#[derive(Debug, Deserialize)]
struct BitbucketPage<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    next: Option<String>,
}

/// Bitbucket repository response
#[derive(Debug, Deserialize)]
struct BitbucketRepo {
    #[serde(default)]
    slug: String,
    #[serde(default)]
    full_name: String,
    description: Option<String>,
    website: Option<String>,
    language: Option<String>,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    has_issues: bool,
    mainbranch: Option<BitbucketBranch>,
    owner: Option<BitbucketAccount>,
    parent: Option<BitbucketRepoRef>,
    #[serde(default)]
    links: BitbucketLinks,
    created_on: Option<DateTime<Utc>>,
    updated_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct BitbucketBranch {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketAccount {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepoRef {
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct BitbucketLinks {
    html: Option<BitbucketLink>,
    avatar: Option<BitbucketLink>,
}

#[derive(Debug, Deserialize)]
struct BitbucketLink {
    #[serde(default)]
    href: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketTag {
    name: String,
    target: Option<BitbucketTarget>,
}

#[derive(Debug, Deserialize)]
struct BitbucketTarget {
    #[serde(default)]
    hash: String,
}

fn to_repository(bb: BitbucketRepo) -> Repository {
    let (fork, source_name) = match bb.parent {
        Some(parent) => (true, Some(parent.full_name)),
        None => (false, None),
    };

    Repository {
        full_name: bb.full_name,
        owner: bb.owner.map(|o| o.username).unwrap_or_default(),
        name: bb.slug,
        description: non_empty(bb.description),
        homepage: non_empty(bb.website),
        html_url: bb.links.html.map(|l| l.href).unwrap_or_default(),
        language: non_empty(bb.language),
        default_branch: bb.mainbranch.map(|b| b.name),
        fork,
        private: bb.is_private,
        source_name,
        size: bb.size,
        has_issues: bb.has_issues,
        logo_url: bb.links.avatar.map(|l| l.href).filter(|href| !href.is_empty()),
        created_at: bb.created_on,
        updated_at: bb.updated_on,
        ..Repository::default()
    }
}
