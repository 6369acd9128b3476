//! Normalized repository and tag types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized metadata about a hosted repository, independent of which forge
/// hosts it.
///
/// Constructed fresh by an adapter on every fetch; an immutable value with no
/// identity across calls. `full_name` always equals `owner + "/" + name`
/// once an adapter has populated it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Full name including owner, e.g. "owner/repo"
    pub full_name: String,

    /// Owner login
    pub owner: String,

    /// Repository name (without owner prefix)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Canonical web URL
    pub html_url: String,

    /// Primary language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// SPDX identifier. `None` when the forge reports no license or an
    /// explicit "no assertion" sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    pub fork: bool,
    pub archived: bool,
    pub private: bool,

    /// URL this repository mirrors, when it is a mirror
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_url: Option<String>,

    /// Fork parent full name, when this repository is a fork
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,

    pub size: u64,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub subscribers_count: u64,

    pub has_issues: bool,
    pub pull_requests_enabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,

    /// Avatar/logo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// A git tag: a name and the commit hash it points to.
///
/// Tags keep the order the forge returned them in; no dedup is performed
/// across pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Commit SHA
    pub commit: String,
}
