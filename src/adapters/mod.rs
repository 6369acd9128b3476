//! Forge adapters implementing the `Forge` capability trait.
//!
//! One adapter per provider, each speaking its provider's REST API and
//! normalizing the native schema into the common `Repository`/`Tag` shape.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ListOptions, Repository, Tag};

mod http;

pub mod bitbucket;
pub mod gitea;
pub mod github;
pub mod gitlab;

pub use bitbucket::BitbucketForge;
pub use gitea::GiteaForge;
pub use github::GitHubForge;
pub use gitlab::GitLabForge;

/// Capability contract every forge backend satisfies.
///
/// Implementations are stateless with respect to the client registry and
/// safe to share behind an `Arc` across concurrent calls.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Fetch normalized metadata for one repository.
    ///
    /// Fails with `ForgeError::RepoNotFound` when the provider reports the
    /// repository missing; any other non-success status surfaces as
    /// `ForgeError::Api` with the status, URL, and body.
    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository>;

    /// Fetch every tag of a repository, walking all pages in provider order.
    ///
    /// Pages already fetched are discarded when a later page fails; there is
    /// no partial-result return.
    async fn fetch_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>>;

    /// List an owner's repositories, narrowed by `options`.
    ///
    /// Tries the organization/group endpoint first and falls back to the
    /// user endpoint on a not-found; when both miss, fails with
    /// `ForgeError::OwnerNotFound`.
    async fn list_repositories(
        &self,
        owner: &str,
        options: &ListOptions,
    ) -> Result<Vec<Repository>>;
}
