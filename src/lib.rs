//! forges - provider-agnostic client for source code forges
//!
//! Resolves a repository URL (or a domain + owner pair) to the hosting
//! provider that operates it — GitHub, GitLab, Gitea/Forgejo, or Bitbucket —
//! dispatches to the matching backend, and returns repository metadata and
//! tag lists in one normalized shape regardless of provider.
//!
//! ```no_run
//! # async fn run() -> forges::Result<()> {
//! let client = forges::Client::new();
//! let repo = client
//!     .fetch_repository("github.com/octocat/hello-world")
//!     .await?;
//! println!("{}: {} stars", repo.full_name, repo.stargazers_count);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod client;
pub mod detect;
pub mod error;
pub mod repo_url;
pub mod types;

// Re-exports for convenience
pub use adapters::{BitbucketForge, Forge, GiteaForge, GitHubForge, GitLabForge};
pub use client::{Client, ClientBuilder, RepositoryUrlSource};
pub use detect::detect_forge_type;
pub use error::{ForgeError, Result};
pub use repo_url::{parse_repo_url, RepoRef};
pub use types::{
    filter_repositories, ArchivedFilter, ForgeKind, ForkFilter, ListOptions, Repository, Tag,
};
