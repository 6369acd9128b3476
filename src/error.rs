//! Error types for forge operations.

use thiserror::Error;

use crate::types::ForgeKind;

/// Errors that can occur when resolving, routing, or querying a forge.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The addressed repository does not exist or is not visible with the
    /// supplied credentials. Returned verbatim by every adapter so callers
    /// can match on a single condition.
    #[error("Repository not found: {owner}/{repo}")]
    RepoNotFound { owner: String, repo: String },

    /// Neither the organization/group nor the user listing endpoint knows
    /// this owner name.
    #[error("Owner not found: {owner}")]
    OwnerNotFound { owner: String },

    /// Any other non-success HTTP status from a forge API.
    #[error("HTTP {status} from {url}")]
    Api {
        status: u16,
        url: String,
        body: String,
    },

    /// Network/connection error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed repository reference
    #[error("Invalid repository URL: {0}")]
    InvalidUrl(String),

    /// The domain is neither pre-registered nor auto-detected
    #[error("No forge registered for domain {0:?}")]
    UnregisteredDomain(String),

    /// Probing could not classify which forge software the domain runs
    #[error("Could not detect forge type for {domain}")]
    DetectionFailed { domain: String },

    /// Detection classified the domain as something we cannot construct an
    /// adapter for.
    #[error("Unsupported forge type {kind} for {domain}")]
    UnsupportedForge { kind: ForgeKind, domain: String },

    /// The package URL carries no repository-URL qualifier
    #[error("Package URL has no repository_url qualifier")]
    MissingRepositoryUrl,
}

impl ForgeError {
    pub(crate) fn repo_not_found(owner: &str, repo: &str) -> Self {
        Self::RepoNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    pub(crate) fn owner_not_found(owner: &str) -> Self {
        Self::OwnerNotFound {
            owner: owner.to_string(),
        }
    }

    /// True for the repository-not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RepoNotFound { .. })
    }

    /// True for the owner-not-found sentinel.
    pub fn is_owner_not_found(&self) -> bool {
        matches!(self, Self::OwnerNotFound { .. })
    }
}

/// Result type for forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_not_found_message() {
        let err = ForgeError::repo_not_found("octocat", "hello-world");
        assert_eq!(err.to_string(), "Repository not found: octocat/hello-world");
        assert!(err.is_not_found());
        assert!(!err.is_owner_not_found());
    }

    #[test]
    fn test_owner_not_found_is_distinct() {
        let err = ForgeError::owner_not_found("ghost");
        assert!(err.is_owner_not_found());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_api_error_carries_diagnostics() {
        let err = ForgeError::Api {
            status: 500,
            url: "https://api.github.com/repos/a/b".to_string(),
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("https://api.github.com/repos/a/b"));
    }

    #[test]
    fn test_unsupported_forge_message() {
        let err = ForgeError::UnsupportedForge {
            kind: ForgeKind::Bitbucket,
            domain: "bb.example.com".to_string(),
        };
        assert!(err.to_string().contains("bitbucket"));
        assert!(err.to_string().contains("bb.example.com"));
    }
}
