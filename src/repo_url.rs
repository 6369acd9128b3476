//! Repository reference parsing.
//!
//! Accepts `https://host/owner/repo[...]`, schemeless `host/owner/repo`, and
//! SSH-style `git@host:owner/repo[.git]` references and resolves them to a
//! (domain, owner, repo) triple.

use url::Url;

use crate::error::{ForgeError, Result};

/// A repository reference resolved to its hosting domain, owner, and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub domain: String,
    pub owner: String,
    pub repo: String,
}

/// Extracts the domain, owner, and repo from a repository URL.
///
/// Strips `.git` suffixes, ignores extra path segments (e.g. `/tree/main`),
/// and assumes `https` when no scheme is present. Domains are normalized to
/// lowercase so registry lookups cannot miss on host case.
pub fn parse_repo_url(raw: &str) -> Result<RepoRef> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ForgeError::InvalidUrl("empty URL".to_string()));
    }

    // git@ SSH URLs: git@github.com:owner/repo.git
    if let Some(rest) = raw.strip_prefix("git@") {
        return match rest.split_once(':') {
            Some((host, path)) => split_owner_repo(&host.to_ascii_lowercase(), path),
            None => Err(ForgeError::InvalidUrl(format!(
                "SSH URL missing colon: {:?}",
                raw
            ))),
        };
    }

    // Add scheme if missing
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let parsed =
        Url::parse(&with_scheme).map_err(|e| ForgeError::InvalidUrl(format!("{}: {}", raw, e)))?;

    match parsed.host_str() {
        Some(domain) => split_owner_repo(domain, parsed.path()),
        None => Err(ForgeError::InvalidUrl(format!("no host in {:?}", raw))),
    }
}

fn split_owner_repo(domain: &str, path: &str) -> Result<RepoRef> {
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(repo)) => Ok(RepoRef {
            domain: domain.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        _ => Err(ForgeError::InvalidUrl(format!(
            "path must contain owner/repo, got {:?}",
            path
        ))),
    }
}
