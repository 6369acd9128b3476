//! Forge software identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which forge software a domain runs.
///
/// Produced by detection (`crate::detect`); consumed when selecting which
/// adapter to construct for a dynamically registered domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForgeKind {
    GitHub,
    GitLab,
    Gitea,
    Forgejo,
    Bitbucket,
    Unknown,
}

impl fmt::Display for ForgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Gitea => "gitea",
            Self::Forgejo => "forgejo",
            Self::Bitbucket => "bitbucket",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
