//! Listing options and the repository filter.

use super::Repository;

/// How archived repositories are handled in list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchivedFilter {
    /// No constraint
    #[default]
    Include,
    /// Reject archived repositories
    Exclude,
    /// Reject non-archived repositories
    Only,
}

/// How forked repositories are handled in list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForkFilter {
    /// No constraint
    #[default]
    Include,
    /// Reject forks
    Exclude,
    /// Reject non-forks
    Only,
}

/// Configuration for a `list_repositories` call.
///
/// The archived and fork filters are orthogonal and both apply (AND
/// semantics). `per_page` is a page-size hint for the forge API; `0` lets
/// the adapter pick its default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub archived: ArchivedFilter,
    pub forks: ForkFilter,
    pub per_page: u32,
}

impl ListOptions {
    /// Whether a repository passes both the archived and the fork policy.
    pub fn matches(&self, repo: &Repository) -> bool {
        let archived_ok = match self.archived {
            ArchivedFilter::Include => true,
            ArchivedFilter::Exclude => !repo.archived,
            ArchivedFilter::Only => repo.archived,
        };
        let fork_ok = match self.forks {
            ForkFilter::Include => true,
            ForkFilter::Exclude => !repo.fork,
            ForkFilter::Only => repo.fork,
        };
        archived_ok && fork_ok
    }
}

/// Narrows a batch of repositories by the archived/fork policy in `options`,
/// preserving input order. Pure and idempotent; safe to run on any subset.
pub fn filter_repositories(repos: Vec<Repository>, options: &ListOptions) -> Vec<Repository> {
    repos
        .into_iter()
        .filter(|repo| options.matches(repo))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, archived: bool, fork: bool) -> Repository {
        Repository {
            full_name: format!("owner/{}", name),
            owner: "owner".to_string(),
            name: name.to_string(),
            archived,
            fork,
            ..Repository::default()
        }
    }

    fn sample() -> Vec<Repository> {
        vec![
            repo("active", false, false),
            repo("archived", true, false),
            repo("fork", false, true),
            repo("archived-fork", true, true),
        ]
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_default_options_keep_everything() {
        let filtered = filter_repositories(sample(), &ListOptions::default());
        assert_eq!(
            names(&filtered),
            vec!["active", "archived", "fork", "archived-fork"]
        );
    }

    #[test]
    fn test_exclude_archived_and_forks() {
        let options = ListOptions {
            archived: ArchivedFilter::Exclude,
            forks: ForkFilter::Exclude,
            ..ListOptions::default()
        };
        let filtered = filter_repositories(sample(), &options);
        assert_eq!(names(&filtered), vec!["active"]);
    }

    #[test]
    fn test_archived_only() {
        let options = ListOptions {
            archived: ArchivedFilter::Only,
            ..ListOptions::default()
        };
        let filtered = filter_repositories(sample(), &options);
        assert_eq!(names(&filtered), vec!["archived", "archived-fork"]);
    }

    #[test]
    fn test_forks_only_excluding_archived() {
        let options = ListOptions {
            archived: ArchivedFilter::Exclude,
            forks: ForkFilter::Only,
            ..ListOptions::default()
        };
        let filtered = filter_repositories(sample(), &options);
        assert_eq!(names(&filtered), vec!["fork"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let options = ListOptions {
            archived: ArchivedFilter::Exclude,
            forks: ForkFilter::Include,
            ..ListOptions::default()
        };
        let once = filter_repositories(sample(), &options);
        let twice = filter_repositories(once.clone(), &options);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let mut repos = sample();
        repos.reverse();
        let options = ListOptions {
            forks: ForkFilter::Exclude,
            ..ListOptions::default()
        };
        let filtered = filter_repositories(repos, &options);
        assert_eq!(names(&filtered), vec!["archived", "active"]);
    }
}
