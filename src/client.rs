//! Client: domain registry and request routing.
//!
//! A `Client` owns a mapping from domain to forge adapter. URLs are parsed,
//! their domain is looked up, and the call is delegated to the matching
//! adapter; unknown domains can be classified once via detection and the
//! resulting adapter is stored for reuse.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{BitbucketForge, Forge, GiteaForge, GitHubForge, GitLabForge};
use crate::detect::detect_forge_type;
use crate::error::{ForgeError, Result};
use crate::repo_url::parse_repo_url;
use crate::types::{ForgeKind, ListOptions, Repository, Tag};

/// Yields the repository URL embedded in an external package identifier.
///
/// Implemented by whatever package-URL type the caller parses with; the
/// client only needs the `repository_url` qualifier it carries.
pub trait RepositoryUrlSource {
    fn repository_url(&self) -> Option<String>;
}

/// Routes repository requests to the forge backend registered for the URL's
/// domain.
///
/// The registry is written at construction time and by `register_domain`;
/// sharing a `Client` across tasks that also register domains requires
/// external synchronization. Read-only use is freely concurrent.
pub struct Client {
    forges: HashMap<String, Arc<dyn Forge>>,
    tokens: HashMap<String, String>,
    http: reqwest::Client,
}

impl Client {
    /// Client with the default forge registrations and no tokens.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Detect the forge type for `domain` and register a matching adapter.
    ///
    /// Detection runs at most once per domain per client; later calls for
    /// the same domain route through the stored adapter. Fetches against a
    /// domain that was never registered fail with `UnregisteredDomain` —
    /// detection is opt-in, never implicit.
    pub async fn register_domain(&mut self, domain: &str, token: &str) -> Result<()> {
        let kind = detect_forge_type(&self.http, domain).await?;
        debug!(domain, %kind, "registering detected forge");

        // An empty token falls back to one configured for this domain at
        // construction time.
        let token = if token.is_empty() {
            self.tokens.get(domain).cloned().unwrap_or_default()
        } else {
            token.to_string()
        };

        let base_url = format!("https://{}", domain);
        let forge: Arc<dyn Forge> = match kind {
            ForgeKind::GitHub => Arc::new(GitHubForge::with_base_url(
                format!("{}/api/v3", base_url),
                token.as_str(),
                self.http.clone(),
            )),
            ForgeKind::GitLab => {
                Arc::new(GitLabForge::new(base_url, token.as_str(), self.http.clone()))
            }
            ForgeKind::Gitea | ForgeKind::Forgejo => {
                Arc::new(GiteaForge::new(base_url, token.as_str(), self.http.clone()))
            }
            other => {
                return Err(ForgeError::UnsupportedForge {
                    kind: other,
                    domain: domain.to_string(),
                })
            }
        };

        self.tokens.insert(domain.to_string(), token);
        self.forges.insert(domain.to_string(), forge);
        Ok(())
    }

    fn forge_for(&self, domain: &str) -> Result<&Arc<dyn Forge>> {
        self.forges
            .get(domain)
            .ok_or_else(|| ForgeError::UnregisteredDomain(domain.to_string()))
    }

    /// Fetch normalized repository metadata from a repository URL.
    pub async fn fetch_repository(&self, repo_url: &str) -> Result<Repository> {
        let parsed = parse_repo_url(repo_url)?;
        let forge = self.forge_for(&parsed.domain)?;
        forge.fetch_repository(&parsed.owner, &parsed.repo).await
    }

    /// Fetch git tags from a repository URL.
    pub async fn fetch_tags(&self, repo_url: &str) -> Result<Vec<Tag>> {
        let parsed = parse_repo_url(repo_url)?;
        let forge = self.forge_for(&parsed.domain)?;
        forge.fetch_tags(&parsed.owner, &parsed.repo).await
    }

    /// List an owner's repositories on a registered domain, narrowed by
    /// `options`.
    pub async fn list_repositories(
        &self,
        domain: &str,
        owner: &str,
        options: &ListOptions,
    ) -> Result<Vec<Repository>> {
        let forge = self.forge_for(domain)?;
        forge.list_repositories(owner, options).await
    }

    /// Fetch repository metadata via a package identifier's repository URL.
    pub async fn fetch_repository_from_purl<P: RepositoryUrlSource>(
        &self,
        purl: &P,
    ) -> Result<Repository> {
        match purl.repository_url() {
            Some(url) => self.fetch_repository(&url).await,
            None => Err(ForgeError::MissingRepositoryUrl),
        }
    }

    /// Fetch git tags via a package identifier's repository URL.
    pub async fn fetch_tags_from_purl<P: RepositoryUrlSource>(&self, purl: &P) -> Result<Vec<Tag>> {
        match purl.repository_url() {
            Some(url) => self.fetch_tags(&url).await,
            None => Err(ForgeError::MissingRepositoryUrl),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures a `Client` before construction.
#[derive(Default)]
pub struct ClientBuilder {
    http: Option<reqwest::Client>,
    tokens: HashMap<String, String>,
    hosted: Vec<(String, ForgeKind)>,
    custom: Vec<(String, Arc<dyn Forge>)>,
}

impl ClientBuilder {
    /// Override the HTTP client shared by every adapter this builder
    /// registers.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Set the API token for a domain. Tokens set here are picked up by the
    /// default registrations and by self-hosted registrations of the same
    /// domain.
    pub fn token(mut self, domain: impl Into<String>, token: impl Into<String>) -> Self {
        self.tokens.insert(domain.into(), token.into());
        self
    }

    /// Register a self-hosted Gitea or Forgejo instance at
    /// `https://{domain}`.
    pub fn gitea(self, domain: impl Into<String>, token: impl Into<String>) -> Self {
        self.hosted_instance(domain.into(), token.into(), ForgeKind::Gitea)
    }

    /// Register a self-hosted GitLab instance at `https://{domain}`.
    pub fn gitlab(self, domain: impl Into<String>, token: impl Into<String>) -> Self {
        self.hosted_instance(domain.into(), token.into(), ForgeKind::GitLab)
    }

    fn hosted_instance(mut self, domain: String, token: String, kind: ForgeKind) -> Self {
        self.tokens.insert(domain.clone(), token);
        self.hosted.push((domain, kind));
        self
    }

    /// Register a pre-built adapter for a domain, overriding any default or
    /// self-hosted registration.
    pub fn forge(mut self, domain: impl Into<String>, forge: Arc<dyn Forge>) -> Self {
        self.custom.push((domain.into(), forge));
        self
    }

    /// Build the client, filling in default registrations for github.com,
    /// gitlab.com, codeberg.org, and bitbucket.org where not overridden.
    pub fn build(self) -> Client {
        let http = self.http.unwrap_or_default();
        let tokens = self.tokens;
        let mut forges: HashMap<String, Arc<dyn Forge>> = HashMap::new();

        let token_for =
            |domain: &str| -> String { tokens.get(domain).cloned().unwrap_or_default() };

        for (domain, kind) in self.hosted {
            let base_url = format!("https://{}", domain);
            let token = token_for(&domain);
            let forge: Arc<dyn Forge> = match kind {
                ForgeKind::GitLab => Arc::new(GitLabForge::new(base_url, token, http.clone())),
                _ => Arc::new(GiteaForge::new(base_url, token, http.clone())),
            };
            forges.insert(domain, forge);
        }
        for (domain, forge) in self.custom {
            forges.insert(domain, forge);
        }

        // Defaults. Tokens may have been set before this runs.
        if !forges.contains_key("github.com") {
            forges.insert(
                "github.com".to_string(),
                Arc::new(GitHubForge::new(token_for("github.com"), http.clone())),
            );
        }
        if !forges.contains_key("gitlab.com") {
            forges.insert(
                "gitlab.com".to_string(),
                Arc::new(GitLabForge::new(
                    "https://gitlab.com",
                    token_for("gitlab.com"),
                    http.clone(),
                )),
            );
        }
        if !forges.contains_key("codeberg.org") {
            forges.insert(
                "codeberg.org".to_string(),
                Arc::new(GiteaForge::new(
                    "https://codeberg.org",
                    token_for("codeberg.org"),
                    http.clone(),
                )),
            );
        }
        if !forges.contains_key("bitbucket.org") {
            forges.insert(
                "bitbucket.org".to_string(),
                Arc::new(BitbucketForge::new(token_for("bitbucket.org"), http.clone())),
            );
        }

        Client {
            forges,
            tokens,
            http,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockForge {
        repo: Option<Repository>,
        tags: Vec<Tag>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockForge {
        fn with_repo(repo: Repository) -> Self {
            Self {
                repo: Some(repo),
                ..Self::default()
            }
        }

        fn last_call(&self) -> Option<(String, String)> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Forge for MockForge {
        async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.to_string(), repo.to_string()));
            self.repo
                .clone()
                .ok_or_else(|| ForgeError::repo_not_found(owner, repo))
        }

        async fn fetch_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.to_string(), repo.to_string()));
            Ok(self.tags.clone())
        }

        async fn list_repositories(
            &self,
            owner: &str,
            options: &ListOptions,
        ) -> Result<Vec<Repository>> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.to_string(), String::new()));
            Ok(crate::types::filter_repositories(
                self.repo.clone().into_iter().collect(),
                options,
            ))
        }
    }

    struct FakePurl(Option<String>);

    impl RepositoryUrlSource for FakePurl {
        fn repository_url(&self) -> Option<String> {
            self.0.clone()
        }
    }

    fn sample_repo() -> Repository {
        Repository {
            full_name: "test/repo".to_string(),
            owner: "test".to_string(),
            name: "repo".to_string(),
            ..Repository::default()
        }
    }

    #[test]
    fn test_default_domains_are_registered() {
        let client = Client::new();
        for domain in ["github.com", "gitlab.com", "codeberg.org", "bitbucket.org"] {
            assert!(client.forge_for(domain).is_ok(), "expected forge for {}", domain);
        }
        assert!(matches!(
            client.forge_for("example.com"),
            Err(ForgeError::UnregisteredDomain(_))
        ));
    }

    #[test]
    fn test_builder_keeps_tokens() {
        let client = Client::builder()
            .token("github.com", "ghp_secret")
            .gitea("git.example.com", "gitea-token")
            .build();
        assert_eq!(client.tokens.get("github.com").unwrap(), "ghp_secret");
        assert_eq!(client.tokens.get("git.example.com").unwrap(), "gitea-token");
        assert!(client.forge_for("git.example.com").is_ok());
    }

    #[test]
    fn test_builder_registers_self_hosted_gitlab() {
        let client = Client::builder().gitlab("code.example.com", "").build();
        assert!(client.forge_for("code.example.com").is_ok());
    }

    #[tokio::test]
    async fn test_fetch_repository_routes_to_registered_forge() {
        let mock = Arc::new(MockForge::with_repo(sample_repo()));
        let client = Client::builder()
            .forge("example.com", mock.clone())
            .build();

        let repo = client
            .fetch_repository("https://example.com/test/repo")
            .await
            .unwrap();
        assert_eq!(repo.full_name, "test/repo");
        assert_eq!(
            mock.last_call(),
            Some(("test".to_string(), "repo".to_string()))
        );
    }

    #[tokio::test]
    async fn test_fetch_tags_routes_and_forwards_arguments() {
        let mock = Arc::new(MockForge {
            tags: vec![Tag {
                name: "v1.0.0".to_string(),
                commit: "abc".to_string(),
            }],
            ..MockForge::default()
        });
        let client = Client::builder()
            .forge("example.com", mock.clone())
            .build();

        let tags = client
            .fetch_tags("git@example.com:test/repo.git")
            .await
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(
            mock.last_call(),
            Some(("test".to_string(), "repo".to_string()))
        );
    }

    #[tokio::test]
    async fn test_list_repositories_routes_by_domain() {
        let mock = Arc::new(MockForge::with_repo(sample_repo()));
        let client = Client::builder()
            .forge("example.com", mock.clone())
            .build();

        let repos = client
            .list_repositories("example.com", "test", &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(mock.last_call(), Some(("test".to_string(), String::new())));
    }

    #[tokio::test]
    async fn test_fetch_repository_unregistered_domain() {
        let client = Client::new();
        let err = client
            .fetch_repository("https://example.com/test/repo")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::UnregisteredDomain(domain) if domain == "example.com"));
    }

    #[tokio::test]
    async fn test_fetch_repository_invalid_url() {
        let client = Client::new();
        let err = client.fetch_repository("").await.unwrap_err();
        assert!(matches!(err, ForgeError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_repository_from_purl() {
        let mock = Arc::new(MockForge::with_repo(sample_repo()));
        let client = Client::builder()
            .forge("example.com", mock.clone())
            .build();

        let purl = FakePurl(Some("https://example.com/test/repo".to_string()));
        let repo = client.fetch_repository_from_purl(&purl).await.unwrap();
        assert_eq!(repo.full_name, "test/repo");
    }

    #[tokio::test]
    async fn test_purl_without_repository_url_fails() {
        let client = Client::new();
        let purl = FakePurl(None);

        let err = client.fetch_repository_from_purl(&purl).await.unwrap_err();
        assert!(matches!(err, ForgeError::MissingRepositoryUrl));

        let err = client.fetch_tags_from_purl(&purl).await.unwrap_err();
        assert!(matches!(err, ForgeError::MissingRepositoryUrl));
    }

    #[tokio::test]
    async fn test_register_domain_detection_failure_is_terminal() {
        // Nothing is listening here, so every probe fails and detection
        // reports failure rather than a transport error.
        let mut client = Client::new();
        let err = client
            .register_domain("127.0.0.1:1", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::DetectionFailed { .. }));
        assert!(client.forge_for("127.0.0.1:1").is_err());
    }
}
