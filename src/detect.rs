//! Forge type detection.
//!
//! Probes a domain to classify which forge software it runs: response
//! headers first, then well-known version endpoints for servers that
//! suppress identifying headers behind a reverse proxy.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ForgeError, Result};
use crate::types::ForgeKind;

/// Probes `domain` over HTTPS to identify which forge software it runs.
///
/// Probes are strictly ordered and the first match wins. A failing header
/// probe is not fatal (API probing still runs); when every probe misses,
/// the error is terminal and never retried.
pub async fn detect_forge_type(http: &reqwest::Client, domain: &str) -> Result<ForgeKind> {
    let base_url = format!("https://{}", domain);

    match detect_from_headers(http, &base_url).await {
        Ok(kind) if kind != ForgeKind::Unknown => return Ok(kind),
        Ok(_) => debug!(domain, "no identifying headers, probing API endpoints"),
        Err(err) => debug!(domain, %err, "header probe failed, probing API endpoints"),
    }

    detect_from_api(http, &base_url).await
}

async fn detect_from_headers(http: &reqwest::Client, base_url: &str) -> Result<ForgeKind> {
    let response = http.get(base_url).send().await?;
    let headers = response.headers();

    // Forgejo instances also answer with Gitea-compatible headers; check the
    // more specific one first.
    if headers.contains_key("x-forgejo-version") {
        return Ok(ForgeKind::Forgejo);
    }
    if headers.contains_key("x-gitea-version") {
        return Ok(ForgeKind::Gitea);
    }
    if headers.contains_key("x-gitlab-meta") {
        return Ok(ForgeKind::GitLab);
    }
    if headers.contains_key("x-github-request-id") {
        return Ok(ForgeKind::GitHub);
    }

    Ok(ForgeKind::Unknown)
}

async fn detect_from_api(http: &reqwest::Client, base_url: &str) -> Result<ForgeKind> {
    // Gitea/Forgejo /api/v1/version
    if let Ok(kind) = probe_gitea_api(http, base_url).await {
        return Ok(kind);
    }

    // GitLab /api/v4/version
    if let Ok(true) = probe_url(http, &format!("{}/api/v4/version", base_url)).await {
        return Ok(ForgeKind::GitLab);
    }

    // GitHub Enterprise /api/v3/meta
    if let Ok(true) = probe_url(http, &format!("{}/api/v3/meta", base_url)).await {
        return Ok(ForgeKind::GitHub);
    }

    Err(ForgeError::DetectionFailed {
        domain: base_url.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

async fn probe_gitea_api(http: &reqwest::Client, base_url: &str) -> Result<ForgeKind> {
    let url = format!("{}/api/v1/version", base_url);
    let response = http.get(&url).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(ForgeError::Api {
            status: response.status().as_u16(),
            url,
            body: String::new(),
        });
    }

    let v: VersionResponse = response.json().await?;
    if v.version.to_lowercase().contains("forgejo") {
        Ok(ForgeKind::Forgejo)
    } else {
        Ok(ForgeKind::Gitea)
    }
}

async fn probe_url(http: &reqwest::Client, url: &str) -> Result<bool> {
    let response = http.get(url).send().await?;
    Ok(response.status() == reqwest::StatusCode::OK)
}
