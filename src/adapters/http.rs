//! Shared HTTP plumbing for the REST-speaking adapters.

use serde::de::DeserializeOwned;

use crate::error::ForgeError;

/// Outcome of a status-checked GET. 404 is split out so each call site can
/// decide whether it means a missing repository or a missing owner.
#[derive(Debug)]
pub(crate) enum ApiFailure {
    NotFound,
    Other(ForgeError),
}

impl ApiFailure {
    pub(crate) fn into_repo_error(self, owner: &str, repo: &str) -> ForgeError {
        match self {
            Self::NotFound => ForgeError::repo_not_found(owner, repo),
            Self::Other(err) => err,
        }
    }

    pub(crate) fn into_owner_error(self, owner: &str) -> ForgeError {
        match self {
            Self::NotFound => ForgeError::owner_not_found(owner),
            Self::Other(err) => err,
        }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::Other(ForgeError::Network(err))
    }
}

/// GET `url`, attaching the bearer token when non-empty, and map any
/// non-success status: 404 becomes `ApiFailure::NotFound`, everything else
/// an `Api` error carrying the status, URL, and response body.
pub(crate) async fn get(
    http: &reqwest::Client,
    url: &str,
    token: &str,
) -> Result<reqwest::Response, ApiFailure> {
    let mut request = http.get(url);
    if !token.is_empty() {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiFailure::NotFound);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiFailure::Other(ForgeError::Api {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        }));
    }

    Ok(response)
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    token: &str,
) -> Result<T, ApiFailure> {
    let response = get(http, url, token).await?;
    Ok(response.json().await?)
}

/// Treats a provider's empty string as an absent value.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
