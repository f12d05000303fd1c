//! HTTP client for the Correio API
//!
//! Wraps reqwest::Client with the API base path, a request timeout and
//! uniform status handling.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::ApiError;

/// Resource path every endpoint lives under.
const API_PATH: &str = "api/correio";

/// Client bound to one deployment of the API.
pub struct CorreioClient {
    http: reqwest::Client,
    base: String,
}

impl CorreioClient {
    /// Build a client for the deployment at `base_url`.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            base: resource_base(base_url),
        })
    }

    /// Full URL of an endpoint path (`""` is the resource root).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// GET an endpoint and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        let resp = check_response(resp, &url).await?;
        Ok(resp.json().await?)
    }

    /// GET an endpoint whose "nothing there" answer is 404, 204 or an empty body.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::NO_CONTENT) {
            tracing::debug!("{} for {}, nothing pending", resp.status().as_u16(), url);
            return Ok(None);
        }

        let resp = check_response(resp, &url).await?;
        let text = resp.text().await?;
        decode_optional(&text)
    }

    /// POST a JSON body to an endpoint, ignoring the response body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let resp = self.http.post(&url).json(body).send().await?;
        check_response(resp, &url).await?;
        Ok(())
    }
}

/// `{base_url without trailing slash}/api/correio`.
fn resource_base(base_url: &Url) -> String {
    format!("{}/{}", base_url.as_str().trim_end_matches('/'), API_PATH)
}

/// Decode a body that may be empty or `null`.
fn decode_optional<T: DeserializeOwned>(text: &str) -> Result<Option<T>, ApiError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<T>>(text)?)
}

/// Check HTTP response status code and classify failures.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    tracing::debug!("{} <- {}", status.as_u16(), url);
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("HTTP {} for {}: {}", status.as_u16(), url, body);
    Err(ApiError::from_status(status, &body))
}
