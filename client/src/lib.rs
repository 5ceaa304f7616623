//! Client-side plumbing for the review service.
//!
//! [`ApiClient`] owns the HTTP client and the service base URL; the form
//! handlers in [`handlers`] drive it with the typed forms from [`forms`].

pub mod forms;
pub mod handlers;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use shared::types::{Credentials, LoginStatus, RegisterStatus, ReviewSubmission, WriteStatus};

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` without a trailing slash, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON payload and decode the endpoint's status enum.
    ///
    /// Transport and decode failures are `Err`; every reachable business
    /// outcome, including statuses this build does not know, comes back as
    /// a value.
    pub async fn post_status<B, S>(&self, path: &str, body: &B) -> Result<S>
    where
        B: Serialize,
        S: DeserializeOwned,
    {
        Ok(self.post_status_raw(path, body).await?.0)
    }

    /// Like [`post_status`](Self::post_status), but also hands back the
    /// response body verbatim for handlers that report it.
    pub async fn post_status_raw<B, S>(&self, path: &str, body: &B) -> Result<(S, String)>
    where
        B: Serialize,
        S: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let raw = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {}", url))?;
        let status = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed response from {}: {}", url, raw))?;

        Ok((status, raw))
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginStatus> {
        self.post_status("/login", credentials).await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<RegisterStatus> {
        self.post_status("/register", credentials).await
    }

    /// Submit a review; the raw response rides along for the handler's
    /// response log.
    pub async fn submit_review(
        &self,
        submission: &ReviewSubmission,
    ) -> Result<(WriteStatus, String)> {
        self.post_status_raw("/write", submission).await
    }
}
