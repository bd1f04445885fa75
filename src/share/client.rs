use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::payload::CardPayload;

/// The render step failed. The payload that produced it is still valid —
/// callers may retry or fall back to numeric-only results.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("share service URL is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("render service returned {status}")]
    Status { status: StatusCode },

    #[error("render service response missing card id")]
    MissingId,

    #[error("invalid render service response: {0}")]
    InvalidResponse(String),
}

/// A rendered card descriptor with normalized absolute URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareCard {
    pub id: String,
    pub image_url: String,
    pub share_url: String,
    pub meta_url: String,
}

#[derive(Debug, Deserialize)]
struct RawCardResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    share_url: Option<String>,
    #[serde(default)]
    meta_url: Option<String>,
}

/// Client for the external card-rendering service.
#[derive(Debug, Clone)]
pub struct ShareClient {
    http: Client,
    base_url: String,
    /// Public-facing base used when normalizing URLs for sharing; falls
    /// back to the service base.
    public_base: Option<String>,
}

impl ShareClient {
    pub fn new(http: Client, base_url: String, public_base: Option<String>) -> Self {
        Self {
            http,
            base_url,
            public_base,
        }
    }

    /// Create a new share card from a validated payload.
    pub async fn create_card(&self, payload: &CardPayload) -> Result<ShareCard, RenderError> {
        let endpoint = self.endpoint("/cards")?;
        self.post_card(&endpoint, payload).await
    }

    /// Regenerate an existing card id with a fresh payload. The service
    /// overwrites the output — last write wins.
    pub async fn regenerate_card(
        &self,
        card_id: &str,
        payload: &CardPayload,
    ) -> Result<ShareCard, RenderError> {
        let endpoint = self.endpoint(&format!("/cards/{card_id}"))?;
        self.post_card(&endpoint, payload).await
    }

    async fn post_card(
        &self,
        endpoint: &str,
        payload: &CardPayload,
    ) -> Result<ShareCard, RenderError> {
        let resp = self.http.post(endpoint).json(payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RenderError::Status { status });
        }

        let raw: RawCardResponse = resp
            .json()
            .await
            .map_err(|e| RenderError::InvalidResponse(e.to_string()))?;

        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .ok_or(RenderError::MissingId)?;

        Ok(ShareCard {
            id,
            image_url: self.absolute_url(raw.image_url),
            share_url: self.absolute_url(raw.share_url),
            meta_url: self.absolute_url(raw.meta_url),
        })
    }

    fn endpoint(&self, path: &str) -> Result<String, RenderError> {
        if self.base_url.is_empty() {
            return Err(RenderError::NotConfigured);
        }
        Ok(format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }

    /// Service responses may carry relative paths; resolve them against
    /// the public base so share links work outside localhost.
    fn absolute_url(&self, path: Option<String>) -> String {
        let Some(path) = path else {
            return String::new();
        };
        if path.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
            return path;
        }

        let base = self
            .public_base
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.base_url);
        if base.is_empty() {
            return path;
        }
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
