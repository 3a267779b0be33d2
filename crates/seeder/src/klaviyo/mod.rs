//! Klaviyo API client for event ingestion.
//!
//! Submits journey events to Klaviyo's Create Event endpoint, one request
//! per event, with no retries.
//!
//! # API Reference
//!
//! - Base URL: `https://a.klaviyo.com/api`
//! - Endpoint: `POST /events` (202 Accepted on success, empty body)
//! - Authentication: Private API key via `Authorization: Klaviyo-API-Key <key>`
//! - API Version: `2025-01-15` (specified via `revision` header)

mod types;

pub use types::*;

use std::sync::Arc;

use chrono::SecondsFormat;
use journey_seeder_core::Event;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::KlaviyoConfig;
use crate::sink::{Delivery, EventSink};

/// JSON:API media type used for both request and response bodies.
const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Errors that can occur when interacting with Klaviyo API.
#[derive(Debug, Error)]
pub enum KlaviyoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Klaviyo.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Unauthorized (invalid API key or missing scope).
    #[error("Unauthorized ({0}): check the API key and its events:write scope")]
    Unauthorized(u16),

    /// Failed to build the request.
    #[error("Request error: {0}")]
    Request(String),

    /// Failed to serialize the payload.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl KlaviyoError {
    /// HTTP status Klaviyo answered with, if the request got that far.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Unauthorized(status) => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::Http(_) | Self::Request(_) | Self::Serialize(_) => None,
        }
    }
}

/// Klaviyo API client.
#[derive(Clone)]
pub struct KlaviyoClient {
    inner: Arc<KlaviyoClientInner>,
}

struct KlaviyoClientInner {
    client: reqwest::Client,
    events_url: String,
}

impl KlaviyoClient {
    /// Create a new Klaviyo API client.
    ///
    /// # Errors
    ///
    /// Returns error if a header value is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &KlaviyoConfig) -> Result<Self, KlaviyoError> {
        let mut headers = HeaderMap::new();

        // Authorization header
        let auth_value = format!("Klaviyo-API-Key {}", config.api_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| KlaviyoError::Request(format!("Invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        // Revision header for API versioning
        headers.insert(
            "revision",
            HeaderValue::from_str(&config.revision)
                .map_err(|e| KlaviyoError::Request(format!("Invalid API revision: {e}")))?,
        );

        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_MEDIA_TYPE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let events_url = format!("{}/events", config.base_url.as_str().trim_end_matches('/'));

        Ok(Self {
            inner: Arc::new(KlaviyoClientInner { client, events_url }),
        })
    }

    /// URL events are posted to.
    #[must_use]
    pub fn events_url(&self) -> &str {
        &self.inner.events_url
    }

    /// Submit one event. Returns the success status code.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Klaviyo answers with a
    /// non-success status.
    pub async fn create_event(&self, event: &Event<'_>) -> Result<u16, KlaviyoError> {
        let body = serde_json::to_vec(&CreateEventInput::from(event))?;

        // Set per request: `RequestBuilder::json` would force application/json
        let response = self
            .inner
            .client
            .post(&self.inner.events_url)
            .header(CONTENT_TYPE, JSON_API_MEDIA_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse error response from Klaviyo API.
    async fn parse_error(response: reqwest::Response) -> KlaviyoError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return KlaviyoError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return KlaviyoError::Unauthorized(status);
        }

        let body = response.text().await.unwrap_or_default();
        KlaviyoError::Api {
            status,
            message: error_detail(&body),
        }
    }
}

impl EventSink for KlaviyoClient {
    async fn deliver(&self, event: &Event<'_>) -> Delivery {
        let time = event.time.to_rfc3339_opts(SecondsFormat::Secs, true);

        match self.create_event(event).await {
            Ok(status) => {
                info!(
                    metric = %event.metric,
                    email = %event.profile.email,
                    time = %time,
                    status,
                    "Event delivered"
                );
                Delivery::Accepted { status }
            }
            Err(err) => {
                warn!(
                    metric = %event.metric,
                    email = %event.profile.email,
                    time = %time,
                    status = err.status(),
                    error = %err,
                    "Event delivery failed"
                );
                err.status()
                    .map_or(Delivery::Failed, |status| Delivery::Rejected { status })
            }
        }
    }
}

impl std::fmt::Debug for KlaviyoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoClient")
            .field("events_url", &self.inner.events_url)
            .finish_non_exhaustive()
    }
}

/// Pull the first `errors[].detail` out of a JSON:API error body, falling
/// back to the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("errors")?
                .get(0)?
                .get("detail")?
                .as_str()
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}
