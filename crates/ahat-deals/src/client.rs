//! HTTP client for the `SixSevenDeals` REST API.
//!
//! Wraps `reqwest` with API key handling and typed response
//! deserialization. A body with `"success": false` is surfaced as
//! [`DealsError::ApiError`] whatever the HTTP status.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::DealsError;
use crate::types::{Deal, DealsResponse};

pub const DEFAULT_BASE_URL: &str = "https://sixsevendeals.com/api/v1";

/// One page fetched from `GET /deals`.
#[derive(Debug)]
pub struct DealsPage {
    pub deals: Vec<Deal>,
    /// Entries of `data` that did not deserialize as a [`Deal`].
    pub rejected: Vec<RejectedDeal>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDeal {
    /// The entry's `id`, when it has a usable one.
    pub id: Option<String>,
    pub reason: String,
}

impl RejectedDeal {
    fn from_entry(entry: &serde_json::Value, error: &serde_json::Error) -> Self {
        let id = match entry.get("id") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self {
            id,
            reason: error.to_string(),
        }
    }
}

/// Client for the `SixSevenDeals` REST API.
///
/// The API key is supplied per request, since sync callers may bring their
/// own. Use [`DealsClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct DealsClient {
    client: Client,
    base_url: Url,
}

impl DealsClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`DealsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, DealsError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`DealsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DealsError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, DealsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ahat/0.1 (deal-sync)")
            .build()?;

        // Exactly one trailing slash, so joining "deals" appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| DealsError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Fetches one page of deals, optionally restricted to a category.
    ///
    /// # Errors
    ///
    /// - [`DealsError::ApiError`] if the API reports `"success": false`.
    /// - [`DealsError::Status`] on a non-2xx status without an error body.
    /// - [`DealsError::Http`] on network failure.
    /// - [`DealsError::Deserialize`] if the envelope does not match the
    ///   expected shape. Individual malformed deals land in
    ///   [`DealsPage::rejected`] instead.
    pub async fn fetch_deals(
        &self,
        api_key: &str,
        page: u32,
        limit: u32,
        category: Option<&str>,
    ) -> Result<DealsPage, DealsError> {
        let url = self.deals_url(page, limit, category)?;
        tracing::debug!(%url, "fetching deals page");

        let body = self.request_json(api_key, &url).await?;
        let envelope: DealsResponse =
            serde_json::from_value(body).map_err(|e| DealsError::Deserialize {
                context: format!("deals(page={page})"),
                source: e,
            })?;

        let mut deals = Vec::with_capacity(envelope.data.len());
        let mut rejected = Vec::new();
        for entry in envelope.data {
            match Deal::deserialize(&entry) {
                Ok(deal) => deals.push(deal),
                Err(e) => rejected.push(RejectedDeal::from_entry(&entry, &e)),
            }
        }

        Ok(DealsPage {
            deals,
            rejected,
            has_more: envelope.pagination.is_some_and(|p| p.has_more),
        })
    }

    /// Builds the `deals` URL with percent-encoded query parameters.
    fn deals_url(&self, page: u32, limit: u32, category: Option<&str>) -> Result<Url, DealsError> {
        let mut url = self
            .base_url
            .join("deals")
            .map_err(|e| DealsError::ApiError(format!("invalid deals URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("limit", &limit.to_string());
            if let Some(category) = category {
                pairs.append_pair("category", category);
            }
        }
        Ok(url)
    }

    /// Sends an authenticated GET and parses the body as JSON, surfacing
    /// API-level errors before HTTP-level ones.
    async fn request_json(
        &self,
        api_key: &str,
        url: &Url,
    ) -> Result<serde_json::Value, DealsError> {
        let response = self
            .client
            .get(url.clone())
            .header("X-API-Key", api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = serde_json::from_str::<serde_json::Value>(&body);
        if let Ok(value) = &parsed {
            Self::check_api_error(value)?;
        }
        if !status.is_success() {
            return Err(DealsError::Status(status.as_u16()));
        }

        parsed.map_err(|e| DealsError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    fn check_api_error(body: &serde_json::Value) -> Result<(), DealsError> {
        if body.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            let msg = body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(DealsError::ApiError(msg));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
