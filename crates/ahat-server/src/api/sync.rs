use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::sync::{SyncError, SyncOutcome, SyncParams};

use super::{ApiError, AppState};

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_REQUIRED: &str = "API key required for sync";

#[derive(Debug, Default, Deserialize)]
pub(super) struct SyncRequest {
    pub api_key: Option<String>,
    pub count: Option<i64>,
    pub category: Option<String>,
    pub max_pages: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncResponse {
    success: bool,
    data: SyncOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// An empty body is the same as `{}`.
fn parse_body(body: &[u8]) -> Result<SyncRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SyncRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {e}")))
}

/// Body key, then `X-API-Key`, then the server's own key. Blank counts as absent.
pub(super) fn resolve_api_key(
    body_key: Option<String>,
    headers: &HeaderMap,
    configured: Option<&str>,
) -> Option<String> {
    let header_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    [body_key, header_key, configured.map(ToOwned::to_owned)]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

pub(super) async fn sync_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncResponse>, ApiError> {
    let request = parse_body(&body)?;
    let api_key = resolve_api_key(
        request.api_key,
        &headers,
        state.config.deals_api_key.as_deref(),
    );

    if api_key.is_none() && !state.config.env.is_development() {
        return Err(ApiError::Auth(API_KEY_REQUIRED.to_string()));
    }

    let params = SyncParams {
        count: request.count,
        category: request.category.filter(|c| !c.trim().is_empty()),
        max_pages: request.max_pages,
    };

    let outcome = state
        .deals
        .sync(api_key.as_deref(), &params)
        .await
        .map_err(|e| match e {
            SyncError::MissingApiKey => ApiError::Auth(API_KEY_REQUIRED.to_string()),
            other => ApiError::upstream("Sync failed", other),
        })?;

    Ok(Json(SyncResponse {
        success: true,
        message: outcome.message,
        data: outcome,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(key: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(key) = key {
            headers.insert(API_KEY_HEADER, HeaderValue::from_static(key));
        }
        headers
    }

    #[test]
    fn body_key_wins_over_header_and_config() {
        let key = resolve_api_key(Some("body".into()), &headers(Some("header")), Some("conf"));
        assert_eq!(key.as_deref(), Some("body"));
    }

    #[test]
    fn header_key_wins_over_config() {
        let key = resolve_api_key(None, &headers(Some("header")), Some("conf"));
        assert_eq!(key.as_deref(), Some("header"));
    }

    #[test]
    fn blank_keys_fall_through() {
        let key = resolve_api_key(Some("  ".into()), &headers(Some("")), Some("conf"));
        assert_eq!(key.as_deref(), Some("conf"));
        assert_eq!(resolve_api_key(Some(String::new()), &headers(None), None), None);
    }

    #[test]
    fn empty_body_is_default_request() {
        let request = parse_body(b"").unwrap();
        assert!(request.api_key.is_none());
        assert!(parse_body(b"  \n").is_ok());
    }

    #[test]
    fn malformed_body_is_validation_error() {
        assert!(matches!(parse_body(b"{nope"), Err(ApiError::Validation(_))));
        assert!(matches!(
            parse_body(br#"{"count": "ten"}"#),
            Err(ApiError::Validation(_))
        ));
    }
}
