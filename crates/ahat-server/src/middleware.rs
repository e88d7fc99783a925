use std::any::Any;

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::api::{ApiError, ErrorEnvelope};

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Real cause of a 500, attached to the response as an extension. Only
/// [`expose_error_detail`] copies it into the body.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Answers every `OPTIONS` request with an empty 200, whatever the path.
pub async fn options_preflight(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

/// Development-only: replaces the redacted 500 message with the real cause.
pub async fn expose_error_detail(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    if res.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return res;
    }
    match res.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorEnvelope::internal(detail)),
        )
            .into_response(),
        None => res,
    }
}

/// `CatchPanicLayer` handler: a panicking handler becomes a regular 500.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::upstream("Handler panicked", detail).into_response()
}
