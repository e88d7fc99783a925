mod catalog;
mod import;
mod products;
mod sync;

use std::{sync::Arc, time::Duration};

use ahat_core::AppConfig;
use ahat_db::{DbError, ProductStore};
use axum::{
    extract::OriginalUri,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, timeout::TimeoutLayer};

use crate::{
    middleware::{
        expose_error_detail, handle_panic, options_preflight, request_id, ErrorDetail,
    },
    sync::DealProvider,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ProductStore>,
    pub deals: Arc<dyn DealProvider>,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// `{success: true, data}` for handlers without extra top-level fields.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub source: &'static str,
    pub environment: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String, state: &AppState) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().timestamp(),
            source: state.store.source().as_str(),
            environment: state.config.env.to_string(),
        }
    }
}

/// Body of every failed response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            path: None,
            message: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new("Internal server error")
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Endpoint not found: {path}")]
    RouteNotFound { path: String },
    #[error("{context}: {detail}")]
    Upstream {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn upstream(context: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::Upstream {
            context,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorEnvelope::new(msg))).into_response()
            }
            ApiError::Auth(msg) => {
                (StatusCode::UNAUTHORIZED, Json(ErrorEnvelope::new(msg))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorEnvelope::new(msg))).into_response()
            }
            ApiError::RouteNotFound { path } => (
                StatusCode::NOT_FOUND,
                Json(ErrorEnvelope {
                    path: Some(path),
                    ..ErrorEnvelope::new("Endpoint not found")
                }),
            )
                .into_response(),
            err @ ApiError::Upstream { .. } => {
                let detail = err.to_string();
                tracing::error!(error = %detail, "request failed");
                let mut res = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorEnvelope::internal("An error occurred")),
                )
                    .into_response();
                res.extensions_mut().insert(ErrorDetail(detail));
                res
            }
        }
    }
}

pub(super) fn map_db_error(context: &'static str, error: &DbError) -> ApiError {
    ApiError::upstream(context, error)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-request-id"),
        ])
}

/// Routes served both at the root and under `/api`.
fn catalog_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/products", get(products::list_products))
        .route("/products/", get(products::list_products))
        .route("/products/sync", post(sync::sync_products))
        .route("/products/import", post(import::import_products))
        .route("/products/categories", get(catalog::list_categories))
        .route("/products/stats", get(catalog::get_stats))
        .route("/products/{id}", get(products::get_product))
}

pub fn build_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api", get(service_info))
        .merge(catalog_router())
        .nest("/api", catalog_router())
        .method_not_allowed_fallback(route_not_found)
        .fallback(route_not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::custom(handle_panic));

    if state.config.env.is_development() {
        app = app.layer(axum::middleware::from_fn(expose_error_detail));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(build_cors())
            .layer(axum::middleware::from_fn(request_id))
            .layer(axum::middleware::from_fn(options_preflight)),
    )
    .with_state(state)
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    message: &'static str,
    version: &'static str,
    status: &'static str,
}

async fn service_info() -> impl IntoResponse {
    ApiResponse::ok(ServiceInfo {
        message: "Ahat API Server",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthData> {
    Json(HealthData {
        status: "healthy",
        service: "AHAT API",
    })
}

pub(super) async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::RouteNotFound {
        path: uri.path().to_string(),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
