use ahat_core::{parse_import_item, ImportedProduct, SkippedProduct};
use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ImportSummary {
    total: usize,
    imported: usize,
    skipped: usize,
    details: ImportDetails,
}

#[derive(Debug, Serialize)]
struct ImportDetails {
    imported: Vec<ImportedProduct>,
    skipped: Vec<SkippedProduct>,
}

/// Pulls the `products` array out of a raw request body.
fn products_array(body: &[u8]) -> Result<Vec<Value>, ApiError> {
    let required = || ApiError::Validation("Products array is required".to_string());
    let value: Value = serde_json::from_slice(body).map_err(|_| required())?;
    match value {
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(required()),
        },
        _ => Err(required()),
    }
}

pub(super) async fn import_products(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let items = products_array(&body)?;
    let total = items.len();

    let mut valid = Vec::with_capacity(total);
    let mut skipped = Vec::new();
    for item in items {
        match parse_import_item(&item) {
            Ok(candidate) => valid.push(candidate),
            Err(reason) => {
                tracing::debug!(%reason, "skipping import item");
                skipped.push(SkippedProduct {
                    product: item,
                    reason,
                });
            }
        }
    }

    let imported = state
        .store
        .import_products(valid)
        .await
        .map_err(|e| map_db_error("Import failed", &e))?;

    Ok(ApiResponse::ok(ImportSummary {
        total,
        imported: imported.len(),
        skipped: skipped.len(),
        details: ImportDetails { imported, skipped },
    }))
}
