//! REST API module.
//!
//! Every handler answers with the same success/error envelope.

mod categories;
mod products;
mod revision;
mod search;

pub use categories::*;
pub use products::*;
pub use revision::*;
pub use search::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppErrorWithRevision, ErrorDetails};
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Either side of the envelope, as read by clients.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorDetails>,
    #[serde(default)]
    pub revision_id: i64,
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Rebuild the search index from the current catalogue.
async fn rebuild_search_index(state: &AppState) {
    let products = match state.repo.list_products().await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Failed to list products for reindex: {}", e);
            return;
        }
    };

    if let Err(e) = state.search.rebuild(&products).await {
        tracing::warn!("Failed to rebuild search index: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use serde::de::DeserializeOwned;

    use super::*;
    use crate::models::ProductItem;

    fn read<T: DeserializeOwned>(body: &str) -> ApiEnvelope<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_envelope_reads_success() {
        let envelope: ApiEnvelope<ProductItem> =
            read(r#"{"success":true,"data":{"id":3,"title":"Widget"},"revisionId":7}"#);
        assert!(envelope.success);
        assert_eq!(envelope.data.map(|p| p.id), Some(3));
        assert!(envelope.error.is_none());
        assert_eq!(envelope.revision_id, 7);
    }

    #[test]
    fn test_envelope_reads_error_without_data() {
        let envelope: ApiEnvelope<ProductItem> = read(
            r#"{"success":false,"error":{"code":"NOT_FOUND","message":"Product 9 not found"},"revisionId":2}"#,
        );
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(
            AppError::from_remote(&envelope.error.unwrap()),
            AppError::NotFound("Product 9 not found".to_string())
        );
    }

    #[test]
    fn test_envelope_reads_null_data() {
        let envelope: ApiEnvelope<serde_json::Value> =
            read(r#"{"success":true,"data":null,"revisionId":4}"#);
        assert!(envelope.success);
        assert!(envelope.data.is_none());
    }
}
