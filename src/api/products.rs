//! Product API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ProductCreateInput, ProductFilter, ProductItem};
use crate::AppState;

/// GET /api/products - List products, optionally narrowed to one category.
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Vec<ProductItem>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let result = match (&filter.category, filter.category_id) {
        (Some(slug), _) => state.repo.list_products_by_category(slug).await,
        (None, Some(category_id)) => state.repo.list_products_by_category_id(category_id).await,
        (None, None) => state.repo.list_products().await,
    };

    match result {
        Ok(products) => success(products, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/products/:id - Get a single product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ProductItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_product(id).await {
        Ok(Some(product)) => success(product, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Product {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/products - Create a new product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductCreateInput>,
) -> ApiResult<ProductItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.create_product(&input).await {
        Ok(product) => {
            if let Err(e) = state.search.index_product(&product).await {
                tracing::warn!("Failed to index product: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(product, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/products/:id - Replace a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductCreateInput>,
) -> ApiResult<ProductItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_product(id, &input).await {
        Ok(product) => {
            if let Err(e) = state.search.index_product(&product).await {
                tracing::warn!("Failed to re-index product: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(product, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/products/:id - Delete a product.
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_product(id).await {
        Ok(()) => {
            if let Err(e) = state.search.remove_product(id).await {
                tracing::warn!("Failed to remove product from index: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
