//! Category API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, rebuild_search_index, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AssignProductsRequest, AssignProductsResponse, CategoryItem, CreateCategoryRequest,
};
use crate::AppState;

/// GET /api/categories - List all categories.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryItem>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_categories().await {
        Ok(categories) => success(categories, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/categories - Create a new category.
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> ApiResult<CategoryItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Category name is required".to_string()),
            revision_id,
        );
    }
    if !is_valid_slug(&request.slug) {
        return error(
            AppError::Validation(
                "Slug must be non-empty lowercase letters, digits or dashes".to_string(),
            ),
            revision_id,
        );
    }

    match state.repo.create_category(&request).await {
        Ok(category) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(category, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/categories/:slug/assign - Link products to a category.
pub async fn assign_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<AssignProductsRequest>,
) -> ApiResult<AssignProductsResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.product_ids.is_empty() {
        return error(
            AppError::Validation("No product ids provided".to_string()),
            revision_id,
        );
    }

    match state
        .repo
        .assign_products_to_category(&request.product_ids, &slug)
        .await
    {
        Ok(assigned) => {
            if assigned {
                // Category names are part of the indexed text
                rebuild_search_index(&state).await;
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(AssignProductsResponse { assigned }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
