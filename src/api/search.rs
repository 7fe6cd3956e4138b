//! Product search endpoint.

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::ProductItem;
use crate::search::MAX_RESULT_WINDOW;
use crate::AppState;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// `?q=&limit=&offset=`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_page_size")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// One page of ranked products. `total` counts every match, not just this page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub product: ProductItem,
    pub score: f32,
}

/// GET /api/search - Ranked full-text search over the catalogue.
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if params.offset >= MAX_RESULT_WINDOW {
        return error(
            AppError::Validation(format!("offset must be below {}", MAX_RESULT_WINDOW)),
            revision_id,
        );
    }
    let limit = params.limit.min(MAX_PAGE_SIZE);

    let page = match state.search.search(&params.q, limit, params.offset) {
        Ok(page) => page,
        Err(e) => return error(e, revision_id),
    };

    let ids: Vec<i64> = page.hits.iter().map(|hit| hit.product_id).collect();
    let products = match state.repo.get_products_by_ids(&ids).await {
        Ok(products) => products,
        Err(e) => return error(e, revision_id),
    };

    // Products deleted since indexing drop out of the page
    let scores: HashMap<i64, f32> = page
        .hits
        .iter()
        .map(|hit| (hit.product_id, hit.score))
        .collect();
    let results = products
        .into_iter()
        .map(|product| SearchResultItem {
            score: scores.get(&product.id).copied().unwrap_or_default(),
            product,
        })
        .collect();

    success(
        SearchResponse {
            results,
            total: page.total,
            limit,
            offset: params.offset,
        },
        revision_id,
    )
}
