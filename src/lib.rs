//! Portfolio catalogue backend.
//!
//! SQLite-backed product and category store with Tantivy search, served over a
//! REST API, plus the client-side core used by the browse grid and the admin
//! editor: query cache, category assignment and the product editor.

pub mod api;
pub mod assign;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod db;
pub mod editor;
pub mod errors;
pub mod grid;
pub mod models;
pub mod notify;
pub mod search;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();
    let admin = middleware::from_fn(move |req, next| auth::psk_auth_layer(psk.clone(), req, next));

    let api_routes = Router::new()
        // Products
        .route(
            "/products",
            get(api::list_products).merge(post(api::create_product).route_layer(admin.clone())),
        )
        .route(
            "/products/{id}",
            get(api::get_product)
                .merge(put(api::update_product).route_layer(admin.clone()))
                .merge(delete(api::delete_product).route_layer(admin.clone())),
        )
        // Categories
        .route(
            "/categories",
            get(api::list_categories)
                .merge(post(api::create_category).route_layer(admin.clone())),
        )
        .route(
            "/categories/{slug}/assign",
            post(api::assign_products).route_layer(admin),
        )
        // Search
        .route("/search", get(api::search_products))
        .route("/revision", get(api::get_revision));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
