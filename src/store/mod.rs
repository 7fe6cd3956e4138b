//! Data access seam shared by the editor, the category assigner and the grid.
//!
//! The SQLite [`Repository`](crate::db::Repository) implements it in-process and
//! [`HttpDataStore`](crate::client::HttpDataStore) implements it over the REST API.

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::cache::{QueryCache, QueryKey};
use crate::errors::AppError;
use crate::models::{CategoryItem, ProductCreateInput, ProductItem};

/// Asynchronous operations against the product store.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<ProductItem>, AppError>;

    async fn fetch_products_by_category(&self, slug: &str) -> Result<Vec<ProductItem>, AppError>;

    async fn fetch_products_by_category_id(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductItem>, AppError>;

    async fn fetch_categories(&self) -> Result<Vec<CategoryItem>, AppError>;

    async fn add_product(&self, payload: &ProductCreateInput) -> Result<ProductItem, AppError>;

    async fn update_product(
        &self,
        id: i64,
        payload: &ProductCreateInput,
    ) -> Result<ProductItem, AppError>;

    async fn delete_product(&self, id: i64) -> Result<(), AppError>;

    /// Link `ids` to the category named by `slug`. `Ok(false)` means the store refused.
    async fn assign_products_to_category(&self, ids: &[i64], slug: &str)
        -> Result<bool, AppError>;
}

/// Cached reads keyed the same way the invalidation calls expect.
pub struct CatalogQueries<'a> {
    store: &'a dyn DataStore,
    cache: &'a QueryCache,
}

impl<'a> CatalogQueries<'a> {
    pub fn new(store: &'a dyn DataStore, cache: &'a QueryCache) -> Self {
        Self { store, cache }
    }

    pub async fn products(&self) -> Result<Vec<ProductItem>, AppError> {
        self.cached(QueryKey::products(), self.store.fetch_products())
            .await
    }

    pub async fn products_by_category(&self, slug: &str) -> Result<Vec<ProductItem>, AppError> {
        self.cached(
            QueryKey::products_by_category(slug),
            self.store.fetch_products_by_category(slug),
        )
        .await
    }

    pub async fn products_by_category_id(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductItem>, AppError> {
        self.cached(
            QueryKey::products_by_category_id(category_id),
            self.store.fetch_products_by_category_id(category_id),
        )
        .await
    }

    pub async fn categories(&self) -> Result<Vec<CategoryItem>, AppError> {
        self.cached(QueryKey::categories(), self.store.fetch_categories())
            .await
    }

    async fn cached<T, F>(&self, key: QueryKey, load: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: std::future::Future<Output = Result<T, AppError>>,
    {
        self.cache.fetch(key, || load).await
    }
}
