//! Remote data store speaking the REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::ApiEnvelope;
use crate::auth::API_KEY_HEADER;
use crate::errors::AppError;
use crate::models::{
    AssignProductsRequest, AssignProductsResponse, CategoryItem, ProductCreateInput, ProductItem,
};
use crate::store::DataStore;

/// [`DataStore`] backed by a running portfolio backend.
#[derive(Clone)]
pub struct HttpDataStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpDataStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Send `key` on every request so admin routes accept the writes.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            AppError::Transport(format!("Unexpected response ({}): {}", status, e))
        })?;

        if envelope.success {
            return Ok(envelope);
        }
        Err(match &envelope.error {
            Some(details) => AppError::from_remote(details),
            None => AppError::Transport(format!("Request failed with status {}", status)),
        })
    }

    async fn data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        self.envelope(builder)
            .await?
            .data
            .ok_or_else(|| AppError::Transport("Response carried no data".to_string()))
    }
}

#[async_trait]
impl DataStore for HttpDataStore {
    async fn fetch_products(&self) -> Result<Vec<ProductItem>, AppError> {
        self.data(self.request(Method::GET, "/products")).await
    }

    async fn fetch_products_by_category(&self, slug: &str) -> Result<Vec<ProductItem>, AppError> {
        self.data(
            self.request(Method::GET, "/products")
                .query(&[("category", slug)]),
        )
        .await
    }

    async fn fetch_products_by_category_id(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductItem>, AppError> {
        self.data(
            self.request(Method::GET, "/products")
                .query(&[("categoryId", category_id)]),
        )
        .await
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryItem>, AppError> {
        self.data(self.request(Method::GET, "/categories")).await
    }

    async fn add_product(&self, payload: &ProductCreateInput) -> Result<ProductItem, AppError> {
        self.data(self.request(Method::POST, "/products").json(payload))
            .await
    }

    async fn update_product(
        &self,
        id: i64,
        payload: &ProductCreateInput,
    ) -> Result<ProductItem, AppError> {
        self.data(
            self.request(Method::PUT, &format!("/products/{}", id))
                .json(payload),
        )
        .await
    }

    async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        self.envelope::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/products/{}", id)),
        )
        .await?;
        Ok(())
    }

    async fn assign_products_to_category(
        &self,
        ids: &[i64],
        slug: &str,
    ) -> Result<bool, AppError> {
        let body = AssignProductsRequest {
            product_ids: ids.to_vec(),
        };
        let response: AssignProductsResponse = self
            .data(
                self.request(Method::POST, &format!("/categories/{}/assign", slug))
                    .json(&body),
            )
            .await?;
        Ok(response.assigned)
    }
}
