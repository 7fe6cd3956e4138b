//! Recording fakes for engine and editor tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::DataStore;
use crate::errors::AppError;
use crate::models::{CategoryItem, ProductCreateInput, ProductItem};
use crate::notify::{NotificationKind, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FetchProducts,
    FetchProductsByCategory(String),
    FetchProductsByCategoryId(i64),
    FetchCategories,
    Add(ProductCreateInput),
    Update(i64, ProductCreateInput),
    Delete(i64),
    Assign(Vec<i64>, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Notified(NotificationKind, String, String),
    Called(StoreCall),
}

/// Ordered log shared by the fake store and the fake notifier.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Called(call) => Some(call),
                Event::Notified(..) => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<(NotificationKind, String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notified(kind, title, message) => Some((kind, title, message)),
                Event::Called(_) => None,
            })
            .collect()
    }
}

pub struct RecordingStore {
    pub journal: Journal,
    pub products: Vec<ProductItem>,
    pub categories: Vec<CategoryItem>,
    pub assign_result: Result<bool, AppError>,
    pub mutation_error: Option<AppError>,
}

impl RecordingStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            products: Vec::new(),
            categories: Vec::new(),
            assign_result: Ok(true),
            mutation_error: None,
        }
    }

    fn record(&self, call: StoreCall) {
        self.journal.push(Event::Called(call));
    }

    fn echo(&self, id: i64, payload: &ProductCreateInput) -> ProductItem {
        ProductItem {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            thumbnail_url: payload.thumbnail_url.clone(),
            product_video: payload.product_video.clone(),
            product_link: payload.product_link.clone(),
            github_link: payload.github_link.clone(),
            category_id: payload.category_id,
            categories: None,
            tags: payload.tags.clone(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[async_trait]
impl DataStore for RecordingStore {
    async fn fetch_products(&self) -> Result<Vec<ProductItem>, AppError> {
        self.record(StoreCall::FetchProducts);
        Ok(self.products.clone())
    }

    async fn fetch_products_by_category(&self, slug: &str) -> Result<Vec<ProductItem>, AppError> {
        self.record(StoreCall::FetchProductsByCategory(slug.to_string()));
        Ok(self.products.clone())
    }

    async fn fetch_products_by_category_id(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductItem>, AppError> {
        self.record(StoreCall::FetchProductsByCategoryId(category_id));
        Ok(self.products.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryItem>, AppError> {
        self.record(StoreCall::FetchCategories);
        Ok(self.categories.clone())
    }

    async fn add_product(&self, payload: &ProductCreateInput) -> Result<ProductItem, AppError> {
        self.record(StoreCall::Add(payload.clone()));
        match &self.mutation_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.echo(100, payload)),
        }
    }

    async fn update_product(
        &self,
        id: i64,
        payload: &ProductCreateInput,
    ) -> Result<ProductItem, AppError> {
        self.record(StoreCall::Update(id, payload.clone()));
        match &self.mutation_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.echo(id, payload)),
        }
    }

    async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        self.record(StoreCall::Delete(id));
        match &self.mutation_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn assign_products_to_category(
        &self,
        ids: &[i64],
        slug: &str,
    ) -> Result<bool, AppError> {
        self.record(StoreCall::Assign(ids.to_vec(), slug.to_string()));
        self.assign_result.clone()
    }
}

pub struct RecordingNotifier {
    pub journal: Journal,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        self.journal
            .push(Event::Notified(kind, title.to_string(), message.to_string()));
    }
}
