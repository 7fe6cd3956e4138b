//! Query cache with structured keys and prefix invalidation.
//!
//! Keys are tuples of [`KeySegment`]s. Invalidation matches whole segments, so the
//! prefix `["products", "category"]` covers `["products", "category", "nocode"]`
//! but never `["products", "categoryId", 3]`.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::errors::AppError;

/// One element of a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySegment {
    Str(String),
    Int(i64),
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        KeySegment::Str(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        KeySegment::Str(value)
    }
}

impl From<i64> for KeySegment {
    fn from(value: i64) -> Self {
        KeySegment::Int(value)
    }
}

/// Ordered tuple identifying a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<KeySegment>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// `["products"]`
    pub fn products() -> Self {
        Self::new(["products"])
    }

    /// `["products", "category"]`
    pub fn products_by_category_namespace() -> Self {
        Self::new(["products", "category"])
    }

    /// `["products", "category", slug]`
    pub fn products_by_category(slug: &str) -> Self {
        Self::products_by_category_namespace().with(slug)
    }

    /// `["products", "categoryId"]`
    pub fn products_by_category_id_namespace() -> Self {
        Self::new(["products", "categoryId"])
    }

    /// `["products", "categoryId", id]`
    pub fn products_by_category_id(category_id: i64) -> Self {
        Self::products_by_category_id_namespace().with(category_id)
    }

    /// `["categories"]`
    pub fn categories() -> Self {
        Self::new(["categories"])
    }

    /// Append a segment.
    pub fn with(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match segment {
                KeySegment::Str(s) => write!(f, "{:?}", s)?,
                KeySegment::Int(n) => write!(f, "{}", n)?,
            }
        }
        write!(f, "]")
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: serde_json::Value,
    stale: bool,
    fetched_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    invalidations: Vec<QueryKey>,
}

/// Shared query cache. Components that mutate the store hold it to invalidate.
#[derive(Default)]
pub struct QueryCache {
    inner: RwLock<CacheInner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a fresh entry. Stale or missing entries yield `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let inner = self.inner.read().await;
        let entry = inner.entries.get(key).filter(|e| !e.stale)?;
        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Cached value for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Store a fresh value under `key`.
    pub async fn put<T: Serialize>(&self, key: QueryKey, value: &T) -> Result<(), AppError> {
        let data = serde_json::to_value(value)?;
        let mut inner = self.inner.write().await;
        inner.entries.insert(
            key,
            CacheEntry {
                data,
                stale: false,
                fetched_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    ///
    /// Failed loads are not cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, load: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.get(&key).await {
            tracing::debug!("Query cache hit for {}", key);
            return Ok(hit);
        }

        tracing::debug!("Query cache miss for {}", key);
        let value = load().await?;
        self.put(key, &value).await?;
        Ok(value)
    }

    /// Mark every entry whose key starts with `prefix` as stale.
    ///
    /// Returns the number of entries affected.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        let mut count = 0;
        for (key, entry) in inner.entries.iter_mut() {
            if key.starts_with(prefix) && !entry.stale {
                entry.stale = true;
                count += 1;
            }
        }
        inner.invalidations.push(prefix.clone());
        tracing::debug!("Invalidated {} queries under {}", count, prefix);
        count
    }

    /// Whether `key` needs a refetch.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let inner = self.inner.read().await;
        inner.entries.get(key).map(|e| e.stale).unwrap_or(true)
    }

    /// When the entry for `key` was last loaded.
    pub async fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().await;
        inner.entries.get(key).map(|e| e.fetched_at)
    }

    /// Invalidation prefixes in the order they were issued.
    pub async fn invalidation_history(&self) -> Vec<QueryKey> {
        self.inner.read().await.invalidations.clone()
    }
}
