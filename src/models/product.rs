//! Product model matching the portfolio `products` table.

use serde::{Deserialize, Serialize};

use super::CategoryRef;

/// A product in the portfolio catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    /// Legacy single-category link, superseded by `categories` when that is non-empty.
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ProductItem {
    /// Category ids this product belongs to.
    ///
    /// A non-empty `categories` list wins over the legacy `category_id`.
    pub fn category_ids(&self) -> Vec<i64> {
        match &self.categories {
            Some(categories) if !categories.is_empty() => {
                categories.iter().map(|c| c.id).collect()
            }
            _ => self.category_id.into_iter().collect(),
        }
    }
}

/// Write payload for creating or replacing a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCreateInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub product_video: Option<String>,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub github_link: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Multi-category assignment. Omitted means "keep the backend default".
    #[serde(
        rename = "categoryIds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category_ids: Option<Vec<i64>>,
}

/// Query parameters accepted by the product listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// A simpler card shape used by static, hand-curated rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
}
