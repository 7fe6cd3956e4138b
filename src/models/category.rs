//! Category models.

use serde::{Deserialize, Serialize};

/// A browsable category such as "Micro SaaS".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryItem {
    pub id: i64,
    pub name: String,
    /// Route-friendly identifier used for row matching.
    pub slug: String,
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

impl From<&CategoryItem> for CategoryRef {
    fn from(category: &CategoryItem) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// Request body for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

/// Request body for bulk-assigning products to a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProductsRequest {
    pub product_ids: Vec<i64>,
}

/// Result of a bulk assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignProductsResponse {
    pub assigned: bool,
}
