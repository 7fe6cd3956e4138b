//! Card-renderable view shared by product and project rows.

use serde::Serialize;

use super::{CategoryRef, ProductItem, Project};

/// Image used when a product has no thumbnail.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Normalized card record. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItem {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
    pub categories: Vec<CategoryRef>,
    pub show_title_by_default: bool,
}

impl DisplayItem {
    pub fn from_product(item: &ProductItem) -> Self {
        let description = item.description.clone().unwrap_or_default();
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            subtitle: description.clone(),
            description,
            image: non_blank(&item.thumbnail_url).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            video_url: non_blank(&item.product_video),
            tags: item.tags.clone().unwrap_or_default(),
            product_link: non_blank(&item.product_link),
            categories: item.categories.clone().unwrap_or_default(),
            show_title_by_default: true,
        }
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            subtitle: project.subtitle.clone(),
            description: project.description.clone(),
            image: project.image.clone(),
            video_url: project.video_url.clone(),
            tags: project.tags.clone(),
            product_link: project.product_link.clone(),
            categories: Vec::new(),
            show_title_by_default: false,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
