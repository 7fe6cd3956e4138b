//! Content rows for the browse grid.
//!
//! A row is built from either catalogue products or hand-curated projects and
//! turned into uniform [`DisplayItem`] cards. An empty row tied to a category
//! offers an action that runs the category assignment.

use serde::Serialize;

use crate::assign::{AssignOutcome, CategoryAssigner};
use crate::models::{DisplayItem, ProductItem, Project};

/// Message shown in place of cards when a row is empty.
pub const EMPTY_ROW_PLACEHOLDER: &str = "No items in this category yet";

/// Where a row's cards come from.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSource {
    Products(Vec<ProductItem>),
    Projects(Vec<Project>),
}

impl RowSource {
    /// Pick the row input. Products win whenever they are supplied, even empty.
    pub fn select(products: Option<Vec<ProductItem>>, projects: Option<Vec<Project>>) -> Self {
        match (products, projects) {
            (Some(products), _) => RowSource::Products(products),
            (None, Some(projects)) => RowSource::Projects(projects),
            (None, None) => RowSource::Projects(Vec::new()),
        }
    }

    pub fn display_items(&self) -> Vec<DisplayItem> {
        match self {
            RowSource::Products(items) => items.iter().map(DisplayItem::from_product).collect(),
            RowSource::Projects(items) => items.iter().map(DisplayItem::from_project).collect(),
        }
    }
}

/// Action offered by an empty category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignAction {
    pub slug: String,
    pub title: String,
}

/// Row content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RowBody {
    Cards { items: Vec<DisplayItem> },
    Empty {
        placeholder: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        assign: Option<AssignAction>,
    },
}

/// A titled row of cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRow {
    pub title: String,
    pub body: RowBody,
}

impl ContentRow {
    pub fn build(title: impl Into<String>, source: &RowSource, category_slug: Option<&str>) -> Self {
        let title = title.into();
        let items = source.display_items();

        let body = if items.is_empty() {
            RowBody::Empty {
                placeholder: EMPTY_ROW_PLACEHOLDER,
                assign: category_slug
                    .filter(|slug| !slug.is_empty())
                    .map(|slug| AssignAction {
                        slug: slug.to_string(),
                        title: title.clone(),
                    }),
            }
        } else {
            RowBody::Cards { items }
        };

        Self { title, body }
    }

    pub fn items(&self) -> &[DisplayItem] {
        match &self.body {
            RowBody::Cards { items } => items,
            RowBody::Empty { .. } => &[],
        }
    }

    pub fn assign_action(&self) -> Option<&AssignAction> {
        match &self.body {
            RowBody::Empty { assign, .. } => assign.as_ref(),
            RowBody::Cards { .. } => None,
        }
    }

    /// Run the row's assign action. `None` when the row offers none.
    pub async fn trigger_assign(&self, assigner: &CategoryAssigner) -> Option<AssignOutcome> {
        let action = self.assign_action()?;
        Some(assigner.assign(&action.slug, &action.title).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::QueryCache;
    use crate::models::{CategoryRef, PLACEHOLDER_IMAGE};
    use crate::notify::TracingNotifier;
    use crate::store::fake::{Journal, RecordingStore, StoreCall};

    fn product(id: i64) -> ProductItem {
        ProductItem {
            id,
            title: format!("Product {}", id),
            description: Some("A tool".to_string()),
            thumbnail_url: None,
            product_video: Some(String::new()),
            product_link: Some("https://example.com".to_string()),
            github_link: None,
            category_id: None,
            categories: Some(vec![CategoryRef {
                id: 1,
                name: "Micro SaaS".to_string(),
            }]),
            tags: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            title: "Hand made".to_string(),
            subtitle: "sub".to_string(),
            description: "desc".to_string(),
            image: "/img.png".to_string(),
            video_url: None,
            tags: vec!["craft".to_string()],
            product_link: None,
        }
    }

    #[test]
    fn test_product_adapter() {
        let card = DisplayItem::from_product(&product(7));
        assert_eq!(card.id, "7");
        assert_eq!(card.subtitle, "A tool");
        assert_eq!(card.description, "A tool");
        assert_eq!(card.image, PLACEHOLDER_IMAGE);
        assert_eq!(card.video_url, None);
        assert_eq!(card.product_link.as_deref(), Some("https://example.com"));
        assert!(card.tags.is_empty());
        assert_eq!(card.categories.len(), 1);
        assert!(card.show_title_by_default);
    }

    #[test]
    fn test_products_take_precedence() {
        let source = RowSource::select(Some(vec![]), Some(vec![project("a")]));
        assert_eq!(source, RowSource::Products(vec![]));

        let source = RowSource::select(None, Some(vec![project("a")]));
        let items = source.display_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert!(!items[0].show_title_by_default);
        assert!(items[0].categories.is_empty());
    }

    #[test]
    fn test_non_empty_row_has_cards() {
        let row = ContentRow::build(
            "Micro SaaS",
            &RowSource::Products(vec![product(1), product(9)]),
            Some("microsaas"),
        );
        assert_eq!(row.items().len(), 2);
        assert!(row.assign_action().is_none());
    }

    #[test]
    fn test_empty_row_offers_assign_only_with_slug() {
        let empty = RowSource::select(Some(vec![]), None);

        let row = ContentRow::build("No-Code", &empty, Some("nocode"));
        assert_eq!(
            row.body,
            RowBody::Empty {
                placeholder: EMPTY_ROW_PLACEHOLDER,
                assign: Some(AssignAction {
                    slug: "nocode".to_string(),
                    title: "No-Code".to_string(),
                }),
            }
        );

        let row = ContentRow::build("Featured", &empty, None);
        assert!(row.assign_action().is_none());
        assert!(row.items().is_empty());

        // Blank slug counts as no slug
        let row = ContentRow::build("Featured", &empty, Some(""));
        assert!(row.assign_action().is_none());
    }

    #[tokio::test]
    async fn test_trigger_assign_runs_engine() {
        let journal = Journal::default();
        let assigner = CategoryAssigner::new(
            Arc::new(RecordingStore::new(journal.clone())),
            Arc::new(QueryCache::new()),
            Arc::new(TracingNotifier),
        );

        let row = ContentRow::build("No-Code", &RowSource::Products(vec![]), Some("nocode"));
        let outcome = row.trigger_assign(&assigner).await;
        assert_eq!(
            outcome,
            Some(AssignOutcome::Assigned {
                product_ids: vec![2, 3, 7, 11]
            })
        );
        assert_eq!(
            journal.calls(),
            vec![StoreCall::Assign(vec![2, 3, 7, 11], "nocode".to_string())]
        );

        let row = ContentRow::build("Featured", &RowSource::Products(vec![]), None);
        assert_eq!(row.trigger_assign(&assigner).await, None);
    }
}
