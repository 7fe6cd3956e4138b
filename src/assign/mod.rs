//! Bulk category assignment for empty category rows.
//!
//! Each known category slug maps to a fixed list of product ids. Triggering an
//! assignment links those products to the category in one store call, tells the
//! user how it went and, on success only, invalidates the row's cached query.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey};
use crate::notify::{NotificationKind, Notifier};
use crate::store::DataStore;

/// Product ids assigned per category slug.
const ASSIGNMENTS: &[(&str, &[i64])] = &[
    ("microsaas", &[1, 9, 13, 14, 16]),
    ("nocode", &[2, 3, 7, 11]),
];

/// Look up the product ids for `slug`. Unknown slugs yield an empty slice.
pub fn products_for_slug(slug: &str) -> &'static [i64] {
    ASSIGNMENTS
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, ids)| *ids)
        .unwrap_or(&[])
}

/// What an assignment attempt ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Slug has no assignment table entry; nothing happened.
    Skipped,
    /// Store confirmed the assignment.
    Assigned { product_ids: Vec<i64> },
    /// Store answered `false`.
    Rejected,
    /// Store call errored.
    Failed { reason: String },
}

/// Runs category assignments against a store.
pub struct CategoryAssigner {
    store: Arc<dyn DataStore>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl CategoryAssigner {
    pub fn new(
        store: Arc<dyn DataStore>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
        }
    }

    /// Assign the fixed product list for `slug`. `title` is the row's display name.
    ///
    /// No retry: a failure is terminal until the user triggers it again.
    pub async fn assign(&self, slug: &str, title: &str) -> AssignOutcome {
        let product_ids = products_for_slug(slug);
        if product_ids.is_empty() {
            tracing::debug!("No assignment table entry for category {:?}", slug);
            return AssignOutcome::Skipped;
        }

        self.notifier.notify(
            NotificationKind::Info,
            "Assigning products",
            &format!("Assigning products to {} category...", title),
        );

        match self
            .store
            .assign_products_to_category(product_ids, slug)
            .await
        {
            Ok(true) => {
                self.notifier.notify(
                    NotificationKind::Success,
                    "Success",
                    &format!("Products assigned to {} category successfully!", title),
                );
                self.cache
                    .invalidate(&QueryKey::products_by_category(slug))
                    .await;
                tracing::info!("Assigned {} products to {}", product_ids.len(), slug);
                AssignOutcome::Assigned {
                    product_ids: product_ids.to_vec(),
                }
            }
            Ok(false) => {
                self.notifier.notify(
                    NotificationKind::Error,
                    "Error",
                    &format!("Failed to assign products to {} category", title),
                );
                AssignOutcome::Rejected
            }
            Err(e) => {
                tracing::error!("Error assigning products to {}: {}", slug, e);
                self.notifier.notify(
                    NotificationKind::Error,
                    "Error",
                    "Failed to assign products to category",
                );
                AssignOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
