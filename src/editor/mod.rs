//! Product editor state machine backing the admin page.
//!
//! The editor is either `Idle` (blank form, next submit creates) or
//! `Editing(item)` (form seeded from `item`, next submit replaces it). Seeding
//! sets the form fields, the selected categories and the tags text in one step.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey};
use crate::models::{ProductCreateInput, ProductItem};
use crate::store::DataStore;

/// Delimiter used when showing a tag list as editable text.
pub const TAG_DELIMITER: &str = ", ";

/// Split comma-separated tag text into trimmed, non-empty tags.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a tag list as editable text.
pub fn format_tags(tags: &[String]) -> String {
    tags.join(TAG_DELIMITER)
}

/// Which product, if any, the form is bound to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    Editing(ProductItem),
}

/// Form field values. Absent optional fields are held as empty strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub product_video: String,
    pub product_link: String,
    pub github_link: String,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
}

impl ProductForm {
    fn from_product(item: &ProductItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            thumbnail_url: item.thumbnail_url.clone().unwrap_or_default(),
            product_video: item.product_video.clone().unwrap_or_default(),
            product_link: item.product_link.clone().unwrap_or_default(),
            github_link: item.github_link.clone().unwrap_or_default(),
            category_id: item.category_id,
            tags: item.tags.clone().unwrap_or_default(),
        }
    }

    fn to_payload(&self, selected_categories: &[i64]) -> ProductCreateInput {
        ProductCreateInput {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            thumbnail_url: Some(self.thumbnail_url.clone()),
            product_video: Some(self.product_video.clone()),
            product_link: Some(self.product_link.clone()),
            github_link: Some(self.github_link.clone()),
            category_id: self.category_id,
            tags: Some(self.tags.clone()),
            category_ids: if selected_categories.is_empty() {
                None
            } else {
                Some(selected_categories.to_vec())
            },
        }
    }
}

/// Result of [`ProductEditor::delete_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The confirmation step said no.
    Declined,
    Deleted,
    /// Deleted the product currently loaded in the form. The editor stays bound to it.
    DeletedWhileEditing,
    Failed,
}

/// Admin-side product editor.
pub struct ProductEditor {
    store: Arc<dyn DataStore>,
    cache: Arc<QueryCache>,
    state: EditorState,
    form: ProductForm,
    selected_categories: Vec<i64>,
    tags_input: String,
}

impl ProductEditor {
    pub fn new(store: Arc<dyn DataStore>, cache: Arc<QueryCache>) -> Self {
        Self {
            store,
            cache,
            state: EditorState::Idle,
            form: ProductForm::default(),
            selected_categories: Vec::new(),
            tags_input: String::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing(_))
    }

    /// Card heading for the current mode.
    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit Product Item"
        } else {
            "Add New Product Item"
        }
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    /// Mutable access for plain field edits. Tags go through [`Self::edit_tags_text`].
    pub fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    /// Selected category ids in the order they were picked.
    pub fn selected_categories(&self) -> &[i64] {
        &self.selected_categories
    }

    pub fn is_category_selected(&self, category_id: i64) -> bool {
        self.selected_categories.contains(&category_id)
    }

    /// Raw tags text as typed.
    pub fn tags_input(&self) -> &str {
        &self.tags_input
    }

    /// Bind the form to `item`, replacing any previous edit.
    pub fn start_edit(&mut self, item: ProductItem) {
        self.form = ProductForm::from_product(&item);
        self.selected_categories = item.category_ids();
        self.tags_input = item
            .tags
            .as_deref()
            .map(format_tags)
            .unwrap_or_default();
        tracing::debug!("Editing product {}", item.id);
        self.state = EditorState::Editing(item);
    }

    /// Flip membership of `category_id` in the selection.
    pub fn toggle_category(&mut self, category_id: i64) {
        if let Some(pos) = self
            .selected_categories
            .iter()
            .position(|id| *id == category_id)
        {
            self.selected_categories.remove(pos);
        } else {
            self.selected_categories.push(category_id);
        }
    }

    /// Store the raw text and derive the submitted tag list from it.
    pub fn edit_tags_text(&mut self, text: impl Into<String>) {
        self.tags_input = text.into();
        self.form.tags = parse_tags(&self.tags_input);
    }

    /// The payload the next submit would send.
    pub fn payload(&self) -> ProductCreateInput {
        self.form.to_payload(&self.selected_categories)
    }

    /// Create or update from the current form.
    ///
    /// On success the product cache namespaces are invalidated and the editor
    /// returns to `Idle`. Failures are logged and leave the form untouched.
    pub async fn submit(&mut self) -> Option<ProductItem> {
        let payload = self.payload();

        let result = match &self.state {
            EditorState::Editing(item) => self.store.update_product(item.id, &payload).await,
            EditorState::Idle => self.store.add_product(&payload).await,
        };

        match result {
            Ok(saved) => {
                self.invalidate_products().await;
                self.reset();
                Some(saved)
            }
            Err(e) => {
                tracing::error!("Error saving product item: {}", e);
                None
            }
        }
    }

    /// Drop the current edit without touching the store.
    pub fn cancel_edit(&mut self) {
        self.reset();
    }

    /// Delete product `id` once `confirm` agrees.
    pub async fn delete_item<F>(&mut self, id: i64, confirm: F) -> DeleteOutcome
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            return DeleteOutcome::Declined;
        }

        match self.store.delete_product(id).await {
            Ok(()) => {
                self.invalidate_products().await;
                match &self.state {
                    EditorState::Editing(item) if item.id == id => {
                        tracing::warn!("Deleted product {} while it was being edited", id);
                        DeleteOutcome::DeletedWhileEditing
                    }
                    _ => DeleteOutcome::Deleted,
                }
            }
            Err(e) => {
                tracing::error!("Error deleting product item: {}", e);
                DeleteOutcome::Failed
            }
        }
    }

    async fn invalidate_products(&self) {
        self.cache.invalidate(&QueryKey::products()).await;
        self.cache
            .invalidate(&QueryKey::products_by_category_namespace())
            .await;
        self.cache
            .invalidate(&QueryKey::products_by_category_id_namespace())
            .await;
    }

    fn reset(&mut self) {
        self.state = EditorState::Idle;
        self.form = ProductForm::default();
        self.selected_categories.clear();
        self.tags_input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::models::CategoryRef;
    use crate::store::fake::{Journal, RecordingStore, StoreCall};

    fn editor_with(store: RecordingStore) -> (ProductEditor, Arc<QueryCache>) {
        let cache = Arc::new(QueryCache::new());
        (ProductEditor::new(Arc::new(store), cache.clone()), cache)
    }

    fn item(id: i64, title: &str) -> ProductItem {
        ProductItem {
            id,
            title: title.to_string(),
            description: None,
            thumbnail_url: None,
            product_video: None,
            product_link: None,
            github_link: None,
            category_id: None,
            categories: None,
            tags: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn product_namespaces() -> Vec<QueryKey> {
        vec![
            QueryKey::products(),
            QueryKey::products_by_category_namespace(),
            QueryKey::products_by_category_id_namespace(),
        ]
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("a, b ,, c"), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
        assert_eq!(parse_tags("rust"), vec!["rust"]);
    }

    #[test]
    fn test_start_edit_seeds_everything() {
        let journal = Journal::default();
        let (mut editor, _) = editor_with(RecordingStore::new(journal.clone()));

        let mut product = item(5, "X");
        product.description = Some("desc".to_string());
        product.category_id = Some(9);
        product.categories = Some(vec![CategoryRef {
            id: 2,
            name: "Art".to_string(),
        }]);
        product.tags = Some(vec!["x".to_string(), "y".to_string()]);

        editor.start_edit(product.clone());

        assert_eq!(editor.state(), &EditorState::Editing(product));
        assert_eq!(editor.selected_categories(), &[2]);
        assert_eq!(editor.tags_input(), "x, y");
        assert_eq!(editor.form().title, "X");
        assert_eq!(editor.form().description, "desc");
        assert_eq!(editor.form().thumbnail_url, "");
        assert_eq!(editor.heading(), "Edit Product Item");
        assert!(journal.calls().is_empty());
    }

    #[test]
    fn test_start_edit_falls_back_to_legacy_category() {
        let (mut editor, _) = editor_with(RecordingStore::new(Journal::default()));

        let mut legacy = item(1, "Legacy");
        legacy.category_id = Some(4);
        legacy.categories = Some(vec![]);
        editor.start_edit(legacy);
        assert_eq!(editor.selected_categories(), &[4]);
        assert_eq!(editor.tags_input(), "");

        editor.start_edit(item(2, "Bare"));
        assert!(editor.selected_categories().is_empty());
    }

    #[test]
    fn test_toggle_category_keeps_insertion_order() {
        let (mut editor, _) = editor_with(RecordingStore::new(Journal::default()));

        editor.toggle_category(3);
        editor.toggle_category(1);
        editor.toggle_category(7);
        editor.toggle_category(1);
        assert_eq!(editor.selected_categories(), &[3, 7]);
        assert!(editor.is_category_selected(7));
        assert!(!editor.is_category_selected(1));

        editor.toggle_category(1);
        assert_eq!(editor.selected_categories(), &[3, 7, 1]);
    }

    #[test]
    fn test_tags_text_is_kept_verbatim() {
        let (mut editor, _) = editor_with(RecordingStore::new(Journal::default()));

        editor.edit_tags_text("a, b ,, c");

        assert_eq!(editor.tags_input(), "a, b ,, c");
        assert_eq!(editor.form().tags, vec!["a", "b", "c"]);
        assert_eq!(
            editor.payload().tags,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[tokio::test]
    async fn test_edit_toggle_submit_scenario() {
        let journal = Journal::default();
        let (mut editor, cache) = editor_with(RecordingStore::new(journal.clone()));
        cache
            .put(QueryKey::products_by_category("microsaas"), &1)
            .await
            .unwrap();
        cache
            .put(QueryKey::products_by_category_id(2), &1)
            .await
            .unwrap();

        let mut product = item(5, "X");
        product.categories = Some(vec![CategoryRef {
            id: 2,
            name: "Art".to_string(),
        }]);
        product.tags = Some(vec!["x".to_string(), "y".to_string()]);

        editor.start_edit(product);
        assert_eq!(editor.selected_categories(), &[2]);
        assert_eq!(editor.tags_input(), "x, y");

        editor.toggle_category(3);
        assert_eq!(editor.selected_categories(), &[2, 3]);

        let saved = editor.submit().await;
        assert_eq!(saved.map(|p| p.id), Some(5));

        let calls = journal.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            StoreCall::Update(id, payload) => {
                assert_eq!(*id, 5);
                assert_eq!(payload.title, "X");
                assert_eq!(
                    payload.tags,
                    Some(vec!["x".to_string(), "y".to_string()])
                );
                assert_eq!(payload.category_ids, Some(vec![2, 3]));
            }
            other => panic!("expected update, got {:?}", other),
        }

        assert_eq!(cache.invalidation_history().await, product_namespaces());
        assert!(cache.is_stale(&QueryKey::products_by_category("microsaas")).await);
        assert!(cache.is_stale(&QueryKey::products_by_category_id(2)).await);

        assert_eq!(editor.state(), &EditorState::Idle);
        assert!(editor.selected_categories().is_empty());
        assert_eq!(editor.tags_input(), "");
        assert_eq!(editor.form(), &ProductForm::default());
    }

    #[tokio::test]
    async fn test_submit_in_idle_creates_without_category_ids() {
        let journal = Journal::default();
        let (mut editor, _) = editor_with(RecordingStore::new(journal.clone()));

        editor.form_mut().title = "New".to_string();
        let saved = editor.submit().await;

        assert!(saved.is_some());
        match &journal.calls()[0] {
            StoreCall::Add(payload) => {
                assert_eq!(payload.title, "New");
                assert_eq!(payload.tags, Some(vec![]));
                assert_eq!(payload.category_ids, None);
            }
            other => panic!("expected add, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form() {
        let journal = Journal::default();
        let mut store = RecordingStore::new(journal.clone());
        store.mutation_error = Some(AppError::Validation("Title is required".to_string()));
        let (mut editor, cache) = editor_with(store);

        let mut product = item(8, "Keep me");
        product.category_id = Some(1);
        editor.start_edit(product.clone());
        editor.edit_tags_text("one, two");

        assert!(editor.submit().await.is_none());

        assert_eq!(editor.state(), &EditorState::Editing(product));
        assert_eq!(editor.tags_input(), "one, two");
        assert_eq!(editor.selected_categories(), &[1]);
        assert!(cache.invalidation_history().await.is_empty());
    }

    #[test]
    fn test_cancel_edit_is_idempotent() {
        let journal = Journal::default();
        let (mut editor, _) = editor_with(RecordingStore::new(journal.clone()));

        let mut product = item(3, "Y");
        product.tags = Some(vec!["t".to_string()]);
        editor.start_edit(product);
        editor.toggle_category(6);

        editor.cancel_edit();
        let once = (
            editor.state().clone(),
            editor.form().clone(),
            editor.selected_categories().to_vec(),
            editor.tags_input().to_string(),
        );
        editor.cancel_edit();
        let twice = (
            editor.state().clone(),
            editor.form().clone(),
            editor.selected_categories().to_vec(),
            editor.tags_input().to_string(),
        );

        assert_eq!(once, twice);
        assert_eq!(once.0, EditorState::Idle);
        assert_eq!(editor.heading(), "Add New Product Item");
        assert!(journal.calls().is_empty());
    }

    #[tokio::test]
    async fn test_declined_delete_does_nothing() {
        let journal = Journal::default();
        let (mut editor, cache) = editor_with(RecordingStore::new(journal.clone()));

        let outcome = editor.delete_item(4, || false).await;

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert!(journal.calls().is_empty());
        assert!(cache.invalidation_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_delete_invalidates() {
        let journal = Journal::default();
        let (mut editor, cache) = editor_with(RecordingStore::new(journal.clone()));
        editor.start_edit(item(1, "Other"));

        let outcome = editor.delete_item(4, || true).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(journal.calls(), vec![StoreCall::Delete(4)]);
        assert_eq!(cache.invalidation_history().await, product_namespaces());
        assert!(editor.is_editing());
    }

    #[tokio::test]
    async fn test_deleting_edited_item_keeps_editing() {
        let (mut editor, _) = editor_with(RecordingStore::new(Journal::default()));
        editor.start_edit(item(4, "Doomed"));

        let outcome = editor.delete_item(4, || true).await;

        assert_eq!(outcome, DeleteOutcome::DeletedWhileEditing);
        assert!(editor.is_editing());
    }

    #[tokio::test]
    async fn test_failed_delete_skips_invalidation() {
        let mut store = RecordingStore::new(Journal::default());
        store.mutation_error = Some(AppError::NotFound("Product 4 not found".to_string()));
        let (mut editor, cache) = editor_with(store);

        let outcome = editor.delete_item(4, || true).await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert!(cache.invalidation_history().await.is_empty());
    }
}
