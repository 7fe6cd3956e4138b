//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CategoryItem, CategoryRef, CreateCategoryRequest, ProductCreateInput, ProductItem,
    RevisionInfo,
};
use crate::store::DataStore;

const PRODUCT_COLUMNS: &str = "id, title, description, thumbnail_url, product_video, product_link, github_link, category_id, tags, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    // ==================== CATEGORY OPERATIONS ====================

    /// List all categories.
    pub async fn list_categories(&self) -> Result<Vec<CategoryItem>, AppError> {
        let rows = sqlx::query("SELECT id, name, slug FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Get a category by slug.
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<CategoryItem>, AppError> {
        let row = sqlx::query("SELECT id, name, slug FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Create a new category.
    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<CategoryItem, AppError> {
        if self.get_category_by_slug(&request.slug).await?.is_some() {
            return Err(AppError::Validation(format!(
                "Category slug {} already exists",
                request.slug
            )));
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
            .bind(&request.name)
            .bind(&request.slug)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        Ok(CategoryItem {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            slug: request.slug.clone(),
        })
    }

    // ==================== PRODUCT OPERATIONS ====================

    /// List all products in id order.
    pub async fn list_products(&self) -> Result<Vec<ProductItem>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_categories(rows.iter().map(product_from_row).collect())
            .await
    }

    /// List products linked to the category with `slug`, directly or via the legacy column.
    pub async fn list_products_by_category(&self, slug: &str) -> Result<Vec<ProductItem>, AppError> {
        match self.get_category_by_slug(slug).await? {
            Some(category) => self.list_products_by_category_id(category.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// List products linked to category `category_id`.
    ///
    /// The legacy column only counts for products without any links.
    pub async fn list_products_by_category_id(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductItem>, AppError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM products
               WHERE id IN (SELECT product_id FROM product_categories WHERE category_id = ?)
                  OR (category_id = ?
                      AND NOT EXISTS (SELECT 1 FROM product_categories pc WHERE pc.product_id = products.id))
               ORDER BY id"#,
            PRODUCT_COLUMNS
        ))
        .bind(category_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_categories(rows.iter().map(product_from_row).collect())
            .await
    }

    /// Get a product by ID.
    pub async fn get_product(&self, id: i64) -> Result<Option<ProductItem>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut products = self.with_categories(vec![product_from_row(&row)]).await?;
                Ok(products.pop())
            }
            None => Ok(None),
        }
    }

    /// Get the products with `ids`, in the order given. Unknown ids are skipped.
    pub async fn get_products_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductItem>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM products WHERE id IN (",
            PRODUCT_COLUMNS
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = query.build().fetch_all(&self.pool).await?;
        let mut by_id: HashMap<i64, ProductItem> = self
            .with_categories(rows.iter().map(product_from_row).collect())
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Create a new product.
    pub async fn create_product(&self, input: &ProductCreateInput) -> Result<ProductItem, AppError> {
        validate_product(input)?;
        self.validate_category_ids(input.category_ids.as_deref())
            .await?;

        let now = Utc::now().to_rfc3339();
        let category_id = legacy_category_id(input);
        let tags_json = tags_to_json(input.tags.as_ref());

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO products (title, description, thumbnail_url, product_video, product_link, github_link, category_id, tags, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(input.title.trim())
        .bind(blank_to_none(&input.description))
        .bind(blank_to_none(&input.thumbnail_url))
        .bind(blank_to_none(&input.product_video))
        .bind(blank_to_none(&input.product_link))
        .bind(blank_to_none(&input.github_link))
        .bind(category_id)
        .bind(&tags_json)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        if let Some(ids) = &input.category_ids {
            replace_links(&mut *tx, id, ids).await?;
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        self.get_product(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Product {} vanished after insert", id)))
    }

    /// Replace a product with `input`.
    pub async fn update_product(
        &self,
        id: i64,
        input: &ProductCreateInput,
    ) -> Result<ProductItem, AppError> {
        validate_product(input)?;
        self.validate_category_ids(input.category_ids.as_deref())
            .await?;

        let now = Utc::now().to_rfc3339();
        let category_id = legacy_category_id(input);
        let tags_json = tags_to_json(input.tags.as_ref());

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products SET title = ?, description = ?, thumbnail_url = ?, product_video = ?, product_link = ?, github_link = ?, category_id = ?, tags = ?, updated_at = ? WHERE id = ?"
        )
        .bind(input.title.trim())
        .bind(blank_to_none(&input.description))
        .bind(blank_to_none(&input.thumbnail_url))
        .bind(blank_to_none(&input.product_video))
        .bind(blank_to_none(&input.product_link))
        .bind(blank_to_none(&input.github_link))
        .bind(category_id)
        .bind(&tags_json)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        if let Some(ids) = &input.category_ids {
            replace_links(&mut *tx, id, ids).await?;
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        self.get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    /// Delete a product.
    pub async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Link `ids` to the category with `slug`.
    ///
    /// Returns `false` for an unknown slug. Ids without a product are skipped.
    pub async fn assign_products_to_category(
        &self,
        ids: &[i64],
        slug: &str,
    ) -> Result<bool, AppError> {
        let Some(category) = self.get_category_by_slug(slug).await? else {
            tracing::warn!("Cannot assign products: no category with slug {}", slug);
            return Ok(false);
        };

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut linked = 0;

        for id in ids {
            let result = sqlx::query("UPDATE products SET category_id = ?, updated_at = ? WHERE id = ?")
                .bind(category.id)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                tracing::warn!("Skipping assignment of missing product {} to {}", id, slug);
                continue;
            }

            sqlx::query(
                "INSERT OR IGNORE INTO product_categories (product_id, category_id) VALUES (?, ?)",
            )
            .bind(id)
            .bind(category.id)
            .execute(&mut *tx)
            .await?;
            linked += 1;
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("Linked {} of {} products to {}", linked, ids.len(), slug);
        Ok(true)
    }

    /// Reject category ids that do not exist.
    async fn validate_category_ids(&self, ids: Option<&[i64]>) -> Result<(), AppError> {
        let Some(ids) = ids else {
            return Ok(());
        };

        let known: HashSet<i64> = sqlx::query("SELECT id FROM categories")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| row.get("id"))
            .collect();

        match ids.iter().find(|id| !known.contains(*id)) {
            Some(unknown) => Err(AppError::Validation(format!(
                "Category {} does not exist",
                unknown
            ))),
            None => Ok(()),
        }
    }

    /// Attach linked categories to each product.
    async fn with_categories(
        &self,
        mut products: Vec<ProductItem>,
    ) -> Result<Vec<ProductItem>, AppError> {
        if products.is_empty() {
            return Ok(products);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"SELECT pc.product_id, c.id, c.name
               FROM product_categories pc
               JOIN categories c ON c.id = pc.category_id
               WHERE pc.product_id IN ("#,
        );
        let mut separated = query.separated(", ");
        for product in &products {
            separated.push_bind(product.id);
        }
        separated.push_unseparated(") ORDER BY c.name");

        let rows = query.build().fetch_all(&self.pool).await?;

        let mut links: HashMap<i64, Vec<CategoryRef>> = HashMap::new();
        for row in &rows {
            links
                .entry(row.get("product_id"))
                .or_default()
                .push(CategoryRef {
                    id: row.get("id"),
                    name: row.get("name"),
                });
        }

        for product in &mut products {
            product.categories = Some(links.remove(&product.id).unwrap_or_default());
        }

        Ok(products)
    }
}

#[async_trait]
impl DataStore for Repository {
    async fn fetch_products(&self) -> Result<Vec<ProductItem>, AppError> {
        self.list_products().await
    }

    async fn fetch_products_by_category(&self, slug: &str) -> Result<Vec<ProductItem>, AppError> {
        self.list_products_by_category(slug).await
    }

    async fn fetch_products_by_category_id(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductItem>, AppError> {
        self.list_products_by_category_id(category_id).await
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryItem>, AppError> {
        self.list_categories().await
    }

    async fn add_product(&self, payload: &ProductCreateInput) -> Result<ProductItem, AppError> {
        self.create_product(payload).await
    }

    async fn update_product(
        &self,
        id: i64,
        payload: &ProductCreateInput,
    ) -> Result<ProductItem, AppError> {
        Repository::update_product(self, id, payload).await
    }

    async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        Repository::delete_product(self, id).await
    }

    async fn assign_products_to_category(
        &self,
        ids: &[i64],
        slug: &str,
    ) -> Result<bool, AppError> {
        Repository::assign_products_to_category(self, ids, slug).await
    }
}

// Helper functions for writes and row conversion

async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn replace_links(
    conn: &mut SqliteConnection,
    product_id: i64,
    category_ids: &[i64],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for category_id in category_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO product_categories (product_id, category_id) VALUES (?, ?)",
        )
        .bind(product_id)
        .bind(category_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

fn validate_product(input: &ProductCreateInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(())
}

/// The legacy single-category column follows the first explicit category.
fn legacy_category_id(input: &ProductCreateInput) -> Option<i64> {
    match &input.category_ids {
        Some(ids) if !ids.is_empty() => ids.first().copied(),
        _ => input.category_id,
    }
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn tags_to_json(tags: Option<&Vec<String>>) -> Option<String> {
    tags.map(|t| serde_json::to_string(t).unwrap_or_default())
}

fn category_from_row(row: &sqlx::sqlite::SqliteRow) -> CategoryItem {
    CategoryItem {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

fn product_from_row(row: &sqlx::sqlite::SqliteRow) -> ProductItem {
    let tags_str: Option<String> = row.get("tags");
    ProductItem {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        thumbnail_url: row.get("thumbnail_url"),
        product_video: row.get("product_video"),
        product_link: row.get("product_link"),
        github_link: row.get("github_link"),
        category_id: row.get("category_id"),
        categories: None,
        tags: tags_str.map(|s| parse_json_array(&s)),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
