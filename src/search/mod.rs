//! Tantivy-based search index module.
//!
//! Provides full-text search over products with field boosting.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, INDEXED, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::ProductItem;

/// Field boost values.
const BOOST_TITLE: f32 = 10.0;
const BOOST_TAGS: f32 = 8.0;
const BOOST_CATEGORIES: f32 = 6.0;
const BOOST_DESCRIPTION: f32 = 4.0;

/// Deepest rank a search page may reach (`offset + limit`).
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Search result with product id and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub product_id: i64,
    pub score: f32,
}

/// One page of hits plus the number of matching products.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub total: usize,
    pub hits: Vec<SearchResult>,
}

/// Search index schema fields.
struct SearchFields {
    product_id: Field,
    title: Field,
    description: Field,
    tags: Field,
    categories: Field,
}

/// Tantivy search index for products.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let product_id = schema_builder.add_i64_field("product_id", INDEXED | STORED);
        let title = schema_builder.add_text_field("title", TEXT | STORED);
        let description = schema_builder.add_text_field("description", TEXT);
        let tags = schema_builder.add_text_field("tags", TEXT);
        let categories = schema_builder.add_text_field("categories", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            product_id,
            title,
            description,
            tags,
            categories,
        };

        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from products.
    pub async fn rebuild(&self, products: &[ProductItem]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for product in products {
            writer.add_document(self.create_document(product))?;
        }
        writer.commit()?;
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} products", products.len());
        Ok(())
    }

    /// Index or re-index a single product.
    pub async fn index_product(&self, product: &ProductItem) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_i64(self.fields.product_id, product.id));
        writer.add_document(self.create_document(product))?;
        writer.commit()?;

        self.reader.reload()?;
        Ok(())
    }

    /// Remove a product from the index.
    pub async fn remove_product(&self, product_id: i64) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_i64(self.fields.product_id, product_id));
        writer.commit()?;

        self.reader.reload()?;
        Ok(())
    }

    /// Search for products matching the query.
    ///
    /// Ranks past [`MAX_RESULT_WINDOW`] are never collected; `total` still counts them.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchHits, AppError> {
        if query_str.trim().is_empty() {
            return Ok(SearchHits::default());
        }

        let searcher = self.reader.searcher();

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![
                self.fields.title,
                self.fields.description,
                self.fields.tags,
                self.fields.categories,
            ],
        );

        let base_query = query_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();

        let field_queries = [
            (self.fields.title, BOOST_TITLE),
            (self.fields.tags, BOOST_TAGS),
            (self.fields.categories, BOOST_CATEGORIES),
            (self.fields.description, BOOST_DESCRIPTION),
        ];

        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                subqueries.push((Occur::Should, Box::new(BoostQuery::new(field_query, boost))));
            }
        }

        let combined_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        let window = limit.saturating_add(offset).min(MAX_RESULT_WINDOW);
        if window <= offset {
            let total = searcher
                .search(&combined_query, &Count)
                .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;
            return Ok(SearchHits {
                total,
                hits: Vec::new(),
            });
        }

        let (total, top_docs) = searcher
            .search(&combined_query, &(Count, TopDocs::with_limit(window)))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let hits = top_docs
            .into_iter()
            .skip(offset)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let product_id = doc.get_first(self.fields.product_id)?.as_i64()?;
                Some(SearchResult { product_id, score })
            })
            .collect();

        Ok(SearchHits { total, hits })
    }

    fn create_document(&self, product: &ProductItem) -> TantivyDocument {
        let tags = product
            .tags
            .as_ref()
            .map(|t| t.join(" "))
            .unwrap_or_default();
        let categories = product
            .categories
            .as_ref()
            .map(|c| {
                c.iter()
                    .map(|category| category.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        doc!(
            self.fields.product_id => product.id,
            self.fields.title => product.title.clone(),
            self.fields.description => product.description.clone().unwrap_or_default(),
            self.fields.tags => tags,
            self.fields.categories => categories
        )
    }
}
