//! Product repository over the `products` collection.

use std::sync::Arc;

use chrono::Utc;
use tracing::{instrument, warn};

use shopnow_core::{Category, ProductId};

use super::{Document, DocumentStore, RepositoryError};
use crate::models::{Product, ProductData};

const COLLECTION: &str = "products";

/// Repository for catalog products.
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn DocumentStore>,
    search_limit: Option<usize>,
}

impl ProductRepository {
    /// Create a repository. `search_limit` caps name-search results;
    /// `None` returns every match.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, search_limit: Option<usize>) -> Self {
        Self {
            store,
            search_limit,
        }
    }

    /// Create a product under a freshly allocated key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn create(&self, data: ProductData) -> Result<Product, RepositoryError> {
        let id = ProductId::new(self.store.allocate_key(COLLECTION));
        let now = Utc::now();
        let product = Product::from_data(id, data, Some(now), now);

        self.write(&product).await?;
        tracing::info!(id = %product.id, "product created");
        Ok(product)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such product and
    /// `RepositoryError::DataCorruption` if the stored document is not a
    /// product.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let doc = self
            .store
            .get(COLLECTION, id.as_str())
            .await?
            .ok_or(RepositoryError::NotFound)?;
        decode(id.as_str().to_owned(), doc)
    }

    /// Every product, in provider order.
    ///
    /// Documents that do not decode as products are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let docs = self.store.list(COLLECTION).await?;
        Ok(decode_all(docs))
    }

    /// Products in `category`, filtered by the provider.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Product>, RepositoryError> {
        let docs = self
            .store
            .query_equal(COLLECTION, "category", &Document::from(category.as_str()))
            .await?;
        Ok(decode_all(docs))
    }

    /// Products whose name contains `term`, ignoring case.
    ///
    /// Reads the whole collection and filters locally. An empty term matches
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let needle = term.trim().to_lowercase();
        let matches = self
            .list_all()
            .await?
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle));

        Ok(match self.search_limit {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        })
    }

    /// Replace the product stored under `id` with `data`.
    ///
    /// Full overwrite: fields absent from `data`, and the creation time,
    /// are not carried over. Updating a missing id creates it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        id: &ProductId,
        data: ProductData,
    ) -> Result<Product, RepositoryError> {
        let product = Product::from_data(id.clone(), data, None, Utc::now());
        self.write(&product).await?;
        tracing::info!(id = %product.id, "product updated");
        Ok(product)
    }

    /// Delete a product. Deleting a missing id succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.store.remove(COLLECTION, id.as_str()).await?;
        tracing::info!(id = %id, "product deleted");
        Ok(())
    }

    async fn write(&self, product: &Product) -> Result<(), RepositoryError> {
        let doc = serde_json::to_value(product)?;
        self.store.set(COLLECTION, product.id.as_str(), &doc).await
    }
}

fn decode(key: String, doc: Document) -> Result<Product, RepositoryError> {
    let mut product: Product = serde_json::from_value(doc).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid product {key}: {e}"))
    })?;
    product.id = ProductId::new(key);
    Ok(product)
}

fn decode_all(docs: Vec<(String, Document)>) -> Vec<Product> {
    docs.into_iter()
        .filter_map(|(key, doc)| match decode(key, doc) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(error = %e, "skipping unreadable product");
                None
            }
        })
        .collect()
}
