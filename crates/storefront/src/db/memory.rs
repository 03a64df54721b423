//! In-process document store.
//!
//! Used by tests and by the offline (`local`) backend. When constructed with
//! [`MemoryDocumentStore::persisted`] the whole tree is written to a
//! key-value store after every mutation and reloaded on startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{Document, DocumentStore, RepositoryError, new_document_key, validate_key};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the offline snapshot.
pub const SNAPSHOT_KEY: &str = "shopnow-documents";

type Tree = BTreeMap<String, BTreeMap<String, Document>>;

/// Document store held in memory.
///
/// Collections are ordered maps, so listings come back in key order, which
/// for [`new_document_key`] keys is creation order.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    tree: Arc<RwLock<Tree>>,
    snapshot: Option<Arc<dyn KeyValueStore>>,
}

impl MemoryDocumentStore {
    /// Create an empty, non-persistent store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that snapshots itself into `storage`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the snapshot cannot be read and
    /// `RepositoryError::DataCorruption` if it is not a valid tree.
    pub fn persisted(storage: Arc<dyn KeyValueStore>) -> Result<Self, RepositoryError> {
        let tree = match storage.load(SNAPSHOT_KEY)? {
            Some(raw) => serde_json::from_str::<Tree>(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid offline snapshot: {e}"))
            })?,
            None => Tree::new(),
        };

        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
            snapshot: Some(storage),
        })
    }

    /// Write `tree` to the snapshot storage, if any.
    ///
    /// Callers hold the write guard across this so snapshots land in
    /// mutation order; the file I/O itself runs on the blocking pool.
    async fn persist(&self, tree: &Tree) -> Result<(), RepositoryError> {
        let Some(storage) = &self.snapshot else {
            return Ok(());
        };
        let raw = serde_json::to_string(tree)?;
        let storage = Arc::clone(storage);
        tokio::task::spawn_blocking(move || storage.save(SNAPSHOT_KEY, &raw))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn allocate_key(&self, _collection: &str) -> String {
        new_document_key()
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, RepositoryError> {
        validate_key(key)?;
        let tree = self.tree.read().await;
        Ok(tree.get(collection).and_then(|docs| docs.get(key)).cloned())
    }

    #[instrument(skip(self, document))]
    async fn set(
        &self,
        collection: &str,
        key: &str,
        document: &Document,
    ) -> Result<(), RepositoryError> {
        validate_key(key)?;
        let mut tree = self.tree.write().await;
        tree.entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), document.clone());
        self.persist(&tree).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        validate_key(key)?;
        let mut tree = self.tree.write().await;
        let removed = tree
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .is_some();
        if removed {
            self.persist(&tree).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, RepositoryError> {
        let tree = self.tree.read().await;
        Ok(tree
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Document,
    ) -> Result<Vec<(String, Document)>, RepositoryError> {
        let tree = self.tree.read().await;
        Ok(tree
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field) == Some(value))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::{Duration, Instant};

    use serde_json::json;

    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryDocumentStore::new();
        let key = store.allocate_key("products");

        assert!(store.get("products", &key).await.unwrap().is_none());

        store
            .set("products", &key, &json!({"name": "Camisa"}))
            .await
            .unwrap();
        assert_eq!(
            store.get("products", &key).await.unwrap(),
            Some(json!({"name": "Camisa"}))
        );

        store.remove("products", &key).await.unwrap();
        store.remove("products", &key).await.unwrap();
        assert!(store.get("products", &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_whole_document() {
        let store = MemoryDocumentStore::new();
        store
            .set("products", "p1", &json!({"name": "A", "quantity": 3}))
            .await
            .unwrap();
        store
            .set("products", "p1", &json!({"name": "B"}))
            .await
            .unwrap();

        let doc = store.get("products", "p1").await.unwrap().unwrap();
        assert_eq!(doc, json!({"name": "B"}));
    }

    #[tokio::test]
    async fn test_query_equal_filters_on_field() {
        let store = MemoryDocumentStore::new();
        store
            .set("products", "a", &json!({"category": "tenis"}))
            .await
            .unwrap();
        store
            .set("products", "b", &json!({"category": "camisas"}))
            .await
            .unwrap();
        store.set("products", "c", &json!({})).await.unwrap();

        let hits = store
            .query_equal("products", "category", &json!("tenis"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().0, "a");
    }

    #[tokio::test]
    async fn test_list_missing_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.list("products").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_store_reloads_snapshot() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());

        let first = MemoryDocumentStore::persisted(Arc::clone(&storage)).unwrap();
        first
            .set("users", "uid-1", &json!({"email": "a@b.co"}))
            .await
            .unwrap();

        let second = MemoryDocumentStore::persisted(storage).unwrap();
        assert_eq!(
            second.get("users", "uid-1").await.unwrap(),
            Some(json!({"email": "a@b.co"}))
        );
    }

    struct SlowStore {
        inner: MemoryKeyValueStore,
        delay: Duration,
    }

    impl KeyValueStore for SlowStore {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
            std::thread::sleep(self.delay);
            self.inner.save(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_snapshot_write_leaves_runtime_free() {
        let storage = Arc::new(SlowStore {
            inner: MemoryKeyValueStore::new(),
            delay: Duration::from_millis(200),
        });
        let snapshot: Arc<dyn KeyValueStore> = Arc::<SlowStore>::clone(&storage);
        let store = MemoryDocumentStore::persisted(snapshot).unwrap();

        let start = Instant::now();
        let (written, ticked_at) = tokio::join!(
            async {
                store
                    .set("products", "p1", &json!({"name": "A"}))
                    .await
                    .map(|()| start.elapsed())
            },
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                start.elapsed()
            },
        );

        assert!(ticked_at < written.unwrap());
        assert!(storage.inner.load(SNAPSHOT_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persisted_store_rejects_corrupt_snapshot() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.save(SNAPSHOT_KEY, "not json").unwrap();

        let result = MemoryDocumentStore::persisted(storage);
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
