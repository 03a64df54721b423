//! REST adapter for the hosted realtime database.
//!
//! Every document lives at `{base}/{collection}/{key}.json`. A `GET` on a
//! missing path answers `200 null`, a `PUT` replaces the whole subtree and
//! a `DELETE` of a missing path succeeds. Equality queries use the
//! `orderBy`/`equalTo` parameters, both JSON-encoded.
//!
//! Failures come back as `{"error": "..."}` with a non-2xx status.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{Document, DocumentStore, RepositoryError, new_document_key, validate_key};

/// Client for the hosted realtime database.
#[derive(Clone)]
pub struct RealtimeDatabase {
    inner: Arc<RealtimeDatabaseInner>,
}

struct RealtimeDatabaseInner {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: String,
}

impl RealtimeDatabase {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Provider` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, RepositoryError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RepositoryError::Provider(format!("invalid database URL: {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(RepositoryError::Provider(format!(
                "database URL must be http(s): {base_url}"
            )));
        }

        Ok(Self {
            inner: Arc::new(RealtimeDatabaseInner {
                client: reqwest::Client::new(),
                base_url,
            }),
        })
    }

    /// Build `{base}/{collection}[/{key}].json` with each segment escaped.
    fn url_for(&self, collection: &str, key: Option<&str>) -> Result<Url, RepositoryError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RepositoryError::Provider("database URL cannot be a base".to_owned())
            })?;
            segments.pop_if_empty();
            match key {
                Some(key) => {
                    segments.push(collection).push(&format!("{key}.json"));
                }
                None => {
                    segments.push(&format!("{collection}.json"));
                }
            }
        }
        Ok(url)
    }

    /// Read the body, turning provider errors into `RepositoryError::Provider`.
    async fn read_body(&self, response: reqwest::Response) -> Result<Document, RepositoryError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Realtime database returned non-success status"
            );
            let message = serde_json::from_str::<ProviderError>(&body).map_or_else(
                |_| format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
                |e| e.error,
            );
            return Err(RepositoryError::Provider(message));
        }

        if body.trim().is_empty() {
            return Ok(Document::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse realtime database response"
            );
            RepositoryError::Serialization(e)
        })
    }

    fn into_entries(
        collection: &str,
        body: Document,
    ) -> Result<Vec<(String, Document)>, RepositoryError> {
        match body {
            Document::Null => Ok(Vec::new()),
            Document::Object(map) => Ok(map.into_iter().collect()),
            other => Err(RepositoryError::DataCorruption(format!(
                "expected an object at {collection}, got {}",
                json_kind(&other)
            ))),
        }
    }
}

const fn json_kind(value: &Document) -> &'static str {
    match value {
        Document::Null => "null",
        Document::Bool(_) => "a boolean",
        Document::Number(_) => "a number",
        Document::String(_) => "a string",
        Document::Array(_) => "an array",
        Document::Object(_) => "an object",
    }
}

#[async_trait]
impl DocumentStore for RealtimeDatabase {
    fn allocate_key(&self, _collection: &str) -> String {
        new_document_key()
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, RepositoryError> {
        validate_key(key)?;
        let url = self.url_for(collection, Some(key))?;
        debug!(%url, "GET document");

        let response = self.inner.client.get(url).send().await?;
        match self.read_body(response).await? {
            Document::Null => Ok(None),
            doc => Ok(Some(doc)),
        }
    }

    #[instrument(skip(self, document))]
    async fn set(
        &self,
        collection: &str,
        key: &str,
        document: &Document,
    ) -> Result<(), RepositoryError> {
        validate_key(key)?;
        let url = self.url_for(collection, Some(key))?;
        debug!(%url, "PUT document");

        let response = self.inner.client.put(url).json(document).send().await?;
        self.read_body(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        validate_key(key)?;
        let url = self.url_for(collection, Some(key))?;
        debug!(%url, "DELETE document");

        let response = self.inner.client.delete(url).send().await?;
        self.read_body(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, RepositoryError> {
        let url = self.url_for(collection, None)?;
        debug!(%url, "GET collection");

        let response = self.inner.client.get(url).send().await?;
        let body = self.read_body(response).await?;
        Self::into_entries(collection, body)
    }

    #[instrument(skip(self))]
    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Document,
    ) -> Result<Vec<(String, Document)>, RepositoryError> {
        let mut url = self.url_for(collection, None)?;
        url.query_pairs_mut()
            .append_pair("orderBy", &Document::from(field).to_string())
            .append_pair("equalTo", &value.to_string());
        debug!(%url, "GET collection query");

        let response = self.inner.client.get(url).send().await?;
        let body = self.read_body(response).await?;
        Self::into_entries(collection, body)
    }
}
