//! VectorStore: vector collection primitive
//!
//! ## Design
//!
//! VectorStore is a **stateless facade** over the Database's record store:
//!
//! - It holds an `Arc<Database>`, a registry handle over the same store and an
//!   optional embedding function
//! - Every call re-reads through the store; nothing is cached
//! - Clones and independent instances over one Database see the same data
//!
//! ## Write discipline
//!
//! A mutation validates its whole batch before it touches the store, then
//! hands the store a single batch call. An invalid request never leaves a
//! partial write behind.

use serde_json::Value as JsonValue;
use std::sync::Arc;
use strata_core::{ItemRow, RowPatch, Timestamp};
use tracing::debug;

use crate::database::Database;
use crate::primitives::vector::codec::{decode_item, encode_embedding, encode_metadata};
use crate::primitives::vector::collection::{validate_vector_key, CollectionRegistry};
use crate::primitives::vector::embedding::{embed_checked, EmbeddingFunction};
use crate::primitives::vector::filter::matches;
use crate::primitives::vector::{
    AddRequest, Collection, DeleteRequest, GetRequest, GetResult, UpdateRequest, VectorError,
    VectorResult,
};

/// Vector collection storage with exact similarity search
///
/// # Example
///
/// ```text
/// let db = Database::ephemeral();
/// let store = VectorStore::new(db);
///
/// store.create_collection("docs", None)?;
/// store.add(
///     "docs",
///     AddRequest::new(["1", "2"])
///         .embeddings(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
///         .documents(["alpha", "beta"]),
/// )?;
///
/// let hits = store.query("docs", QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(1))?;
/// assert_eq!(hits.ids, vec![vec!["1".to_string()]]);
/// ```
#[derive(Clone)]
pub struct VectorStore {
    pub(crate) db: Arc<Database>,
    pub(crate) registry: CollectionRegistry,
    pub(crate) embedder: Option<Arc<dyn EmbeddingFunction>>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("db", &self.db)
            .field("has_embedding_function", &self.embedder.is_some())
            .finish()
    }
}

impl VectorStore {
    /// Create a VectorStore without an embedding function
    ///
    /// Only vector operations are available: adds must carry embeddings and
    /// queries must carry query vectors.
    pub fn new(db: Arc<Database>) -> Self {
        let registry = CollectionRegistry::new(db.store().clone());
        VectorStore {
            db,
            registry,
            embedder: None,
        }
    }

    /// Attach an embedding function for document and text operations
    pub fn with_embedding_function(mut self, function: impl EmbeddingFunction + 'static) -> Self {
        self.embedder = Some(Arc::new(function));
        self
    }

    /// Get the underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// True if an embedding function is attached
    pub fn has_embedding_function(&self) -> bool {
        self.embedder.is_some()
    }

    // ========================================================================
    // Collection Management
    // ========================================================================

    /// Create a collection
    ///
    /// `metadata` must be a JSON object; it defaults to `{}`.
    pub fn create_collection(
        &self,
        name: &str,
        metadata: Option<JsonValue>,
    ) -> VectorResult<Collection> {
        self.registry.create(name, metadata)
    }

    /// Get a collection, if it exists
    pub fn get_collection(&self, name: &str) -> VectorResult<Option<Collection>> {
        self.registry.get(name)
    }

    /// Get a collection, creating it with `metadata` if it does not exist
    pub fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<JsonValue>,
    ) -> VectorResult<Collection> {
        self.registry.get_or_create(name, metadata)
    }

    /// Delete a collection and all its items
    pub fn delete_collection(&self, name: &str) -> VectorResult<()> {
        self.registry.delete(name)
    }

    /// List all collections
    pub fn list_collections(&self) -> VectorResult<Vec<Collection>> {
        self.registry.list()
    }

    /// Check whether a collection exists
    pub fn collection_exists(&self, name: &str) -> VectorResult<bool> {
        self.registry.exists(name)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert or replace items
    ///
    /// An existing id is replaced wholesale and moves to the end of the scan
    /// order. Returns the ids in input order.
    ///
    /// # Errors
    /// - `CollectionNotFound` if the collection doesn't exist
    /// - `MissingEmbeddingSource` if neither embeddings nor documents are given
    /// - `MissingEmbeddingFunction` if documents must be embedded and no
    ///   embedding function is attached
    /// - `LengthMismatch`, `EmptyEmbedding`, `DimensionMismatch`,
    ///   `InvalidKey` or `InvalidArgument` for a malformed batch
    pub fn add(&self, collection: &str, request: AddRequest) -> VectorResult<Vec<String>> {
        self.registry.ensure_exists(collection)?;

        let AddRequest {
            ids,
            embeddings,
            documents,
            metadatas,
        } = request;

        validate_ids(&ids)?;
        if embeddings.is_none() && documents.is_none() {
            return Err(VectorError::MissingEmbeddingSource);
        }
        check_len("documents", ids.len(), documents.as_ref())?;
        check_len("metadatas", ids.len(), metadatas.as_ref())?;

        let embeddings = match embeddings {
            Some(embeddings) => embeddings,
            None => self.embed(documents.as_deref().unwrap_or_default())?,
        };
        check_len("embeddings", ids.len(), Some(&embeddings))?;
        validate_embeddings(&ids, &embeddings)?;

        let metadatas = match metadatas {
            Some(metadatas) => metadatas
                .into_iter()
                .map(encode_item_metadata)
                .collect::<VectorResult<Vec<_>>>()?,
            None => vec![None; ids.len()],
        };
        let mut documents = documents.map(Vec::into_iter);

        let created_at = Timestamp::now();
        let rows: Vec<ItemRow> = ids
            .iter()
            .zip(embeddings.iter())
            .zip(metadatas)
            .map(|((id, embedding), metadata)| ItemRow {
                id: id.clone(),
                document: documents.as_mut().and_then(Iterator::next),
                embedding: encode_embedding(embedding),
                metadata,
                created_at,
            })
            .collect();

        let count = rows.len();
        self.db.store().upsert_rows(collection, rows)?;
        debug!(target: "strata::vector", collection, count, "Items added");

        Ok(ids)
    }

    /// Overwrite selected fields of existing items
    ///
    /// Only the supplied lists are written. A `None` metadata entry clears
    /// that item's metadata. Ids that do not exist are skipped. The scan
    /// position and `created_at` of updated items do not change.
    ///
    /// When `documents` are given without `embeddings`, new embeddings are
    /// derived from the documents.
    pub fn update(&self, collection: &str, request: UpdateRequest) -> VectorResult<()> {
        self.registry.ensure_exists(collection)?;

        let UpdateRequest {
            ids,
            embeddings,
            documents,
            metadatas,
        } = request;

        validate_ids(&ids)?;
        check_len("embeddings", ids.len(), embeddings.as_ref())?;
        check_len("documents", ids.len(), documents.as_ref())?;
        check_len("metadatas", ids.len(), metadatas.as_ref())?;

        let embeddings = match (embeddings, &documents) {
            (Some(embeddings), _) => Some(embeddings),
            (None, Some(documents)) => {
                let embeddings = self.embed(documents)?;
                check_len("embeddings", ids.len(), Some(&embeddings))?;
                Some(embeddings)
            }
            (None, None) => None,
        };
        if let Some(embeddings) = &embeddings {
            validate_embeddings(&ids, embeddings)?;
        }

        let metadatas = metadatas
            .map(|metadatas| {
                metadatas
                    .into_iter()
                    .map(encode_item_metadata)
                    .collect::<VectorResult<Vec<_>>>()
            })
            .transpose()?;

        let mut embeddings = embeddings.map(Vec::into_iter);
        let mut documents = documents.map(Vec::into_iter);
        let mut metadatas = metadatas.map(Vec::into_iter);

        let patches: Vec<RowPatch> = ids
            .into_iter()
            .map(|id| RowPatch {
                id,
                embedding: embeddings
                    .as_mut()
                    .and_then(Iterator::next)
                    .map(|e| encode_embedding(&e)),
                document: documents.as_mut().and_then(Iterator::next),
                metadata: metadatas.as_mut().and_then(Iterator::next),
            })
            .collect();

        let requested = patches.len();
        let touched = self.db.store().update_rows(collection, patches)?;
        debug!(target: "strata::vector", collection, requested, touched, "Items updated");

        Ok(())
    }

    /// Delete items by id, or by filter
    ///
    /// With `ids` set, exactly those ids are deleted and the filters are
    /// ignored. Otherwise every item matching both filters is deleted; with
    /// no filters that is every item. Returns the number of items removed.
    pub fn delete(&self, collection: &str, request: DeleteRequest) -> VectorResult<usize> {
        self.registry.ensure_exists(collection)?;
        let store = self.db.store();

        let ids = match request.ids {
            Some(ids) => ids,
            None if request.where_metadata.is_none() && request.where_document.is_none() => store
                .scan_rows(collection)?
                .into_iter()
                .map(|row| row.id)
                .collect(),
            None => {
                let mut ids = Vec::new();
                for row in store.scan_rows(collection)? {
                    let item = decode_item(row)?;
                    if matches(
                        &item,
                        request.where_metadata.as_ref(),
                        request.where_document.as_ref(),
                    ) {
                        ids.push(item.id);
                    }
                }
                ids
            }
        };

        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = store.delete_rows(collection, &ids)?;
        debug!(target: "strata::vector", collection, deleted, "Items deleted");
        Ok(deleted)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Read items, optionally restricted to ids and filtered
    ///
    /// Items come back in scan order, whatever the order of `ids`.
    pub fn get(&self, collection: &str, request: GetRequest) -> VectorResult<GetResult> {
        self.registry.ensure_exists(collection)?;
        let store = self.db.store();

        let rows = match &request.ids {
            Some(ids) => store.read_rows_by_id(collection, ids)?,
            None => store.scan_rows(collection)?,
        };

        let mut result = GetResult::with_include(request.include);
        for row in rows {
            let item = decode_item(row)?;
            if matches(
                &item,
                request.where_metadata.as_ref(),
                request.where_document.as_ref(),
            ) {
                result.push(item);
            }
        }
        Ok(result)
    }

    /// Number of items in a collection
    pub fn count(&self, collection: &str) -> VectorResult<usize> {
        self.registry.ensure_exists(collection)?;
        Ok(self.db.store().count_rows(collection)?)
    }

    pub(crate) fn embed(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        let function = self
            .embedder
            .as_deref()
            .ok_or(VectorError::MissingEmbeddingFunction)?;
        embed_checked(function, texts)
    }
}

fn validate_ids(ids: &[String]) -> VectorResult<()> {
    if ids.is_empty() {
        return Err(VectorError::InvalidArgument("ids must not be empty".into()));
    }
    ids.iter().try_for_each(|id| validate_vector_key(id))
}

fn check_len<T>(field: &'static str, expected: usize, values: Option<&Vec<T>>) -> VectorResult<()> {
    match values {
        Some(values) if values.len() != expected => Err(VectorError::LengthMismatch {
            field,
            expected,
            got: values.len(),
        }),
        _ => Ok(()),
    }
}

/// Every embedding non-empty, all of one dimension
fn validate_embeddings(ids: &[String], embeddings: &[Vec<f32>]) -> VectorResult<()> {
    let Some(first) = embeddings.first() else {
        return Ok(());
    };
    for (id, embedding) in ids.iter().zip(embeddings) {
        if embedding.is_empty() {
            return Err(VectorError::EmptyEmbedding { id: id.clone() });
        }
        if embedding.len() != first.len() {
            return Err(VectorError::DimensionMismatch {
                expected: first.len(),
                got: embedding.len(),
            });
        }
    }
    Ok(())
}

/// Item metadata must be an object; null means none
fn encode_item_metadata(metadata: Option<JsonValue>) -> VectorResult<Option<Vec<u8>>> {
    match metadata {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value @ JsonValue::Object(_)) => encode_metadata(&value).map(Some),
        Some(other) => Err(VectorError::InvalidArgument(format!(
            "item metadata must be a JSON object, got {}",
            other
        ))),
    }
}
