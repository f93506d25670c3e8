//! Collection registry and name validation
//!
//! Every collection is one item store plus one registry row, created and
//! dropped together. The registry row is the source of truth for existence.

use serde_json::Value as JsonValue;
use std::sync::Arc;
use strata_core::{CollectionMetaRow, Timestamp};
use strata_storage::RecordStore;
use tracing::{info, warn};

use crate::primitives::vector::codec::{decode_metadata, encode_metadata};
use crate::primitives::vector::{Collection, VectorError, VectorResult};

/// Validate a collection name
///
/// # Validation Rules
/// - Cannot be empty
/// - Cannot exceed 256 characters
/// - Cannot contain '/'
/// - Cannot contain null bytes
/// - Cannot start with '_' (reserved for system use)
pub fn validate_collection_name(name: &str) -> Result<(), VectorError> {
    let reason = if name.is_empty() {
        "Collection name cannot be empty"
    } else if name.len() > 256 {
        "Collection name cannot exceed 256 characters"
    } else if name.contains('/') {
        "Collection name cannot contain '/'"
    } else if name.contains('\0') {
        "Collection name cannot contain null bytes"
    } else if name.starts_with('_') {
        "Collection names starting with '_' are reserved"
    } else {
        return Ok(());
    };

    Err(VectorError::InvalidCollectionName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Validate an item id
///
/// # Validation Rules
/// - Can be empty
/// - Cannot exceed 1024 characters
/// - Cannot contain null bytes
pub fn validate_vector_key(key: &str) -> Result<(), VectorError> {
    if key.len() > 1024 {
        return Err(VectorError::InvalidKey {
            key: key.to_string(),
            reason: "Vector key cannot exceed 1024 characters".to_string(),
        });
    }

    if key.contains('\0') {
        return Err(VectorError::InvalidKey {
            key: key.to_string(),
            reason: "Vector key cannot contain null bytes".to_string(),
        });
    }

    Ok(())
}

fn collection_metadata(metadata: Option<JsonValue>) -> VectorResult<JsonValue> {
    match metadata {
        None | Some(JsonValue::Null) => Ok(JsonValue::Object(Default::default())),
        Some(value @ JsonValue::Object(_)) => Ok(value),
        Some(other) => Err(VectorError::InvalidArgument(format!(
            "collection metadata must be a JSON object, got {}",
            other
        ))),
    }
}

/// Maps collection names to registry rows and item stores
#[derive(Clone)]
pub struct CollectionRegistry {
    store: Arc<dyn RecordStore>,
}

impl CollectionRegistry {
    /// Create a registry over a record store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CollectionRegistry { store }
    }

    /// Check whether a collection is registered
    pub fn exists(&self, name: &str) -> VectorResult<bool> {
        validate_collection_name(name)?;
        Ok(self.store.read_collection_meta(name)?.is_some())
    }

    /// Fail with `CollectionNotFound` unless the collection is registered
    pub fn ensure_exists(&self, name: &str) -> VectorResult<()> {
        if self.exists(name)? {
            Ok(())
        } else {
            Err(VectorError::not_found(name))
        }
    }

    /// Create a collection
    ///
    /// # Errors
    /// - `CollectionAlreadyExists` if the name is taken
    /// - `InvalidArgument` if `metadata` is not a JSON object
    pub fn create(&self, name: &str, metadata: Option<JsonValue>) -> VectorResult<Collection> {
        validate_collection_name(name)?;
        let metadata = collection_metadata(metadata)?;

        if self.store.read_collection_meta(name)?.is_some() {
            return Err(VectorError::CollectionAlreadyExists {
                name: name.to_string(),
            });
        }

        // An item store without a registry row is left over from an
        // interrupted create or delete.
        if self.store.item_store_exists(name) {
            warn!(target: "strata::vector", collection = name, "Dropping orphaned item store");
            self.store.drop_item_store(name)?;
        }

        self.store.create_item_store(name)?;

        let row = CollectionMetaRow {
            name: name.to_string(),
            metadata: encode_metadata(&metadata)?,
            created_at: Timestamp::now(),
        };
        let created_at = row.created_at;
        if let Err(e) = self.store.upsert_collection_meta(row) {
            if let Err(drop_err) = self.store.drop_item_store(name) {
                warn!(
                    target: "strata::vector",
                    collection = name,
                    error = %drop_err,
                    "Failed to drop item store after registry write failed"
                );
            }
            return Err(e.into());
        }

        info!(target: "strata::vector", collection = name, "Collection created");

        Ok(Collection {
            name: name.to_string(),
            metadata,
            created_at,
        })
    }

    /// Get a collection by name
    pub fn get(&self, name: &str) -> VectorResult<Option<Collection>> {
        validate_collection_name(name)?;
        self.store
            .read_collection_meta(name)?
            .map(decode_collection)
            .transpose()
    }

    /// Get a collection, creating it if it does not exist
    ///
    /// `metadata` is only used on the creation path.
    pub fn get_or_create(&self, name: &str, metadata: Option<JsonValue>) -> VectorResult<Collection> {
        match self.get(name)? {
            Some(collection) => Ok(collection),
            None => self.create(name, metadata),
        }
    }

    /// Delete a collection and all its items
    pub fn delete(&self, name: &str) -> VectorResult<()> {
        self.ensure_exists(name)?;

        match self.store.drop_item_store(name) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
        self.store.delete_collection_meta(name)?;

        info!(target: "strata::vector", collection = name, "Collection deleted");
        Ok(())
    }

    /// List all collections, ordered by name
    pub fn list(&self) -> VectorResult<Vec<Collection>> {
        self.store
            .list_collection_meta()?
            .into_iter()
            .map(decode_collection)
            .collect()
    }
}

fn decode_collection(row: CollectionMetaRow) -> VectorResult<Collection> {
    Ok(Collection {
        metadata: decode_metadata(&row.metadata)?,
        name: row.name,
        created_at: row.created_at,
    })
}
