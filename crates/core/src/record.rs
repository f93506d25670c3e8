//! Records exchanged with a record store
//!
//! Embeddings and metadata cross the store boundary as opaque serialized
//! payloads. The engine encodes them on write and decodes them on read;
//! stores never look inside.

use crate::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

/// One stored item row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    /// Item id, unique within its collection (the upsert key)
    pub id: String,

    /// Optional document text
    pub document: Option<String>,

    /// Serialized embedding
    pub embedding: Vec<u8>,

    /// Serialized metadata, if any
    pub metadata: Option<Vec<u8>>,

    /// Insert time; never touched by later updates
    pub created_at: Timestamp,
}

/// Partial update of one row
///
/// Only the fields that are `Some` are written. For `metadata`, the outer
/// `Option` says whether the field is written, the inner one is the new value
/// (`Some(None)` clears the stored metadata).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPatch {
    /// Id of the row to patch
    pub id: String,

    /// Replacement embedding
    pub embedding: Option<Vec<u8>>,

    /// Replacement document
    pub document: Option<String>,

    /// Replacement metadata
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub metadata: Option<Option<Vec<u8>>>,
}

/// A field that is present deserializes to `Some`, even when its value is null
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RowPatch {
    /// Create an empty patch for the given id
    pub fn new(id: impl Into<String>) -> Self {
        RowPatch {
            id: id.into(),
            ..Default::default()
        }
    }

    /// True if the patch writes no field at all
    pub fn is_empty(&self) -> bool {
        self.embedding.is_none() && self.document.is_none() && self.metadata.is_none()
    }

    /// Apply the patch to a row in place
    ///
    /// `id` and `created_at` are never modified.
    pub fn apply_to(&self, row: &mut ItemRow) {
        if let Some(embedding) = &self.embedding {
            row.embedding = embedding.clone();
        }
        if let Some(document) = &self.document {
            row.document = Some(document.clone());
        }
        if let Some(metadata) = &self.metadata {
            row.metadata = metadata.clone();
        }
    }
}

/// Registry row describing one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetaRow {
    /// Collection name
    pub name: String,

    /// Serialized collection metadata
    pub metadata: Vec<u8>,

    /// Creation time
    pub created_at: Timestamp,
}
