//! Logical log entries
//!
//! One entry per mutating [`RecordStore`](crate::RecordStore) call. Entries are
//! MessagePack-encoded into the payload of a log record.

use serde::{Deserialize, Serialize};
use strata_core::{CollectionMetaRow, ItemRow, RowPatch, StrataError, StrataResult};

use crate::contract::RecordStore;
use crate::memory::MemoryStore;

/// A mutation recorded in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogEntry {
    /// Item store created
    CreateItemStore {
        /// Collection name
        collection: String,
    },
    /// Item store dropped
    DropItemStore {
        /// Collection name
        collection: String,
    },
    /// Batch upsert
    UpsertRows {
        /// Collection name
        collection: String,
        /// Rows written
        rows: Vec<ItemRow>,
    },
    /// Batch patch
    UpdateRows {
        /// Collection name
        collection: String,
        /// Patches applied
        patches: Vec<RowPatch>,
    },
    /// Batch delete
    DeleteRows {
        /// Collection name
        collection: String,
        /// Ids deleted
        ids: Vec<String>,
    },
    /// Registry row written
    UpsertCollectionMeta {
        /// The row
        meta: CollectionMetaRow,
    },
    /// Registry row deleted
    DeleteCollectionMeta {
        /// Collection name
        name: String,
    },
}

impl LogEntry {
    /// Encode to MessagePack
    pub fn to_bytes(&self) -> StrataResult<Vec<u8>> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| StrataError::serialization(format!("encode log entry: {}", e)))
    }

    /// Decode from MessagePack
    pub fn from_bytes(bytes: &[u8]) -> StrataResult<Self> {
        rmp_serde::from_slice(bytes)
            .map_err(|e| StrataError::corruption(format!("decode log entry: {}", e)))
    }

    /// Apply this entry to a memory store
    ///
    /// Returns the number of rows the entry touched (zero for entries that
    /// do not address rows).
    pub fn apply(self, store: &MemoryStore) -> StrataResult<usize> {
        match self {
            LogEntry::CreateItemStore { collection } => {
                store.create_item_store(&collection).map(|_| 0)
            }
            LogEntry::DropItemStore { collection } => store.drop_item_store(&collection).map(|_| 0),
            LogEntry::UpsertRows { collection, rows } => {
                let n = rows.len();
                store.upsert_rows(&collection, rows).map(|_| n)
            }
            LogEntry::UpdateRows {
                collection,
                patches,
            } => store.update_rows(&collection, patches),
            LogEntry::DeleteRows { collection, ids } => store.delete_rows(&collection, &ids),
            LogEntry::UpsertCollectionMeta { meta } => {
                store.upsert_collection_meta(meta).map(|_| 0)
            }
            LogEntry::DeleteCollectionMeta { name } => {
                store.delete_collection_meta(&name).map(usize::from)
            }
        }
    }
}
