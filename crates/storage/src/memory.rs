//! In-memory record store
//!
//! # Design
//!
//! - DashMap: one entry per collection, so different collections never contend
//! - RwLock per table: a batch write holds the write lock for the whole batch,
//!   which makes batches atomic for readers
//! - BTreeMap keyed by sequence number: stable scan order
//! - FxHashMap id -> sequence number: O(1) id lookups

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use strata_core::{CollectionMetaRow, ItemRow, RowPatch, StrataError, StrataResult};

use crate::contract::RecordStore;

/// Rows of one collection
#[derive(Debug, Default)]
struct ItemTable {
    /// Rows in insertion-sequence order
    rows: BTreeMap<u64, ItemRow>,
    /// id -> sequence number
    index: FxHashMap<String, u64>,
    /// Next sequence number (never reused)
    next_seq: u64,
}

impl ItemTable {
    fn upsert(&mut self, row: ItemRow) {
        if let Some(old_seq) = self.index.remove(&row.id) {
            self.rows.remove(&old_seq);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(row.id.clone(), seq);
        self.rows.insert(seq, row);
    }

    fn patch(&mut self, patch: &RowPatch) -> bool {
        let Some(seq) = self.index.get(&patch.id) else {
            return false;
        };
        match self.rows.get_mut(seq) {
            Some(row) => {
                patch.apply_to(row);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        match self.index.remove(id) {
            Some(seq) => self.rows.remove(&seq).is_some(),
            None => false,
        }
    }

    fn scan(&self) -> Vec<ItemRow> {
        self.rows.values().cloned().collect()
    }

    fn read(&self, ids: &[String]) -> Vec<ItemRow> {
        let mut seqs: Vec<u64> = ids
            .iter()
            .filter_map(|id| self.index.get(id).copied())
            .collect::<FxHashSet<u64>>()
            .into_iter()
            .collect();
        seqs.sort_unstable();
        seqs.into_iter()
            .filter_map(|seq| self.rows.get(&seq).cloned())
            .collect()
    }
}

/// Thread-safe in-memory implementation of [`RecordStore`]
///
/// Also the replay target of [`crate::LogStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, RwLock<ItemTable>>,
    meta: RwLock<BTreeMap<String, CollectionMetaRow>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of item stores
    pub fn item_store_count(&self) -> usize {
        self.tables.len()
    }

    fn with_table<R>(
        &self,
        collection: &str,
        f: impl FnOnce(&RwLock<ItemTable>) -> R,
    ) -> StrataResult<R> {
        let table = self
            .tables
            .get(collection)
            .ok_or_else(|| StrataError::item_store_not_found(collection))?;
        Ok(f(table.value()))
    }
}

impl RecordStore for MemoryStore {
    fn create_item_store(&self, collection: &str) -> StrataResult<()> {
        match self.tables.entry(collection.to_string()) {
            Entry::Occupied(_) => Err(StrataError::ItemStoreExists {
                collection: collection.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(RwLock::new(ItemTable::default()));
                Ok(())
            }
        }
    }

    fn drop_item_store(&self, collection: &str) -> StrataResult<()> {
        self.tables
            .remove(collection)
            .map(|_| ())
            .ok_or_else(|| StrataError::item_store_not_found(collection))
    }

    fn item_store_exists(&self, collection: &str) -> bool {
        self.tables.contains_key(collection)
    }

    fn upsert_rows(&self, collection: &str, rows: Vec<ItemRow>) -> StrataResult<()> {
        self.with_table(collection, |table| {
            let mut table = table.write();
            for row in rows {
                table.upsert(row);
            }
        })
    }

    fn update_rows(&self, collection: &str, patches: Vec<RowPatch>) -> StrataResult<usize> {
        self.with_table(collection, |table| {
            let mut table = table.write();
            patches.iter().filter(|patch| table.patch(patch)).count()
        })
    }

    fn delete_rows(&self, collection: &str, ids: &[String]) -> StrataResult<usize> {
        self.with_table(collection, |table| {
            let mut table = table.write();
            ids.iter().filter(|id| table.remove(id)).count()
        })
    }

    fn scan_rows(&self, collection: &str) -> StrataResult<Vec<ItemRow>> {
        self.with_table(collection, |table| table.read().scan())
    }

    fn read_rows_by_id(&self, collection: &str, ids: &[String]) -> StrataResult<Vec<ItemRow>> {
        self.with_table(collection, |table| table.read().read(ids))
    }

    fn count_rows(&self, collection: &str) -> StrataResult<usize> {
        self.with_table(collection, |table| table.read().rows.len())
    }

    fn upsert_collection_meta(&self, meta: CollectionMetaRow) -> StrataResult<()> {
        self.meta.write().insert(meta.name.clone(), meta);
        Ok(())
    }

    fn delete_collection_meta(&self, name: &str) -> StrataResult<bool> {
        Ok(self.meta.write().remove(name).is_some())
    }

    fn read_collection_meta(&self, name: &str) -> StrataResult<Option<CollectionMetaRow>> {
        Ok(self.meta.read().get(name).cloned())
    }

    fn list_collection_meta(&self) -> StrataResult<Vec<CollectionMetaRow>> {
        Ok(self.meta.read().values().cloned().collect())
    }
}
