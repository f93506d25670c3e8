//! Record store contract
//!
//! The engine holds no state of its own: every mutation and query goes
//! through a [`RecordStore`]. Implementations own the physical rows and the
//! collection registry rows, and provide whatever concurrency guarantees
//! callers get.

use strata_core::{CollectionMetaRow, ItemRow, RowPatch, StrataResult};

/// Durable key/value-like row storage, one item store per collection
///
/// # Contract
///
/// - Batch writes (`upsert_rows`, `update_rows`, `delete_rows`) are atomic:
///   either the whole batch is applied or none of it.
/// - `scan_rows` returns a consistent snapshot in insertion-sequence order.
/// - Operations on a collection without an item store fail with
///   `StrataError::ItemStoreNotFound`.
pub trait RecordStore: Send + Sync {
    /// Create an empty item store
    ///
    /// Fails with `ItemStoreExists` if one is already present.
    fn create_item_store(&self, collection: &str) -> StrataResult<()>;

    /// Drop an item store and all its rows
    fn drop_item_store(&self, collection: &str) -> StrataResult<()>;

    /// Check whether an item store exists
    fn item_store_exists(&self, collection: &str) -> bool;

    /// Insert-or-replace rows keyed by id
    ///
    /// A replaced row takes the position of a newly inserted one.
    fn upsert_rows(&self, collection: &str, rows: Vec<ItemRow>) -> StrataResult<()>;

    /// Patch one row in place
    ///
    /// Returns false if no row with that id exists.
    fn update_row(&self, collection: &str, patch: RowPatch) -> StrataResult<bool> {
        Ok(self.update_rows(collection, vec![patch])? == 1)
    }

    /// Patch a batch of rows in place
    ///
    /// Patches for ids that do not exist are skipped. Returns the number of
    /// rows touched.
    fn update_rows(&self, collection: &str, patches: Vec<RowPatch>) -> StrataResult<usize>;

    /// Delete rows by id
    ///
    /// Returns the number of rows actually removed.
    fn delete_rows(&self, collection: &str, ids: &[String]) -> StrataResult<usize>;

    /// Materialize every row of a collection
    fn scan_rows(&self, collection: &str) -> StrataResult<Vec<ItemRow>>;

    /// Read the rows with the given ids, in scan order
    ///
    /// Missing ids are ignored; duplicates in `ids` yield one row.
    fn read_rows_by_id(&self, collection: &str, ids: &[String]) -> StrataResult<Vec<ItemRow>>;

    /// Number of rows in a collection
    fn count_rows(&self, collection: &str) -> StrataResult<usize>;

    /// Insert or replace a collection registry row
    fn upsert_collection_meta(&self, meta: CollectionMetaRow) -> StrataResult<()>;

    /// Delete a collection registry row
    ///
    /// Returns false if there was no such row.
    fn delete_collection_meta(&self, name: &str) -> StrataResult<bool>;

    /// Read one collection registry row
    fn read_collection_meta(&self, name: &str) -> StrataResult<Option<CollectionMetaRow>>;

    /// Read every collection registry row, ordered by name
    fn list_collection_meta(&self) -> StrataResult<Vec<CollectionMetaRow>>;

    /// Flush buffered writes to stable storage
    fn sync(&self) -> StrataResult<()> {
        Ok(())
    }
}
