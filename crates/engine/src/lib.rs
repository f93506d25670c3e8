//! Vector collection engine
//!
//! This crate sits on top of a [`strata_storage::RecordStore`]:
//! - Database: store handle plus `strata.toml` configuration
//! - VectorStore: collection lifecycle, add/update/delete, get/count
//! - Similarity query: exact cosine ranking over a full scan
//! - Metadata and document filters
//!
//! The engine keeps no state of its own. Every call re-reads through the
//! store, so any number of `VectorStore` handles over one `Database` see the
//! same data.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod primitives;

pub use database::{Database, StrataConfig, VectorSettings, CONFIG_FILE_NAME};
pub use primitives::vector::{
    AddRequest, Collection, DeleteRequest, DocumentFilter, EmbeddingFunction, FilterClause,
    FilterCondition, FilterOp, GetRequest, GetResult, Include, MetadataFilter, QueryRequest,
    QueryResult, UpdateRequest, VectorError, VectorItem, VectorResult, VectorStore,
};
