//! Vector primitive types and operations
//!
//! This module provides named vector collections with exact similarity search.
//! It includes:
//!
//! - **VectorStore**: Main facade for collections, item mutations and queries
//! - **CollectionRegistry**: Collection metadata rows and item stores
//! - **MetadataFilter / DocumentFilter**: `where` and `where_document` filters
//! - **EmbeddingFunction**: Injected text-to-vector function
//! - **VectorError**: Error types for vector operations
//!
//! ## Storage
//!
//! Embeddings are stored as little-endian `f32` bytes and metadata as JSON
//! text, one row per item, through the Database's record store. With a
//! persistent Database every mutation is in the record log before it returns.

pub mod codec;
pub mod collection;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod query;
pub mod store;
pub mod types;

pub use collection::{validate_collection_name, validate_vector_key, CollectionRegistry};
pub use distance::{compare_distances, cosine_distance, cosine_similarity, euclidean_distance};
pub use embedding::EmbeddingFunction;
pub use error::{VectorError, VectorResult};
pub use filter::{
    matches, DocumentCondition, DocumentFilter, FilterClause, FilterCondition, FilterOp,
    MetadataFilter,
};
pub use store::VectorStore;
pub use types::{
    AddRequest, Collection, DeleteRequest, GetRequest, GetResult, Include, QueryRequest,
    QueryResult, UpdateRequest, VectorItem,
};
