//! Error types for vector operations

use strata_core::StrataError;
use thiserror::Error;

/// Errors raised by vector collection operations
///
/// Callers that only care about the broad class of failure can use
/// [`is_not_found`](Self::is_not_found),
/// [`is_already_exists`](Self::is_already_exists) and
/// [`is_invalid_argument`](Self::is_invalid_argument).
#[derive(Debug, Error)]
pub enum VectorError {
    /// Collection with given name was not found
    #[error("Collection not found: {name}")]
    CollectionNotFound {
        /// Collection name
        name: String,
    },

    /// Collection with given name already exists
    #[error("Collection already exists: {name}")]
    CollectionAlreadyExists {
        /// Collection name
        name: String,
    },

    /// Malformed request that no more specific variant describes
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A parallel list does not line up with `ids`
    #[error("Length mismatch: {field} has {got} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending list
        field: &'static str,
        /// Number of ids
        expected: usize,
        /// Number of entries supplied
        got: usize,
    },

    /// Neither embeddings nor documents were supplied
    #[error("Either embeddings or documents must be provided")]
    MissingEmbeddingSource,

    /// Documents must be embedded but no embedding function is configured
    #[error("Documents provided without embeddings but no embedding function is set")]
    MissingEmbeddingFunction,

    /// Embedding vector is empty
    #[error("Empty embedding for id '{id}'")]
    EmptyEmbedding {
        /// Id of the item
        id: String,
    },

    /// Embeddings within one request disagree on dimension
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension of the first embedding
        expected: usize,
        /// Dimension of the offending embedding
        got: usize,
    },

    /// Collection name is invalid
    #[error("Invalid collection name: {name} ({reason})")]
    InvalidCollectionName {
        /// The invalid name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Item id is invalid
    #[error("Invalid key: {key} ({reason})")]
    InvalidKey {
        /// The invalid id
        key: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Filter document could not be parsed
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The embedding function failed or returned the wrong shape
    #[error("Embedding function error: {0}")]
    Embedding(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] StrataError),
}

impl VectorError {
    /// Check if this error indicates the collection was not found
    pub fn is_not_found(&self) -> bool {
        match self {
            VectorError::CollectionNotFound { .. } => true,
            VectorError::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates the collection already exists
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            VectorError::CollectionAlreadyExists { .. }
                | VectorError::Storage(StrataError::ItemStoreExists { .. })
        )
    }

    /// Check if this error was caused by caller input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            VectorError::InvalidArgument(_)
                | VectorError::LengthMismatch { .. }
                | VectorError::MissingEmbeddingSource
                | VectorError::MissingEmbeddingFunction
                | VectorError::EmptyEmbedding { .. }
                | VectorError::DimensionMismatch { .. }
                | VectorError::InvalidCollectionName { .. }
                | VectorError::InvalidKey { .. }
                | VectorError::InvalidFilter(_)
        )
    }

    pub(crate) fn not_found(name: &str) -> Self {
        VectorError::CollectionNotFound {
            name: name.to_string(),
        }
    }
}

/// Result type alias for Vector operations
pub type VectorResult<T> = Result<T, VectorError>;
