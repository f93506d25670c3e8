//! Error types for the storage layer
//!
//! Every record store operation reports failures through [`StrataError`].
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for storage operations
pub type StrataResult<T> = std::result::Result<T, StrataError>;

/// Errors raised by record stores and database plumbing
#[derive(Debug, Error)]
pub enum StrataError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// What failed to encode or decode
        message: String,
    },

    /// Data corruption detected (bad checksum, undecodable payload)
    #[error("Data corruption: {message}")]
    Corruption {
        /// Description of the corruption
        message: String,
    },

    /// The item store for a collection does not exist
    #[error("Item store not found: {collection}")]
    ItemStoreNotFound {
        /// Collection name
        collection: String,
    },

    /// An item store for this collection already exists
    #[error("Item store already exists: {collection}")]
    ItemStoreExists {
        /// Collection name
        collection: String,
    },

    /// Another process holds the store directory lock
    #[error("Store at '{path}' is already in use by another process")]
    StoreLocked {
        /// Store directory
        path: String,
    },

    /// Invalid input (bad configuration value, unusable path)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem
        message: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the problem
        message: String,
    },
}

impl StrataError {
    /// Create an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        StrataError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an `Internal` error
    pub fn internal(message: impl Into<String>) -> Self {
        StrataError::Internal {
            message: message.into(),
        }
    }

    /// Create a `Corruption` error
    pub fn corruption(message: impl Into<String>) -> Self {
        StrataError::Corruption {
            message: message.into(),
        }
    }

    /// Create a `Serialization` error
    pub fn serialization(message: impl Into<String>) -> Self {
        StrataError::Serialization {
            message: message.into(),
        }
    }

    /// Create an `ItemStoreNotFound` error
    pub fn item_store_not_found(collection: impl Into<String>) -> Self {
        StrataError::ItemStoreNotFound {
            collection: collection.into(),
        }
    }

    /// Check if this error reports a missing item store
    pub fn is_not_found(&self) -> bool {
        matches!(self, StrataError::ItemStoreNotFound { .. })
    }
}
