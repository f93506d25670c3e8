//! StrataVec - Embedded vector collection database
//!
//! StrataVec stores named collections of items (id, embedding, optional
//! document, optional JSON metadata) and answers exact cosine-similarity
//! queries with metadata and document filters.
//!
//! # Quick Start
//!
//! ```ignore
//! use stratavec::{AddRequest, Database, QueryRequest, VectorStore};
//!
//! let db = Database::open("./data")?;
//! let vectors = VectorStore::new(db);
//!
//! vectors.create_collection("docs", None)?;
//! vectors.add(
//!     "docs",
//!     AddRequest::new(["1"]).embeddings(vec![vec![0.1, 0.2, 0.3]]).documents(["hello"]),
//! )?;
//!
//! let hits = vectors.query("docs", QueryRequest::embeddings(vec![vec![0.1, 0.2, 0.3]]).top_n(1))?;
//! assert_eq!(hits.ids, vec![vec!["1".to_string()]]);
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: shared row types, timestamps, storage errors
//! - `strata-storage`: record store contract, in-memory store, logged store
//! - `strata-engine`: Database handle and the VectorStore facade

pub use strata_core::{StrataError, StrataResult, Timestamp};
pub use strata_engine::*;
pub use strata_storage::{DurabilityMode, LogStore, MemoryStore, RecordStore, LOG_FILE_NAME};
