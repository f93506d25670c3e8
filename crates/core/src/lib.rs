//! Core types for StrataVec
//!
//! This crate defines the foundational types shared by the storage layer and
//! the engine:
//! - StrataError: storage-layer error type
//! - Timestamp: microsecond-precision wall clock time
//! - ItemRow / RowPatch / CollectionMetaRow: records crossing the record store boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod record;
pub mod timestamp;

pub use error::{StrataError, StrataResult};
pub use record::{CollectionMetaRow, ItemRow, RowPatch};
pub use timestamp::Timestamp;
