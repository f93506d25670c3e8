//! Storage layer for StrataVec
//!
//! This crate defines the record store contract the engine reads and writes
//! through, plus two implementations:
//! - MemoryStore: DashMap of per-collection tables behind parking_lot locks
//! - LogStore: MemoryStore fronted by an append-only, checksummed record log
//!
//! # Scan Order
//!
//! Rows inside a collection are ordered by an insertion sequence number.
//! An upsert allocates a fresh sequence number (the row moves to the end),
//! an in-place patch keeps it. Sequence numbers are never reused.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod log;
pub mod memory;

pub use contract::RecordStore;
pub use log::{DurabilityMode, LogEntry, LogStore, LOG_FILE_NAME};
pub use memory::MemoryStore;
