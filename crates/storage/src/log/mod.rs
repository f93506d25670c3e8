//! Append-only record log
//!
//! A [`LogStore`] keeps its live state in a [`crate::MemoryStore`] and appends
//! every mutation to `records.log` before applying it. Opening a directory
//! replays the log; a torn or corrupt tail is truncated away.
//!
//! # File Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Log Header (32 bytes)              │
//! ├────────────────────────────────────┤
//! │ Record 1                           │
//! ├────────────────────────────────────┤
//! │ ...                                │
//! └────────────────────────────────────┘
//! ```

pub mod entry;
pub mod format;
pub mod mode;
pub mod store;

pub use entry::LogEntry;
pub use format::{LogHeader, LogRecordError, LOG_FORMAT_VERSION, LOG_HEADER_SIZE, LOG_MAGIC};
pub use mode::DurabilityMode;
pub use store::{LogStore, LOCK_FILE_NAME, LOG_FILE_NAME};
