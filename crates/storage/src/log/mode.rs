//! Durability mode configuration
//!
//! Controls when the record log is fsynced to disk.

use std::time::Duration;

/// Durability mode for the record log
///
/// | Mode | fsync | Data Loss Window |
/// |------|-------|-----------------|
/// | Always | Every record | Zero |
/// | Standard | Every N records or T milliseconds | Up to interval/batch |
///
/// Every record is written to the OS before the call returns in both modes;
/// the modes only differ in when the data is forced to stable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityMode {
    /// fsync after every record
    Always,

    /// fsync every `batch_size` records or once `interval_ms` has elapsed
    /// since the last fsync, whichever comes first
    Standard {
        /// Maximum time between fsyncs in milliseconds
        interval_ms: u64,
        /// Maximum records between fsyncs
        batch_size: usize,
    },
}

impl DurabilityMode {
    /// Standard mode with 100ms interval or 1000 records
    pub fn standard_default() -> Self {
        DurabilityMode::Standard {
            interval_ms: 100,
            batch_size: 1000,
        }
    }

    /// Check if this mode fsyncs on every record
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Always)
    }

    /// Decide whether a sync is due after `unsynced` records written over `elapsed`
    pub fn sync_due(&self, unsynced: usize, elapsed: Duration) -> bool {
        match *self {
            DurabilityMode::Always => unsynced > 0,
            DurabilityMode::Standard {
                interval_ms,
                batch_size,
            } => {
                unsynced > 0
                    && (unsynced >= batch_size || elapsed >= Duration::from_millis(interval_ms))
            }
        }
    }

    /// Human-readable description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::Always => "Always sync (safest, slowest)",
            DurabilityMode::Standard { .. } => "Standard (balanced speed/safety)",
        }
    }
}

impl Default for DurabilityMode {
    fn default() -> Self {
        Self::standard_default()
    }
}
