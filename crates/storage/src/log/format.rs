//! Log header and record framing
//!
//! # Header Layout (32 bytes)
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────────┐
//! │ Magic (4)    │ Version (4)  │ Reserved (8) │ Store UUID (16)  │
//! └──────────────┴──────────────┴──────────────┴──────────────────┘
//! ```
//!
//! # Record Layout
//!
//! ```text
//! ┌─────────────────┬──────────────────┬─────────────────────────┬──────────┐
//! │ Length (4 bytes)│ Format Ver (1)   │ Payload (variable)      │ CRC32 (4)│
//! └─────────────────┴──────────────────┴─────────────────────────┴──────────┘
//! ```
//!
//! The length field covers format version, payload and CRC. The CRC covers
//! format version and payload. All integers are little-endian.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use crc32fast::Hasher;

/// Magic bytes identifying a record log: "SVEC"
pub const LOG_MAGIC: [u8; 4] = *b"SVEC";

/// Current log file format version
pub const LOG_FORMAT_VERSION: u32 = 1;

/// Size of the log header in bytes
pub const LOG_HEADER_SIZE: usize = 32;

/// Current record format version
pub const RECORD_FORMAT_VERSION: u8 = 1;

/// Log file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    /// Magic bytes: "SVEC"
    pub magic: [u8; 4],
    /// File format version
    pub format_version: u32,
    /// Identity of the store that created this file
    pub store_uuid: [u8; 16],
}

impl LogHeader {
    /// Create a header for a fresh log
    pub fn new(store_uuid: [u8; 16]) -> Self {
        LogHeader {
            magic: LOG_MAGIC,
            format_version: LOG_FORMAT_VERSION,
            store_uuid,
        }
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; LOG_HEADER_SIZE] {
        let mut bytes = [0u8; LOG_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        LittleEndian::write_u32(&mut bytes[4..8], self.format_version);
        LittleEndian::write_u64(&mut bytes[8..16], 0);
        bytes[16..32].copy_from_slice(&self.store_uuid);
        bytes
    }

    /// Parse and validate a header
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LogRecordError> {
        if bytes.len() < LOG_HEADER_SIZE {
            return Err(LogRecordError::InsufficientData);
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != LOG_MAGIC {
            return Err(LogRecordError::BadMagic(magic));
        }
        let format_version = LittleEndian::read_u32(&bytes[4..8]);
        if format_version != LOG_FORMAT_VERSION {
            return Err(LogRecordError::UnsupportedFileVersion(format_version));
        }
        let mut store_uuid = [0u8; 16];
        store_uuid.copy_from_slice(&bytes[16..32]);
        Ok(LogHeader {
            magic,
            format_version,
            store_uuid,
        })
    }
}

/// Value of the length prefix for a payload of `payload_len` bytes
fn frame_len(payload_len: usize) -> Result<u32, LogRecordError> {
    payload_len
        .checked_add(5)
        .and_then(|total| u32::try_from(total).ok())
        .ok_or(LogRecordError::RecordTooLarge(payload_len))
}

/// Frame a payload as a log record
///
/// Fails with `RecordTooLarge` if the framed length does not fit the
/// 32-bit length prefix.
pub fn encode_record(payload: &[u8]) -> Result<Vec<u8>, LogRecordError> {
    let total_len = frame_len(payload.len())?;
    let mut record = Vec::with_capacity(4 + total_len as usize);
    // Writes into a Vec cannot fail.
    let _ = record.write_u32::<LittleEndian>(total_len);
    record.push(RECORD_FORMAT_VERSION);
    record.extend_from_slice(payload);
    let crc = compute_crc(&record[4..]);
    let _ = record.write_u32::<LittleEndian>(crc);
    Ok(record)
}

/// Decode one framed record from the front of `bytes`
///
/// Returns (payload, bytes consumed).
pub fn decode_record(bytes: &[u8]) -> Result<(&[u8], usize), LogRecordError> {
    if bytes.len() < 4 {
        return Err(LogRecordError::InsufficientData);
    }
    let length = LittleEndian::read_u32(&bytes[0..4]) as usize;
    if length < 5 {
        return Err(LogRecordError::InvalidFormat);
    }
    if bytes.len() < 4 + length {
        return Err(LogRecordError::InsufficientData);
    }

    let body = &bytes[4..4 + length - 4];
    let stored_crc = LittleEndian::read_u32(&bytes[4 + length - 4..4 + length]);
    let computed_crc = compute_crc(body);
    if computed_crc != stored_crc {
        return Err(LogRecordError::ChecksumMismatch {
            expected: stored_crc,
            computed: computed_crc,
        });
    }

    if body[0] != RECORD_FORMAT_VERSION {
        return Err(LogRecordError::UnsupportedVersion(body[0]));
    }
    Ok((&body[1..], 4 + length))
}

fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Log framing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogRecordError {
    /// Not enough data to parse
    #[error("Insufficient data to parse record")]
    InsufficientData,

    /// Length prefix is impossible
    #[error("Invalid record format")]
    InvalidFormat,

    /// Checksum verification failed
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Stored checksum
        expected: u32,
        /// Computed checksum
        computed: u32,
    },

    /// Unsupported record format version
    #[error("Unsupported record format version: {0}")]
    UnsupportedVersion(u8),

    /// Payload too large for the 32-bit length prefix
    #[error("Record payload of {0} bytes exceeds the frame size limit")]
    RecordTooLarge(usize),

    /// File does not start with the log magic
    #[error("Not a record log: bad magic {0:?}")]
    BadMagic([u8; 4]),

    /// Unsupported file format version
    #[error("Unsupported log file version: {0}")]
    UnsupportedFileVersion(u32),
}
