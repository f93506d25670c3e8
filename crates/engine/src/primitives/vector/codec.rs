//! Row payload encoding
//!
//! Embeddings are stored as little-endian `f32` bytes, metadata as JSON text.

use byteorder::{ByteOrder, LittleEndian};
use serde_json::Value as JsonValue;
use strata_core::{ItemRow, StrataError};

use crate::primitives::vector::{VectorItem, VectorResult};

/// Encode an embedding as little-endian `f32` bytes
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = vec![0u8; embedding.len() * 4];
    LittleEndian::write_f32_into(embedding, &mut bytes);
    bytes
}

/// Decode little-endian `f32` bytes
pub fn decode_embedding(bytes: &[u8]) -> VectorResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(StrataError::corruption(format!(
            "embedding payload of {} bytes is not a whole number of f32 values",
            bytes.len()
        ))
        .into());
    }
    let mut embedding = vec![0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(bytes, &mut embedding);
    Ok(embedding)
}

/// Encode a metadata value as JSON
pub fn encode_metadata(metadata: &JsonValue) -> VectorResult<Vec<u8>> {
    serde_json::to_vec(metadata)
        .map_err(|e| StrataError::serialization(format!("encode metadata: {}", e)).into())
}

/// Decode JSON metadata
pub fn decode_metadata(bytes: &[u8]) -> VectorResult<JsonValue> {
    serde_json::from_slice(bytes)
        .map_err(|e| StrataError::corruption(format!("decode metadata: {}", e)).into())
}

/// Decode a stored row into an item
pub fn decode_item(row: ItemRow) -> VectorResult<VectorItem> {
    let embedding = decode_embedding(&row.embedding)?;
    let metadata = row.metadata.as_deref().map(decode_metadata).transpose()?;
    Ok(VectorItem {
        id: row.id,
        embedding,
        document: row.document,
        metadata,
        created_at: row.created_at,
    })
}
