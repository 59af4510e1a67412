//! # Codec Boundary
//!
//! The entry points used by the layers above the codec: the tuple
//! marshalling layer encodes ordered column values into storage bytes,
//! query and transaction processing decode them back, and the storage
//! and affinity layers slice out key bytes for comparison, hashing and
//! partition routing without paying for a value decode.
//!
//! The byte layout produced here is exactly what is persisted in the
//! key-value storage engine and what travels inside replication log
//! entries; this module performs no I/O itself.

use tracing::trace;

use crate::error::{Result, RowError};
use crate::row::layout::{chunk_len_at, CHECKSUM_SIZE, CHUNK_LEN_SIZE, MIN_ROW_SIZE, ROW_HEADER_SIZE};
use crate::row::{Row, RowAssembler};
use crate::schema::SchemaDescriptor;
use crate::types::Value;

/// Encodes ordered column values into row bytes.
///
/// `values` follow logical column order: all key columns, then all value
/// columns. Passing exactly the key columns produces a key-only row;
/// any other length is a [`RowError::SchemaViolation`].
pub fn encode(schema: &SchemaDescriptor, values: &[Value<'_>]) -> Result<Vec<u8>> {
    let key_count = schema.key_column_count();
    let total = schema.column_count();
    let key_only = if values.len() == total {
        false
    } else if values.len() == key_count {
        true
    } else {
        return Err(RowError::SchemaViolation(format!(
            "expected {total} column values (or {key_count} for a key-only row), got {}",
            values.len()
        )));
    };

    let mut assembler = RowAssembler::new(schema);
    for value in values {
        match value {
            Value::Null => assembler.append_null()?,
            Value::Int8(v) => assembler.append_int8(*v)?,
            Value::Int16(v) => assembler.append_int16(*v)?,
            Value::Int32(v) => assembler.append_int32(*v)?,
            Value::Int64(v) => assembler.append_int64(*v)?,
            Value::Text(s) => assembler.append_text(s)?,
            Value::Blob(b) => assembler.append_blob(b)?,
        }
    }

    let bytes = if key_only {
        assembler.build_key_only()?
    } else {
        assembler.build()?
    };
    trace!(
        version = schema.version(),
        bytes = bytes.len(),
        key_only,
        "row encoded"
    );
    Ok(bytes)
}

/// Decodes row bytes into a validated [`Row`] reader.
pub fn decode<'a>(schema: &'a SchemaDescriptor, bytes: &'a [u8]) -> Result<Row<'a>> {
    let row = Row::new(schema, bytes)?;
    trace!(
        version = row.version(),
        bytes = bytes.len(),
        has_value = row.has_value(),
        "row decoded"
    );
    Ok(row)
}

/// Returns the key chunk's byte range (length header included) without
/// touching the value chunk.
///
/// Identical logical keys encode to identical key chunk bytes, so the
/// result is directly usable for key comparison, hashing and partition
/// routing. Only the framing needed to locate the chunk is validated.
pub fn extract_key_bytes(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < MIN_ROW_SIZE {
        return Err(RowError::CorruptRow(format!(
            "row of {} bytes is shorter than the {MIN_ROW_SIZE}-byte minimum",
            bytes.len()
        )));
    }
    let key_len = chunk_len_at(bytes, ROW_HEADER_SIZE)
        .ok_or_else(|| RowError::CorruptRow("truncated key chunk length".to_string()))?;
    let end = (ROW_HEADER_SIZE + CHUNK_LEN_SIZE)
        .checked_add(key_len)
        .filter(|end| end + CHUNK_LEN_SIZE + CHECKSUM_SIZE <= bytes.len())
        .ok_or_else(|| RowError::CorruptRow("key chunk extends past row end".to_string()))?;
    Ok(&bytes[ROW_HEADER_SIZE..end])
}

/// Peeks the schema version prefix of an encoded row, so the right
/// descriptor can be selected before decoding.
pub fn schema_version(bytes: &[u8]) -> Result<u16> {
    if bytes.len() < MIN_ROW_SIZE {
        return Err(RowError::CorruptRow(format!(
            "row of {} bytes is shorter than the {MIN_ROW_SIZE}-byte minimum",
            bytes.len()
        )));
    }
    let version = u16::from_le_bytes([bytes[0], bytes[1]]);
    if version == 0 {
        return Err(RowError::CorruptRow(
            "zero schema version in row prefix".to_string(),
        ));
    }
    Ok(version)
}
