//! # Row - Zero-Copy Row Access
//!
//! Read-only view over an encoded row's bytes plus the
//! [`SchemaDescriptor`] that produced them. All getters return values
//! decoded directly from the buffer; text and blob accessors borrow the
//! underlying bytes without copying.
//!
//! ## Usage
//!
//! ```ignore
//! let row = Row::new(&schema, &bytes)?;
//! let id = row.get_int64(0)?;          // Some(7)
//! let name = row.get_text(2)?;         // Some("hello"), borrowed
//! let missing = row.get_int32(1)?;     // None when the null bit is set
//! ```
//!
//! ## Eager Validation
//!
//! `Row::new` verifies the checksum, the version prefix, the flag bits
//! and every chunk invariant before any accessor can run. A corrupt
//! buffer fails construction with `CorruptRow`; it is never partially
//! readable.
//!
//! ## Thread Safety
//!
//! `Row` borrows immutably from the byte slice and never mutates it.
//! Multiple rows and chunk views may read the same buffer concurrently.

use std::borrow::Cow;

use zerocopy::FromBytes;

use crate::error::{Result, RowError};
use crate::row::layout::{
    chunk_len_at, validate_checksum, RowHeader, WireU32, CHECKSUM_SIZE, CHUNK_LEN_SIZE,
    FLAG_KEY_ONLY, MIN_ROW_SIZE, ROW_HEADER_SIZE, VARLEN_ENTRY_SIZE,
};
use crate::schema::{ChunkSchema, Column, SchemaDescriptor};
use crate::types::{NativeType, TypeKind, Value};

/// Resolved byte spans of one chunk inside a row buffer.
#[derive(Debug, Clone, Copy)]
struct ChunkBounds {
    start: usize,
    len: usize,
    table_off: usize,
    table_entries: usize,
    fixed_off: usize,
    var_off: usize,
}

/// Read-only view scoped to one chunk (key or value columns), addressed
/// by chunk-local column index. A slice over the row buffer, not a copy.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView<'a> {
    data: &'a [u8],
    columns: &'a [Column],
    chunk: &'a ChunkSchema,
    bounds: ChunkBounds,
}

impl<'a> ChunkView<'a> {
    /// Validates one chunk's structure against the schema and resolves
    /// its internal byte spans.
    fn resolve(
        data: &'a [u8],
        body_start: usize,
        body_len: usize,
        chunk: &'a ChunkSchema,
        columns: &'a [Column],
    ) -> Result<Self> {
        let null_map_size = chunk.null_map_size();
        if body_len < null_map_size {
            return Err(RowError::CorruptRow(format!(
                "chunk of {body_len} bytes cannot hold its {null_map_size}-byte null-map"
            )));
        }
        let null_map = &data[body_start..body_start + null_map_size];

        let pad_bits = null_map_size * 8 - chunk.nullable_count();
        if pad_bits > 0 && null_map[null_map_size - 1] >> (8 - pad_bits) != 0 {
            return Err(RowError::CorruptRow(
                "null-map padding bits set".to_string(),
            ));
        }

        let mut fixed_len = 0usize;
        let mut table_entries = 0usize;
        for (pos, col) in columns.iter().enumerate() {
            let is_null = null_bit(null_map, chunk.nullable_rank(pos));
            match col.native_type().kind() {
                TypeKind::Fixed { width } => {
                    if !is_null {
                        fixed_len += width;
                    }
                }
                TypeKind::Variable => {
                    if !is_null {
                        table_entries += 1;
                    }
                }
            }
        }

        let table_len = table_entries * VARLEN_ENTRY_SIZE;
        let Some(var_len) = body_len.checked_sub(null_map_size + table_len + fixed_len) else {
            return Err(RowError::CorruptRow(
                "chunk length disagrees with its null-map".to_string(),
            ));
        };

        let table_off = body_start + null_map_size;
        let fixed_off = table_off + table_len;
        let var_off = fixed_off + fixed_len;

        let table = offset_table(data, table_off, table_entries)?;
        let mut prev = 0usize;
        for entry in table {
            let end = entry.get() as usize;
            if end < prev {
                return Err(RowError::CorruptRow(
                    "varlen offset table is not monotonic".to_string(),
                ));
            }
            prev = end;
        }
        if prev != var_len {
            return Err(RowError::CorruptRow(
                "varlen offset table disagrees with the variable region size".to_string(),
            ));
        }

        Ok(Self {
            data,
            columns,
            chunk,
            bounds: ChunkBounds {
                start: body_start,
                len: body_len,
                table_off,
                table_entries,
                fixed_off,
                var_off,
            },
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Raw byte range of this chunk, length header included. Stable input
    /// for key comparison and hashing.
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[self.bounds.start - CHUNK_LEN_SIZE..self.bounds.start + self.bounds.len]
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        if index >= self.columns.len() {
            return Err(RowError::IndexOutOfRange {
                index,
                count: self.columns.len(),
            });
        }
        Ok(self.null_at(index))
    }

    pub fn get_int8(&self, index: usize) -> Result<Option<i8>> {
        self.int8_at(index, index)
    }

    pub fn get_int16(&self, index: usize) -> Result<Option<i16>> {
        self.int16_at(index, index)
    }

    pub fn get_int32(&self, index: usize) -> Result<Option<i32>> {
        self.int32_at(index, index)
    }

    pub fn get_int64(&self, index: usize) -> Result<Option<i64>> {
        self.int64_at(index, index)
    }

    pub fn get_text(&self, index: usize) -> Result<Option<&'a str>> {
        self.text_at(index, index)
    }

    pub fn get_blob(&self, index: usize) -> Result<Option<&'a [u8]>> {
        self.blob_at(index, index)
    }

    fn null_at(&self, pos: usize) -> bool {
        let null_map = &self.data[self.bounds.start..self.bounds.start + self.chunk.null_map_size()];
        null_bit(null_map, self.chunk.nullable_rank(pos))
    }

    fn int8_at(&self, pos: usize, index: usize) -> Result<Option<i8>> {
        Ok(self
            .typed_slice(pos, index, NativeType::Int8)?
            .map(|b| b[0] as i8))
    }

    fn int16_at(&self, pos: usize, index: usize) -> Result<Option<i16>> {
        match self.typed_slice(pos, index, NativeType::Int16)? {
            Some(b) => Ok(Some(i16::from_le_bytes(fixed_array(b, index)?))),
            None => Ok(None),
        }
    }

    fn int32_at(&self, pos: usize, index: usize) -> Result<Option<i32>> {
        match self.typed_slice(pos, index, NativeType::Int32)? {
            Some(b) => Ok(Some(i32::from_le_bytes(fixed_array(b, index)?))),
            None => Ok(None),
        }
    }

    fn int64_at(&self, pos: usize, index: usize) -> Result<Option<i64>> {
        match self.typed_slice(pos, index, NativeType::Int64)? {
            Some(b) => Ok(Some(i64::from_le_bytes(fixed_array(b, index)?))),
            None => Ok(None),
        }
    }

    fn text_at(&self, pos: usize, index: usize) -> Result<Option<&'a str>> {
        match self.typed_slice(pos, index, NativeType::Text)? {
            Some(bytes) => std::str::from_utf8(bytes).map(Some).map_err(|e| {
                RowError::CorruptRow(format!("invalid UTF-8 in text column {index}: {e}"))
            }),
            None => Ok(None),
        }
    }

    fn blob_at(&self, pos: usize, index: usize) -> Result<Option<&'a [u8]>> {
        self.typed_slice(pos, index, NativeType::Blob)
    }

    fn value_at(&self, pos: usize, index: usize) -> Result<Value<'a>> {
        let value = match self.columns[pos].native_type() {
            NativeType::Int8 => self.int8_at(pos, index)?.map(Value::Int8),
            NativeType::Int16 => self.int16_at(pos, index)?.map(Value::Int16),
            NativeType::Int32 => self.int32_at(pos, index)?.map(Value::Int32),
            NativeType::Int64 => self.int64_at(pos, index)?.map(Value::Int64),
            NativeType::Text => self
                .text_at(pos, index)?
                .map(|s| Value::Text(Cow::Borrowed(s))),
            NativeType::Blob => self
                .blob_at(pos, index)?
                .map(|b| Value::Blob(Cow::Borrowed(b))),
        };
        Ok(value.unwrap_or(Value::Null))
    }

    /// Resolves the exact byte range of one column value, or `None` when
    /// its null bit is set.
    fn typed_slice(
        &self,
        pos: usize,
        index: usize,
        requested: NativeType,
    ) -> Result<Option<&'a [u8]>> {
        let Some(col) = self.columns.get(pos) else {
            return Err(RowError::IndexOutOfRange {
                index,
                count: self.columns.len(),
            });
        };
        if col.native_type() != requested {
            return Err(RowError::TypeMismatch {
                index,
                declared: col.native_type().name(),
                requested: requested.name(),
            });
        }
        if self.null_at(pos) {
            return Ok(None);
        }

        match col.native_type().kind() {
            TypeKind::Fixed { width } => {
                let mut off = self.bounds.fixed_off;
                for (p, c) in self.columns[..pos].iter().enumerate() {
                    if let TypeKind::Fixed { width: w } = c.native_type().kind() {
                        if !self.null_at(p) {
                            off += w;
                        }
                    }
                }
                Ok(Some(&self.data[off..off + width]))
            }
            TypeKind::Variable => {
                let mut entry = 0usize;
                for (p, c) in self.columns[..pos].iter().enumerate() {
                    if c.native_type().is_variable() && !self.null_at(p) {
                        entry += 1;
                    }
                }
                let table = offset_table(self.data, self.bounds.table_off, self.bounds.table_entries)?;
                let end = table[entry].get() as usize;
                let start = if entry == 0 {
                    0
                } else {
                    table[entry - 1].get() as usize
                };
                Ok(Some(
                    &self.data[self.bounds.var_off + start..self.bounds.var_off + end],
                ))
            }
        }
    }
}

/// Read-only decoder over an encoded row's bytes plus its schema.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    schema: &'a SchemaDescriptor,
    data: &'a [u8],
    key_only: bool,
    key: ChunkView<'a>,
    value: Option<ChunkView<'a>>,
}

impl<'a> Row<'a> {
    /// Wraps `(schema, bytes)` after eagerly validating the buffer:
    /// checksum, version, flags and the full chunk structure. Fails with
    /// [`RowError::CorruptRow`] before any field can be observed.
    pub fn new(schema: &'a SchemaDescriptor, data: &'a [u8]) -> Result<Self> {
        if data.len() < MIN_ROW_SIZE {
            return Err(RowError::CorruptRow(format!(
                "row of {} bytes is shorter than the {MIN_ROW_SIZE}-byte minimum",
                data.len()
            )));
        }

        let payload_len = data.len() - CHECKSUM_SIZE;
        let stored = u32::from_le_bytes(
            data[payload_len..]
                .try_into()
                .map_err(|_| RowError::CorruptRow("truncated checksum trailer".to_string()))?,
        );
        if !validate_checksum(&data[..payload_len], stored) {
            return Err(RowError::CorruptRow("checksum mismatch".to_string()));
        }

        let (header, _) = RowHeader::ref_from_prefix(data)
            .map_err(|_| RowError::CorruptRow("missing row header".to_string()))?;
        let version = header.version.get();
        if version != schema.version() {
            return Err(RowError::CorruptRow(format!(
                "row version {version} does not match schema version {}",
                schema.version()
            )));
        }
        if header.flags & !FLAG_KEY_ONLY != 0 {
            return Err(RowError::CorruptRow(format!(
                "reserved flag bits set: {:#04x}",
                header.flags
            )));
        }
        let key_only = header.is_key_only();

        let key_body_start = ROW_HEADER_SIZE + CHUNK_LEN_SIZE;
        let key_len = chunk_len_at(data, ROW_HEADER_SIZE)
            .ok_or_else(|| RowError::CorruptRow("truncated key chunk length".to_string()))?;
        let key_body_end = key_body_start
            .checked_add(key_len)
            .filter(|end| end + CHUNK_LEN_SIZE <= payload_len)
            .ok_or_else(|| RowError::CorruptRow("key chunk extends past row end".to_string()))?;
        let key = ChunkView::resolve(
            data,
            key_body_start,
            key_len,
            schema.key_chunk(),
            schema.key_columns(),
        )?;

        let value_len = chunk_len_at(data, key_body_end)
            .ok_or_else(|| RowError::CorruptRow("truncated value chunk length".to_string()))?;
        let value_body_start = key_body_end + CHUNK_LEN_SIZE;
        if value_body_start.checked_add(value_len) != Some(payload_len) {
            return Err(RowError::CorruptRow(
                "value chunk length disagrees with row length".to_string(),
            ));
        }
        let value = if key_only {
            if value_len != 0 {
                return Err(RowError::CorruptRow(
                    "key-only row with a non-empty value chunk".to_string(),
                ));
            }
            None
        } else {
            Some(ChunkView::resolve(
                data,
                value_body_start,
                value_len,
                schema.value_chunk(),
                schema.value_columns(),
            )?)
        };

        Ok(Self {
            schema,
            data,
            key_only,
            key,
            value,
        })
    }

    pub fn schema(&self) -> &'a SchemaDescriptor {
        self.schema
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Schema version stamped into the row bytes.
    pub fn version(&self) -> u16 {
        u16::from_le_bytes([self.data[0], self.data[1]])
    }

    /// False for key-only rows (lookup/delete templates).
    pub fn has_value(&self) -> bool {
        !self.key_only
    }

    /// Sub-view over the key chunk's byte range.
    pub fn key_chunk(&self) -> ChunkView<'a> {
        self.key
    }

    /// Sub-view over the value chunk's byte range, absent for key-only
    /// rows.
    pub fn value_chunk(&self) -> Option<ChunkView<'a>> {
        self.value
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        let (chunk, pos) = self.locate(index)?;
        Ok(chunk.null_at(pos))
    }

    pub fn get_int8(&self, index: usize) -> Result<Option<i8>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.int8_at(pos, index)
    }

    pub fn get_int16(&self, index: usize) -> Result<Option<i16>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.int16_at(pos, index)
    }

    pub fn get_int32(&self, index: usize) -> Result<Option<i32>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.int32_at(pos, index)
    }

    pub fn get_int64(&self, index: usize) -> Result<Option<i64>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.int64_at(pos, index)
    }

    pub fn get_text(&self, index: usize) -> Result<Option<&'a str>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.text_at(pos, index)
    }

    pub fn get_blob(&self, index: usize) -> Result<Option<&'a [u8]>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.blob_at(pos, index)
    }

    /// Generic accessor: the column's declared type picks the decoder.
    pub fn value(&self, index: usize) -> Result<Value<'a>> {
        let (chunk, pos) = self.locate(index)?;
        chunk.value_at(pos, index)
    }

    /// Columns addressable through this row: all of them, or only the
    /// key columns for a key-only row.
    pub fn column_count(&self) -> usize {
        if self.key_only {
            self.schema.key_column_count()
        } else {
            self.schema.column_count()
        }
    }

    fn locate(&self, index: usize) -> Result<(&ChunkView<'a>, usize)> {
        let count = self.column_count();
        if index >= count {
            return Err(RowError::IndexOutOfRange { index, count });
        }
        let key_count = self.schema.key_column_count();
        if index < key_count {
            Ok((&self.key, index))
        } else {
            match &self.value {
                Some(value) => Ok((value, index - key_count)),
                None => Err(RowError::IndexOutOfRange { index, count }),
            }
        }
    }
}

fn null_bit(null_map: &[u8], rank: Option<u16>) -> bool {
    match rank {
        Some(rank) => {
            let byte_idx = rank as usize / 8;
            let bit_idx = rank as usize % 8;
            null_map[byte_idx] & (1 << bit_idx) != 0
        }
        None => false,
    }
}

fn offset_table(data: &[u8], table_off: usize, entries: usize) -> Result<&[WireU32]> {
    let bytes = &data[table_off..table_off + entries * VARLEN_ENTRY_SIZE];
    <[WireU32]>::ref_from_bytes(bytes)
        .map_err(|_| RowError::CorruptRow("malformed varlen offset table".to_string()))
}

fn fixed_array<const N: usize>(bytes: &[u8], index: usize) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        RowError::CorruptRow(format!("insufficient data for column {index}"))
    })
}
