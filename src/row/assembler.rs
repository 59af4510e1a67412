//! # RowAssembler - Row Construction
//!
//! Single-use, forward-only builder that turns column values into an
//! encoded row. Values are appended in schema order, key columns first,
//! then value columns; a cursor tracks the next expected column and every
//! append is checked against it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut asm = RowAssembler::new(&schema);
//! asm.append_int64(7)?;        // key column
//! asm.append_null()?;          // nullable value column
//! asm.append_text("hello")?;   // value column
//! let bytes = asm.build()?;    // consumes the assembler
//! ```
//!
//! A row for lookup or delete templates carries only key columns:
//!
//! ```ignore
//! let mut asm = RowAssembler::new(&schema);
//! asm.append_int64(7)?;
//! let key_row = asm.build_key_only()?;
//! ```
//!
//! ## Buffering
//!
//! Appends accumulate into per-chunk buffers (null-map, offset table,
//! fixed region, variable region); `build` emits the framed row in one
//! forward pass and appends the checksum trailer. The size hints passed
//! to [`RowAssembler::with_hints`] pre-size those buffers and have no
//! effect on the encoded bytes.
//!
//! `build` consumes the assembler, so reuse is a compile error rather
//! than a runtime state to check.

use smallvec::SmallVec;
use zerocopy::IntoBytes;

use crate::error::{Result, RowError};
use crate::row::layout::{
    compute_checksum, RowHeader, CHECKSUM_SIZE, CHUNK_LEN_SIZE, FLAG_KEY_ONLY, ROW_HEADER_SIZE,
    VARLEN_ENTRY_SIZE,
};
use crate::schema::{ChunkSchema, Column, SchemaDescriptor};
use crate::types::NativeType;

/// Accumulates one chunk's regions until `build` frames them.
struct ChunkWriter {
    null_map: SmallVec<[u8; 8]>,
    var_ends: SmallVec<[u32; 8]>,
    fixed: Vec<u8>,
    var: Vec<u8>,
}

impl ChunkWriter {
    fn new(chunk: &ChunkSchema, fixed_hint: usize, varlen_hint: usize) -> Self {
        let mut null_map = SmallVec::new();
        null_map.resize(chunk.null_map_size(), 0u8);
        Self {
            null_map,
            var_ends: SmallVec::with_capacity(varlen_hint),
            fixed: Vec::with_capacity(fixed_hint),
            var: Vec::new(),
        }
    }

    fn set_null(&mut self, rank: u16) {
        let byte_idx = rank as usize / 8;
        let bit_idx = rank as usize % 8;
        self.null_map[byte_idx] |= 1 << bit_idx;
    }

    fn push_fixed(&mut self, bytes: &[u8]) {
        self.fixed.extend_from_slice(bytes);
    }

    fn push_var(&mut self, column: &str, bytes: &[u8]) -> Result<()> {
        let end = self.var.len() + bytes.len();
        if end > u32::MAX as usize {
            return Err(RowError::SchemaViolation(format!(
                "column '{column}' overflows the chunk's variable-length region"
            )));
        }
        self.var.extend_from_slice(bytes);
        self.var_ends.push(end as u32);
        Ok(())
    }

    fn body_len(&self) -> usize {
        self.null_map.len()
            + self.var_ends.len() * VARLEN_ENTRY_SIZE
            + self.fixed.len()
            + self.var.len()
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.body_len() as u32).to_le_bytes());
        out.extend_from_slice(&self.null_map);
        for end in &self.var_ends {
            out.extend_from_slice(&end.to_le_bytes());
        }
        out.extend_from_slice(&self.fixed);
        out.extend_from_slice(&self.var);
    }
}

/// Single-use builder producing an encoded row from column values.
pub struct RowAssembler<'a> {
    schema: &'a SchemaDescriptor,
    cursor: usize,
    key: ChunkWriter,
    value: ChunkWriter,
}

impl<'a> RowAssembler<'a> {
    /// Creates an assembler with buffer sizes derived from the schema.
    pub fn new(schema: &'a SchemaDescriptor) -> Self {
        Self::with_hints(
            schema,
            schema.key_chunk().fixed_width_total(),
            schema.key_chunk().varlen_count(),
            schema.value_chunk().fixed_width_total(),
            schema.value_chunk().varlen_count(),
        )
    }

    /// Creates an assembler with explicit pre-allocation hints: expected
    /// fixed-region sizes in bytes and expected counts of non-null
    /// variable-length columns, per chunk. Hints only size the internal
    /// buffers; the encoded bytes are identical for any hint values.
    pub fn with_hints(
        schema: &'a SchemaDescriptor,
        key_fixed_hint: usize,
        key_varlen_hint: usize,
        value_fixed_hint: usize,
        value_varlen_hint: usize,
    ) -> Self {
        Self {
            schema,
            cursor: 0,
            key: ChunkWriter::new(schema.key_chunk(), key_fixed_hint, key_varlen_hint),
            value: ChunkWriter::new(schema.value_chunk(), value_fixed_hint, value_varlen_hint),
        }
    }

    pub fn schema(&self) -> &'a SchemaDescriptor {
        self.schema
    }

    /// Logical index of the next expected column.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn append_int8(&mut self, value: i8) -> Result<()> {
        self.append_fixed(NativeType::Int8, &value.to_le_bytes())
    }

    pub fn append_int16(&mut self, value: i16) -> Result<()> {
        self.append_fixed(NativeType::Int16, &value.to_le_bytes())
    }

    pub fn append_int32(&mut self, value: i32) -> Result<()> {
        self.append_fixed(NativeType::Int32, &value.to_le_bytes())
    }

    pub fn append_int64(&mut self, value: i64) -> Result<()> {
        self.append_fixed(NativeType::Int64, &value.to_le_bytes())
    }

    pub fn append_text(&mut self, value: &str) -> Result<()> {
        self.append_var(NativeType::Text, value.as_bytes())
    }

    pub fn append_blob(&mut self, value: &[u8]) -> Result<()> {
        self.append_var(NativeType::Blob, value)
    }

    /// Appends a null for the next expected column, which must be
    /// declared nullable.
    pub fn append_null(&mut self) -> Result<()> {
        let schema = self.schema;
        let idx = self.cursor;
        let col = Self::expected(schema, idx)?;
        if !col.is_nullable() {
            return Err(RowError::SchemaViolation(format!(
                "column '{}' is not nullable",
                col.name()
            )));
        }
        let (chunk, pos) = Self::chunk_pos(schema, idx);
        let rank = chunk
            .nullable_rank(pos)
            .expect("nullable column always has a null-map rank");
        self.writer(idx).set_null(rank);
        self.cursor += 1;
        Ok(())
    }

    /// Emits the full row. Legal only after every key and value column
    /// was appended; fails with [`RowError::BuildIncomplete`] naming the
    /// next missing column otherwise.
    pub fn build(self) -> Result<Vec<u8>> {
        if self.cursor < self.schema.column_count() {
            return Err(self.incomplete());
        }
        self.finish(false)
    }

    /// Emits a key-only row (empty value chunk) for lookup and delete
    /// templates. Legal only when exactly the key columns were appended.
    pub fn build_key_only(self) -> Result<Vec<u8>> {
        let key_count = self.schema.key_column_count();
        if self.cursor < key_count {
            return Err(self.incomplete());
        }
        if self.cursor > key_count {
            return Err(RowError::SchemaViolation(
                "cannot finalize as key-only: value columns were already appended".to_string(),
            ));
        }
        self.finish(true)
    }

    fn finish(self, key_only: bool) -> Result<Vec<u8>> {
        let key_body = self.key.body_len();
        let value_body = if key_only { 0 } else { self.value.body_len() };
        if key_body > u32::MAX as usize || value_body > u32::MAX as usize {
            return Err(RowError::SchemaViolation(
                "chunk exceeds the 4 GiB row format limit".to_string(),
            ));
        }

        let mut out = Vec::with_capacity(
            ROW_HEADER_SIZE + 2 * CHUNK_LEN_SIZE + key_body + value_body + CHECKSUM_SIZE,
        );
        let flags = if key_only { FLAG_KEY_ONLY } else { 0 };
        out.extend_from_slice(RowHeader::new(self.schema.version(), flags).as_bytes());

        self.key.write_to(&mut out);
        if key_only {
            out.extend_from_slice(&0u32.to_le_bytes());
        } else {
            self.value.write_to(&mut out);
        }

        let crc = compute_checksum(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        Ok(out)
    }

    fn incomplete(&self) -> RowError {
        let next_column = self
            .schema
            .column(self.cursor)
            .map(|c| c.name().to_string())
            .unwrap_or_default();
        RowError::BuildIncomplete { next_column }
    }

    fn expected(schema: &'a SchemaDescriptor, idx: usize) -> Result<&'a Column> {
        schema.column(idx).ok_or_else(|| {
            RowError::SchemaViolation(format!(
                "append past the last column ({} columns expected)",
                schema.column_count()
            ))
        })
    }

    fn chunk_pos(schema: &'a SchemaDescriptor, idx: usize) -> (&'a ChunkSchema, usize) {
        if idx < schema.key_column_count() {
            (schema.key_chunk(), idx)
        } else {
            (schema.value_chunk(), idx - schema.key_column_count())
        }
    }

    fn writer(&mut self, idx: usize) -> &mut ChunkWriter {
        if idx < self.schema.key_column_count() {
            &mut self.key
        } else {
            &mut self.value
        }
    }

    fn check_next(&self, requested: NativeType) -> Result<()> {
        let col = Self::expected(self.schema, self.cursor)?;
        if col.native_type() != requested {
            return Err(RowError::SchemaViolation(format!(
                "column '{}' expects {}, got {}",
                col.name(),
                col.native_type(),
                requested
            )));
        }
        Ok(())
    }

    fn append_fixed(&mut self, ty: NativeType, bytes: &[u8]) -> Result<()> {
        self.check_next(ty)?;
        let idx = self.cursor;
        self.writer(idx).push_fixed(bytes);
        self.cursor += 1;
        Ok(())
    }

    fn append_var(&mut self, ty: NativeType, bytes: &[u8]) -> Result<()> {
        self.check_next(ty)?;
        let schema = self.schema;
        let idx = self.cursor;
        let col = Self::expected(schema, idx)?;
        self.writer(idx).push_var(col.name(), bytes)?;
        self.cursor += 1;
        Ok(())
    }
}
