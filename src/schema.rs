//! # Schema Definition
//!
//! Columns and the versioned [`SchemaDescriptor`] that drives the row
//! codec. A descriptor is an ordered list of key columns followed by an
//! ordered list of value columns; logical index `0..K-1` addresses key
//! columns in declared order, `K..K+V-1` addresses value columns.
//!
//! Descriptors are immutable after construction and safe for
//! unsynchronized concurrent reads. One descriptor instance is shared by
//! every assembler and row reader for that schema version; callers that
//! need shared ownership wrap it in `Arc`.
//!
//! ## Precomputed Layout
//!
//! Construction precomputes one [`ChunkSchema`] per column group:
//!
//! - `nullable_ranks`: per column, its bit position in the chunk null-map
//!   (nullable columns only)
//! - `varlen_ranks`: per column, its rank among the chunk's
//!   variable-length columns
//! - nullable/varlen counts and the total fixed width
//!
//! These are layout accelerators for the assembler and reader; they never
//! change the encoding.

use hashbrown::HashMap;

use crate::error::{Result, RowError};
use crate::types::{NativeType, TypeKind};

/// One column: name, storage type, nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    native_type: NativeType,
    nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, native_type: NativeType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            native_type,
            nullable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_type(&self) -> NativeType {
        self.native_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// Precomputed layout facts for one column group (key or value chunk).
#[derive(Debug, Clone)]
pub(crate) struct ChunkSchema {
    first: usize,
    len: usize,
    nullable_count: usize,
    varlen_count: usize,
    fixed_width_total: usize,
    nullable_ranks: Vec<Option<u16>>,
    varlen_ranks: Vec<Option<u16>>,
}

impl ChunkSchema {
    fn new(first: usize, columns: &[Column]) -> Self {
        let mut nullable_ranks = Vec::with_capacity(columns.len());
        let mut varlen_ranks = Vec::with_capacity(columns.len());
        let mut nullable_count = 0usize;
        let mut varlen_count = 0usize;
        let mut fixed_width_total = 0usize;

        for col in columns {
            if col.is_nullable() {
                nullable_ranks.push(Some(nullable_count as u16));
                nullable_count += 1;
            } else {
                nullable_ranks.push(None);
            }
            match col.native_type().kind() {
                TypeKind::Fixed { width } => {
                    varlen_ranks.push(None);
                    fixed_width_total += width;
                }
                TypeKind::Variable => {
                    varlen_ranks.push(Some(varlen_count as u16));
                    varlen_count += 1;
                }
            }
        }

        Self {
            first,
            len: columns.len(),
            nullable_count,
            varlen_count,
            fixed_width_total,
            nullable_ranks,
            varlen_ranks,
        }
    }

    /// Logical index of the chunk's first column.
    pub(crate) fn first(&self) -> usize {
        self.first
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn nullable_count(&self) -> usize {
        self.nullable_count
    }

    pub(crate) fn varlen_count(&self) -> usize {
        self.varlen_count
    }

    /// Sum of all fixed-column widths. An upper bound on the fixed region
    /// size; null columns occupy no space in the encoded chunk.
    pub(crate) fn fixed_width_total(&self) -> usize {
        self.fixed_width_total
    }

    /// Null-map size in bytes: one bit per nullable column.
    pub(crate) fn null_map_size(&self) -> usize {
        self.nullable_count.div_ceil(8)
    }

    /// Bit position in the null-map for the column at `pos` within this
    /// chunk, or `None` for non-nullable columns.
    pub(crate) fn nullable_rank(&self, pos: usize) -> Option<u16> {
        self.nullable_ranks[pos]
    }

    /// Rank among the chunk's variable-length columns for the column at
    /// `pos`, or `None` for fixed-width columns.
    pub(crate) fn varlen_rank(&self, pos: usize) -> Option<u16> {
        self.varlen_ranks[pos]
    }
}

/// Immutable, versioned description of a row's key/value column layout.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    version: u16,
    columns: Vec<Column>,
    key_count: usize,
    name_index: HashMap<String, usize>,
    key_chunk: ChunkSchema,
    value_chunk: ChunkSchema,
}

impl SchemaDescriptor {
    /// Builds a descriptor from a version number and ordered key/value
    /// column lists.
    ///
    /// Fails with [`RowError::SchemaDefinition`] when the version is
    /// zero, the key column list is empty, or a column name repeats
    /// anywhere across the key+value union.
    pub fn new(
        version: u16,
        key_columns: Vec<Column>,
        value_columns: Vec<Column>,
    ) -> Result<Self> {
        if version == 0 {
            return Err(RowError::SchemaDefinition(
                "schema version must be positive".to_string(),
            ));
        }
        if key_columns.is_empty() {
            return Err(RowError::SchemaDefinition(
                "schema requires at least one key column".to_string(),
            ));
        }

        let key_count = key_columns.len();
        let mut columns = key_columns;
        columns.extend(value_columns);

        let mut name_index = HashMap::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            if name_index.insert(col.name().to_string(), idx).is_some() {
                return Err(RowError::SchemaDefinition(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }

        let key_chunk = ChunkSchema::new(0, &columns[..key_count]);
        let value_chunk = ChunkSchema::new(key_count, &columns[key_count..]);

        Ok(Self {
            version,
            columns,
            key_count,
            name_index,
            key_chunk,
            value_chunk,
        })
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn key_column_count(&self) -> usize {
        self.key_count
    }

    pub fn value_column_count(&self) -> usize {
        self.columns.len() - self.key_count
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    /// Logical index for a column name, across key and value columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn is_key_column(&self, idx: usize) -> bool {
        idx < self.key_count
    }

    pub fn key_columns(&self) -> &[Column] {
        &self.columns[..self.key_count]
    }

    pub fn value_columns(&self) -> &[Column] {
        &self.columns[self.key_count..]
    }

    pub(crate) fn key_chunk(&self) -> &ChunkSchema {
        &self.key_chunk
    }

    pub(crate) fn value_chunk(&self) -> &ChunkSchema {
        &self.value_chunk
    }

    /// Columns belonging to `chunk`, in declared order.
    pub(crate) fn chunk_columns(&self, chunk: &ChunkSchema) -> &[Column] {
        &self.columns[chunk.first()..chunk.first() + chunk.len()]
    }
}
