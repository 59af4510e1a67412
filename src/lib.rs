//! # binrow - Schema-Aware Binary Row Codec
//!
//! `binrow` is the row codec at the core of a distributed table store:
//! it turns a typed, possibly-nullable set of column values into a
//! compact, checksummed byte sequence (and back) according to a
//! versioned column schema. Every key lookup, replicated write command
//! and index entry in the layers above is, at the byte level, one of
//! these rows.
//!
//! ## Quick Start
//!
//! ```ignore
//! use binrow::{Column, NativeType, Row, RowAssembler, SchemaDescriptor};
//!
//! let schema = SchemaDescriptor::new(
//!     1,
//!     vec![Column::new("id", NativeType::Int64, false)],
//!     vec![
//!         Column::new("age", NativeType::Int32, true),
//!         Column::new("name", NativeType::Text, false),
//!     ],
//! )?;
//!
//! let mut asm = RowAssembler::new(&schema);
//! asm.append_int64(7)?;
//! asm.append_null()?;
//! asm.append_text("hello")?;
//! let bytes = asm.build()?;
//!
//! let row = Row::new(&schema, &bytes)?;
//! assert_eq!(row.get_int64(0)?, Some(7));
//! assert_eq!(row.get_int32(1)?, None);
//! assert_eq!(row.get_text(2)?, Some("hello"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------+
//! |  Tuple marshalling / query processing    |   (excluded collaborators)
//! +------------------------------------------+
//! |  codec: encode / decode / key extraction |
//! +---------------------+--------------------+
//! |  row::RowAssembler  |  row::Row          |
//! +---------------------+--------------------+
//! |  schema: SchemaDescriptor, Column        |
//! +------------------------------------------+
//! |  types: NativeType catalog, Value        |
//! +------------------------------------------+
//! ```
//!
//! The codec is a pure, synchronous transformation over in-memory
//! buffers: no I/O, no locking, no retries. `SchemaDescriptor` and
//! encoded rows are immutable and freely shared across threads; a
//! `RowAssembler` is single-writer and consumed by `build`.
//!
//! ## Module Overview
//!
//! - [`types`]: the closed `NativeType` catalog and runtime `Value`
//! - [`schema`]: `Column` and the versioned `SchemaDescriptor`
//! - [`row`]: the encoded row layout, `RowAssembler` and `Row`
//! - [`codec`]: `encode`/`decode`/`extract_key_bytes` boundary
//! - [`error`]: the codec error taxonomy

pub mod codec;
pub mod error;
pub mod row;
pub mod schema;
pub mod types;

pub use codec::{decode, encode, extract_key_bytes, schema_version};
pub use error::{Result, RowError};
pub use row::{ChunkView, Row, RowAssembler};
pub use schema::{Column, SchemaDescriptor};
pub use types::{NativeType, TypeKind, Value};
