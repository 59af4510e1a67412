//! # Encoded Row Layout
//!
//! One encoded row is the output of a single [`RowAssembler`] run: a
//! version-stamped, checksummed byte sequence logically partitioned into
//! a key chunk and a value chunk.
//!
//! ## Row Binary Layout
//!
//! ```text
//! +----------+-------+--------------------+--------------------+----------+
//! | version  | flags | key chunk          | value chunk        | checksum |
//! | (u16)    | (u8)  | len:u32 + body     | len:u32 + body     | (u32)    |
//! +----------+-------+--------------------+--------------------+----------+
//! ```
//!
//! Each chunk length counts the body bytes that follow it, so either
//! chunk can be located or skipped without decoding the other. A
//! key-only row (lookup/delete template) sets the `flags` bit and writes
//! a value chunk length of 0. The checksum is CRC-32/Castagnoli over all
//! preceding bytes.
//!
//! ## Chunk Binary Layout
//!
//! ```text
//! +------------------+---------------------+------------+---------------+
//! | null-map         | varlen offset table | fixed data | variable data |
//! | [(N_nul+7)/8]    | [u32; N_present]    | [u8; ...]  | [u8; ...]     |
//! +------------------+---------------------+------------+---------------+
//! ```
//!
//! | Component | Description |
//! |-----------|-------------|
//! | **Null-map** | 1 bit per *nullable* column, declared order. `1` = NULL |
//! | **Offset table** | Cumulative end offsets, one per *non-null* varlen column |
//! | **Fixed data** | Concatenated non-null fixed-width values, declared order |
//! | **Variable data** | Concatenated non-null varlen values, declared order |
//!
//! Null columns occupy no space in either data region; their absence is
//! reconstructed from the null-map. All integers are little-endian.
//!
//! ## Module Structure
//!
//! - `layout`: framing constants, header struct, checksums
//! - `assembler`: [`RowAssembler`] single-use builder
//! - `view`: [`Row`] and [`ChunkView`] zero-copy readers

pub mod assembler;
pub(crate) mod layout;
pub mod view;


pub use assembler::RowAssembler;
pub use view::{ChunkView, Row};
