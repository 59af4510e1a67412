//! Fuzz testing for the row reader.
//!
//! Decoding arbitrary bytes against an arbitrary schema must never
//! panic: every malformed buffer is rejected with a clean error, and
//! any buffer the reader accepts must answer every accessor without
//! panicking.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use binrow::{Column, NativeType, Row, SchemaDescriptor};

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzType {
    Int8,
    Int16,
    Int32,
    Int64,
    Text,
    Blob,
}

impl FuzzType {
    fn native(self) -> NativeType {
        match self {
            FuzzType::Int8 => NativeType::Int8,
            FuzzType::Int16 => NativeType::Int16,
            FuzzType::Int32 => NativeType::Int32,
            FuzzType::Int64 => NativeType::Int64,
            FuzzType::Text => NativeType::Text,
            FuzzType::Blob => NativeType::Blob,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct ViewInput {
    version: u16,
    key_cols: Vec<(FuzzType, bool)>,
    value_cols: Vec<(FuzzType, bool)>,
    data: Vec<u8>,
}

fuzz_target!(|input: ViewInput| {
    let key_cols: Vec<Column> = input
        .key_cols
        .iter()
        .take(16)
        .enumerate()
        .map(|(i, (ty, nullable))| Column::new(format!("k{i}"), ty.native(), *nullable))
        .collect();
    let value_cols: Vec<Column> = input
        .value_cols
        .iter()
        .take(16)
        .enumerate()
        .map(|(i, (ty, nullable))| Column::new(format!("v{i}"), ty.native(), *nullable))
        .collect();

    let Ok(schema) = SchemaDescriptor::new(input.version, key_cols, value_cols) else {
        return;
    };

    let Ok(row) = Row::new(&schema, &input.data) else {
        return;
    };

    for idx in 0..schema.column_count() + 1 {
        let _ = row.is_null(idx);
        let _ = row.get_int8(idx);
        let _ = row.get_int16(idx);
        let _ = row.get_int32(idx);
        let _ = row.get_int64(idx);
        let _ = row.get_text(idx);
        let _ = row.get_blob(idx);
        let _ = row.value(idx);
    }
    let _ = row.key_chunk().bytes();
    if let Some(value) = row.value_chunk() {
        let _ = value.bytes();
    }
});
