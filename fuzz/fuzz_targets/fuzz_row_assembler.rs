//! Fuzz testing for the row assembler.
//!
//! Arbitrary append sequences either fail with a clean error or produce
//! a row that the reader accepts and can fully read back.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use binrow::{Column, NativeType, Row, RowAssembler, SchemaDescriptor};

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
enum Append {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Text(String),
    Blob(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
struct AssemblerInput {
    key_cols: Vec<(FuzzType, bool)>,
    value_cols: Vec<(FuzzType, bool)>,
    appends: Vec<Append>,
    key_only: bool,
    hints: (u8, u8, u8, u8),
}

fuzz_target!(|input: AssemblerInput| {
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

    let Ok(schema) = SchemaDescriptor::new(1, key_cols, value_cols) else {
        return;
    };

    let (kf, kv, vf, vv) = input.hints;
    let mut asm =
        RowAssembler::with_hints(&schema, kf as usize, kv as usize, vf as usize, vv as usize);
    for append in &input.appends {
        let result = match append {
            Append::Null => asm.append_null(),
            Append::Int8(v) => asm.append_int8(*v),
            Append::Int16(v) => asm.append_int16(*v),
            Append::Int32(v) => asm.append_int32(*v),
            Append::Int64(v) => asm.append_int64(*v),
            Append::Text(v) => asm.append_text(v),
            Append::Blob(v) => asm.append_blob(v),
        };
        if result.is_err() {
            // rejected appends must not advance the sequence
            continue;
        }
    }

    let built = if input.key_only {
        asm.build_key_only()
    } else {
        asm.build()
    };
    let Ok(bytes) = built else {
        return;
    };

    // anything the assembler emits must decode cleanly
    let row = Row::new(&schema, &bytes).expect("assembled row must be readable");
    for idx in 0..row.column_count() {
        row.value(idx).expect("assembled column must be readable");
    }
});
