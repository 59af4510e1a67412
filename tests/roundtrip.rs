//! Round-trip and boundary-contract tests for the public codec API.

use std::borrow::Cow;

use binrow::{
    decode, encode, extract_key_bytes, schema_version, Column, NativeType, Row, RowAssembler,
    RowError, SchemaDescriptor, Value,
};

fn mixed_schema() -> SchemaDescriptor {
    SchemaDescriptor::new(
        3,
        vec![
            Column::new("tenant", NativeType::Int16, false),
            Column::new("id", NativeType::Int64, false),
        ],
        vec![
            Column::new("flags", NativeType::Int8, true),
            Column::new("count", NativeType::Int32, false),
            Column::new("name", NativeType::Text, true),
            Column::new("payload", NativeType::Blob, true),
        ],
    )
    .unwrap()
}

#[test]
fn round_trip_every_type_family() {
    let schema = mixed_schema();
    let mut asm = RowAssembler::new(&schema);
    asm.append_int16(12).unwrap();
    asm.append_int64(-987654321).unwrap();
    asm.append_int8(-7).unwrap();
    asm.append_int32(1_000_000).unwrap();
    asm.append_text("我愛 binary rows").unwrap();
    asm.append_blob(&[0x00, 0xFF, 0x21, 0xB3]).unwrap();
    let bytes = asm.build().unwrap();

    let row = decode(&schema, &bytes).unwrap();
    assert_eq!(row.get_int16(0).unwrap(), Some(12));
    assert_eq!(row.get_int64(1).unwrap(), Some(-987654321));
    assert_eq!(row.get_int8(2).unwrap(), Some(-7));
    assert_eq!(row.get_int32(3).unwrap(), Some(1_000_000));
    assert_eq!(row.get_text(4).unwrap(), Some("我愛 binary rows"));
    assert_eq!(row.get_blob(5).unwrap(), Some(&[0x00, 0xFF, 0x21, 0xB3][..]));
}

#[test]
fn null_round_trip_on_nullable_columns() {
    let schema = mixed_schema();
    let mut asm = RowAssembler::new(&schema);
    asm.append_int16(1).unwrap();
    asm.append_int64(2).unwrap();
    asm.append_null().unwrap();
    asm.append_int32(3).unwrap();
    asm.append_null().unwrap();
    asm.append_null().unwrap();
    let bytes = asm.build().unwrap();

    let row = decode(&schema, &bytes).unwrap();
    assert_eq!(row.get_int8(2).unwrap(), None);
    assert_eq!(row.get_text(4).unwrap(), None);
    assert_eq!(row.get_blob(5).unwrap(), None);
    assert_eq!(row.get_int32(3).unwrap(), Some(3));
}

#[test]
fn null_on_non_nullable_produces_no_row() {
    let schema = mixed_schema();
    let mut asm = RowAssembler::new(&schema);
    let err = asm.append_null().unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));

    // the sequence is still positioned at the first column
    asm.append_int16(1).unwrap();
    asm.append_int64(2).unwrap();
    asm.append_int8(0).unwrap();
    let err = asm.append_null().unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));
}

#[test]
fn order_enforcement() {
    let schema = mixed_schema();

    // a value column's type before the keys are done is a violation
    let mut asm = RowAssembler::new(&schema);
    let err = asm.append_int8(1).unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));

    // no partial bytes come out of build()
    let mut asm = RowAssembler::new(&schema);
    asm.append_int16(1).unwrap();
    asm.append_int64(2).unwrap();
    let err = asm.build().unwrap_err();
    assert!(matches!(err, RowError::BuildIncomplete { next_column } if next_column == "flags"));

    // appending beyond the last value column is a violation
    let mut asm = RowAssembler::new(&schema);
    asm.append_int16(1).unwrap();
    asm.append_int64(2).unwrap();
    asm.append_int8(3).unwrap();
    asm.append_int32(4).unwrap();
    asm.append_text("t").unwrap();
    asm.append_blob(b"b").unwrap();
    let err = asm.append_int32(5).unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));
}

#[test]
fn varlen_null_pattern_independence() {
    let schema = SchemaDescriptor::new(
        1,
        vec![Column::new("k", NativeType::Int32, false)],
        vec![
            Column::new("a", NativeType::Blob, true),
            Column::new("b", NativeType::Text, true),
            Column::new("c", NativeType::Blob, true),
        ],
    )
    .unwrap();

    let a: &[u8] = &[0x21, 0xB3, 0x78];
    let b = "ascii";
    let c: &[u8] = &[0xAA];
    let patterns: &[[bool; 3]] = &[
        [false, false, false],
        [true, false, false],
        [false, true, false],
        [false, false, true],
        [true, true, true],
    ];

    for pattern in patterns {
        let mut asm = RowAssembler::new(&schema);
        asm.append_int32(1).unwrap();
        if pattern[0] {
            asm.append_null().unwrap();
        } else {
            asm.append_blob(a).unwrap();
        }
        if pattern[1] {
            asm.append_null().unwrap();
        } else {
            asm.append_text(b).unwrap();
        }
        if pattern[2] {
            asm.append_null().unwrap();
        } else {
            asm.append_blob(c).unwrap();
        }
        let bytes = asm.build().unwrap();
        let row = decode(&schema, &bytes).unwrap();

        assert_eq!(row.is_null(1).unwrap(), pattern[0], "pattern {pattern:?}");
        assert_eq!(row.is_null(2).unwrap(), pattern[1], "pattern {pattern:?}");
        assert_eq!(row.is_null(3).unwrap(), pattern[2], "pattern {pattern:?}");
        assert_eq!(
            row.get_blob(1).unwrap(),
            (!pattern[0]).then_some(a),
            "pattern {pattern:?}"
        );
        assert_eq!(
            row.get_text(2).unwrap(),
            (!pattern[1]).then_some(b),
            "pattern {pattern:?}"
        );
        assert_eq!(
            row.get_blob(3).unwrap(),
            (!pattern[2]).then_some(c),
            "pattern {pattern:?}"
        );
    }
}

#[test]
fn hints_never_change_the_encoding() {
    let schema = mixed_schema();
    let hint_sets = [
        (0, 0, 0, 0),
        (1, 1, 1, 1),
        (128, 0, 128, 0),
        (4096, 16, 4096, 16),
    ];

    let mut encodings = Vec::new();
    for (kf, kv, vf, vv) in hint_sets {
        let mut asm = RowAssembler::with_hints(&schema, kf, kv, vf, vv);
        asm.append_int16(9).unwrap();
        asm.append_int64(10).unwrap();
        asm.append_null().unwrap();
        asm.append_int32(11).unwrap();
        asm.append_text("hinted").unwrap();
        asm.append_blob(&[1, 2, 3]).unwrap();
        encodings.push(asm.build().unwrap());
    }
    for window in encodings.windows(2) {
        assert_eq!(window[0], window[1]);
    }

    let row = decode(&schema, &encodings[0]).unwrap();
    assert_eq!(row.get_text(4).unwrap(), Some("hinted"));
}

#[test]
fn concrete_scenario() {
    let schema = SchemaDescriptor::new(
        1,
        vec![Column::new("k1", NativeType::Int64, false)],
        vec![
            Column::new("v1", NativeType::Int32, true),
            Column::new("v2", NativeType::Text, false),
        ],
    )
    .unwrap();

    let mut asm = RowAssembler::new(&schema);
    asm.append_int64(7).unwrap();
    asm.append_null().unwrap();
    asm.append_text("hello").unwrap();
    let bytes = asm.build().unwrap();

    let row = decode(&schema, &bytes).unwrap();
    assert_eq!(row.get_int64(0).unwrap(), Some(7));
    assert_eq!(row.get_int32(1).unwrap(), None);
    assert_eq!(row.get_text(2).unwrap(), Some("hello"));

    let mut asm = RowAssembler::new(&schema);
    let err = asm.append_null().unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));
}

#[test]
fn encode_decode_value_boundary() {
    let schema = mixed_schema();
    let values = vec![
        Value::Int16(5),
        Value::Int64(77),
        Value::Null,
        Value::Int32(13),
        Value::Text(Cow::Borrowed("boundary")),
        Value::Blob(Cow::Borrowed(&[9, 8, 7][..])),
    ];

    let bytes = encode(&schema, &values).unwrap();
    let row = decode(&schema, &bytes).unwrap();
    for (idx, expected) in values.iter().enumerate() {
        assert_eq!(&row.value(idx).unwrap(), expected);
    }
}

#[test]
fn encode_key_only_by_value_count() {
    let schema = mixed_schema();
    let key = vec![Value::Int16(5), Value::Int64(77)];

    let bytes = encode(&schema, &key).unwrap();
    let row = decode(&schema, &bytes).unwrap();
    assert!(!row.has_value());
    assert_eq!(row.value(1).unwrap(), Value::Int64(77));

    let err = encode(&schema, &key[..1]).unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));
}

#[test]
fn encode_rejects_type_drift() {
    let schema = mixed_schema();
    let values = vec![
        Value::Int16(5),
        Value::Text(Cow::Borrowed("not an int64")),
    ];
    let err = encode(&schema, &values).unwrap_err();
    assert!(matches!(err, RowError::SchemaViolation(_)));
}

#[test]
fn key_bytes_extraction_matches_key_chunk() {
    let schema = mixed_schema();

    let full = encode(
        &schema,
        &[
            Value::Int16(5),
            Value::Int64(77),
            Value::Int8(1),
            Value::Int32(2),
            Value::Text(Cow::Borrowed("abc")),
            Value::Null,
        ],
    )
    .unwrap();
    let key_only = encode(&schema, &[Value::Int16(5), Value::Int64(77)]).unwrap();
    let other = encode(&schema, &[Value::Int16(5), Value::Int64(78)]).unwrap();

    // same logical key encodes to the same key bytes, full row or template
    assert_eq!(
        extract_key_bytes(&full).unwrap(),
        extract_key_bytes(&key_only).unwrap()
    );
    assert_ne!(
        extract_key_bytes(&full).unwrap(),
        extract_key_bytes(&other).unwrap()
    );

    let row = decode(&schema, &full).unwrap();
    assert_eq!(extract_key_bytes(&full).unwrap(), row.key_chunk().bytes());

    let err = extract_key_bytes(&full[..6]).unwrap_err();
    assert!(matches!(err, RowError::CorruptRow(_)));
}

#[test]
fn schema_version_peek() {
    let schema = mixed_schema();
    let bytes = encode(&schema, &[Value::Int16(1), Value::Int64(2)]).unwrap();
    assert_eq!(schema_version(&bytes).unwrap(), 3);

    let err = schema_version(&[0, 0, 0]).unwrap_err();
    assert!(matches!(err, RowError::CorruptRow(_)));
}

#[test]
fn shared_reads_across_threads() {
    let schema = mixed_schema();
    let bytes = encode(
        &schema,
        &[
            Value::Int16(5),
            Value::Int64(77),
            Value::Null,
            Value::Int32(2),
            Value::Text(Cow::Borrowed("shared")),
            Value::Blob(Cow::Borrowed(&[1][..])),
        ],
    )
    .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let row = Row::new(&schema, &bytes).unwrap();
                for _ in 0..100 {
                    assert_eq!(row.get_int64(1).unwrap(), Some(77));
                    assert_eq!(row.get_text(4).unwrap(), Some("shared"));
                    assert_eq!(row.get_int8(2).unwrap(), None);
                }
            });
        }
    });
}
