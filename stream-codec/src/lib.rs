//! Self-describing byte stream for schema + batch transfer.
//!
//! # Stream layout (all integers little-endian)
//!
//! ```text
//! MAGIC(4) | FIELD_COUNT(u32) | FIELD[..] | ROW_COUNT(u32) | COLUMN[..]
//!
//! FIELD          = NAME_LEN(u32) NAME(bytes) TYPE_TAG(u8) NULLABLE(u8)
//! COLUMN (Int32) = VALIDITY_LEN(u32) VALIDITY | DATA_LEN(u32) DATA
//! COLUMN (Utf8)  = VALIDITY_LEN(u32) VALIDITY | OFFSETS_LEN(u32) OFFSETS(u32 array)
//!                  | DATA_LEN(u32) DATA
//! ```
//!
//! TYPE_TAG: 0 = Int32, 1 = Utf8. Decoding rejects anything malformed
//! (truncation, unknown tags, length fields that overrun the input, validity
//! or offsets sizes that disagree with the row count, non-monotonic offsets)
//! and never returns a partial batch.

pub mod reader;
pub mod writer;

use thiserror::Error;

pub const MAGIC: [u8; 4] = *b"CBS1";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed stream: {0}")]
    MalformedStream(&'static str),

    #[error(transparent)]
    Memory(#[from] batch_memory::MemoryError),

    #[error(transparent)]
    Column(#[from] columnar_core::ColumnarError),
}

pub use reader::decode;
pub use writer::encode;

#[cfg(test)]
mod tests {
    use super::*;
    use batch_memory::MemoryPool;
    use columnar_core::{
        Column, Field, Int32Vector, LogicalType, RecordBatch, Schema, Utf8Vector,
    };
    use std::sync::Arc;

    fn sample_batch(pool: &MemoryPool) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::nullable("id", LogicalType::Int32).unwrap(),
            Field::nullable("name", LogicalType::Utf8).unwrap(),
        ]));

        let mut ids = Int32Vector::allocate_new(pool, 2).unwrap();
        ids.set(0, 1).unwrap();
        ids.set_null(1).unwrap();

        let mut names = Utf8Vector::allocate_new(pool, 8, 2).unwrap();
        names.set(0, "Ann").unwrap();
        names.set(1, "Bo").unwrap();

        RecordBatch::try_new(
            schema,
            vec![
                Column::Int32(ids.set_value_count(2).unwrap()),
                Column::Utf8(names.set_value_count(2).unwrap()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn round_trip_reproduces_the_batch() {
        let pool = MemoryPool::default();
        let batch = sample_batch(&pool);

        let bytes = encode(&batch);
        let decoded = decode(&bytes, &pool).unwrap();

        assert_eq!(decoded, batch);
        assert_eq!(decoded.schema(), batch.schema());
        assert_eq!(
            decoded.column(1).as_utf8().unwrap().offsets(),
            &[0, 3, 5]
        );
        assert_eq!(decoded.column(1).as_utf8().unwrap().data(), b"AnnBo");
    }

    #[test]
    fn round_trip_preserves_null_positions() {
        let pool = MemoryPool::default();
        let schema = Arc::new(Schema::new(vec![Field::nullable(
            "v",
            LogicalType::Utf8,
        )
        .unwrap()]));

        let mut v = Utf8Vector::allocate_new(&pool, 8, 4).unwrap();
        v.set(0, "a").unwrap();
        v.set_null(1).unwrap();
        v.set(2, "").unwrap();
        v.set_null(3).unwrap();
        let batch = RecordBatch::try_new(
            schema,
            vec![Column::Utf8(v.set_value_count(4).unwrap())],
        )
        .unwrap();

        let decoded = decode(&encode(&batch), &pool).unwrap();
        let col = decoded.column(0).as_utf8().unwrap();

        assert_eq!(col.value(0), Some("a"));
        assert_eq!(col.value(1), None);
        assert_eq!(col.value(2), Some("")); // empty, not null
        assert_eq!(col.value(3), None);
        assert_eq!(col.null_count(), 2);
    }

    #[test]
    fn round_trip_empty_batch() {
        let pool = MemoryPool::default();
        let batch = RecordBatch::try_new(Arc::new(Schema::empty()), vec![]).unwrap();
        let decoded = decode(&encode(&batch), &pool).unwrap();
        assert_eq!(decoded.row_count(), 0);
        assert_eq!(decoded.num_columns(), 0);
    }

    #[test]
    fn round_trip_zero_rows_with_columns() {
        let pool = MemoryPool::default();
        let schema = Arc::new(Schema::new(vec![Field::new(
            "n",
            LogicalType::Int32,
            false,
        )
        .unwrap()]));
        let v = Int32Vector::allocate_new(&pool, 0).unwrap();
        let batch = RecordBatch::try_new(
            schema,
            vec![Column::Int32(v.set_value_count(0).unwrap())],
        )
        .unwrap();

        let decoded = decode(&encode(&batch), &pool).unwrap();
        assert_eq!(decoded, batch);
        assert!(!decoded.schema().field(0).is_nullable());
    }

    #[test]
    fn every_truncation_is_rejected() {
        let pool = MemoryPool::default();
        let bytes = encode(&sample_batch(&pool));

        for cut in 0..bytes.len() {
            let err = decode(&bytes[..cut], &pool).unwrap_err();
            assert!(
                matches!(err, CodecError::MalformedStream(_)),
                "cut at {} gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let pool = MemoryPool::default();
        let mut bytes = encode(&sample_batch(&pool));
        bytes.push(0);
        assert!(matches!(
            decode(&bytes, &pool),
            Err(CodecError::MalformedStream(_))
        ));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let pool = MemoryPool::default();
        let mut bytes = encode(&sample_batch(&pool));
        bytes[0] = b'X';
        assert!(matches!(
            decode(&bytes, &pool),
            Err(CodecError::MalformedStream("bad magic"))
        ));
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let pool = MemoryPool::default();
        let bytes = encode(&sample_batch(&pool));

        // First field: MAGIC(4) FIELD_COUNT(4) NAME_LEN(4) "id"(2) TYPE_TAG.
        let tag_pos = 4 + 4 + 4 + 2;
        let mut bytes = bytes;
        bytes[tag_pos] = 9;
        assert!(matches!(
            decode(&bytes, &pool),
            Err(CodecError::MalformedStream("unknown type tag"))
        ));
    }

    #[test]
    fn overrunning_length_field_is_rejected() {
        let pool = MemoryPool::default();
        let mut bytes = encode(&sample_batch(&pool));

        // Inflate the first field's NAME_LEN far past the end of the input.
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode(&bytes, &pool),
            Err(CodecError::MalformedStream(_))
        ));
    }

    #[test]
    fn non_monotonic_offsets_are_rejected() {
        let pool = MemoryPool::default();
        let schema = Arc::new(Schema::new(vec![Field::nullable(
            "s",
            LogicalType::Utf8,
        )
        .unwrap()]));
        let mut v = Utf8Vector::allocate_new(&pool, 8, 2).unwrap();
        v.set(0, "ab").unwrap();
        v.set(1, "cd").unwrap();
        let batch = RecordBatch::try_new(
            schema,
            vec![Column::Utf8(v.set_value_count(2).unwrap())],
        )
        .unwrap();
        let mut bytes = encode(&batch);

        // Offsets live after MAGIC(4) FIELD_COUNT(4) FIELD(4+1+1+1) ROW_COUNT(4)
        // VALIDITY_LEN(4) VALIDITY(1) OFFSETS_LEN(4); offsets are [0, 2, 4].
        // Raising offsets[1] above the terminal offset breaks monotonicity.
        let offsets_start = 4 + 4 + (4 + 1 + 1 + 1) + 4 + 4 + 1 + 4;
        bytes[offsets_start + 4..offsets_start + 8].copy_from_slice(&5u32.to_le_bytes());

        assert!(matches!(
            decode(&bytes, &pool),
            Err(CodecError::MalformedStream("offsets not monotonic"))
        ));
    }

    #[test]
    fn invalid_utf8_payload_is_rejected() {
        let pool = MemoryPool::default();
        let schema = Arc::new(Schema::new(vec![Field::nullable(
            "s",
            LogicalType::Utf8,
        )
        .unwrap()]));
        let mut v = Utf8Vector::allocate_new(&pool, 8, 1).unwrap();
        v.set(0, "ab").unwrap();
        let batch = RecordBatch::try_new(
            schema,
            vec![Column::Utf8(v.set_value_count(1).unwrap())],
        )
        .unwrap();

        let mut bytes = encode(&batch);
        let len = bytes.len();
        bytes[len - 2] = 0xFF; // clobber string payload
        assert!(matches!(
            decode(&bytes, &pool),
            Err(CodecError::MalformedStream("invalid utf-8 in string data"))
        ));
    }
}
