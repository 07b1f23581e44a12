//! Batch → bytes.

use columnar_core::{Column, RecordBatch};
use tracing::debug;

use crate::MAGIC;

/// Serialize `batch` into a self-describing stream. Infallible: a
/// constructed batch always satisfies the layout invariants the stream
/// records.
pub fn encode(batch: &RecordBatch) -> Vec<u8> {
    let mut out = Vec::with_capacity(64 + estimated_body(batch));
    out.extend_from_slice(&MAGIC);

    let schema = batch.schema();
    put_u32(&mut out, schema.num_fields() as u32);
    for field in schema.fields() {
        put_u32(&mut out, field.name().len() as u32);
        out.extend_from_slice(field.name().as_bytes());
        out.push(field.data_type().type_tag());
        out.push(field.is_nullable() as u8);
    }

    put_u32(&mut out, batch.row_count() as u32);
    for column in batch.columns() {
        match column {
            Column::Int32(c) => {
                put_block(&mut out, c.validity().as_bytes());
                put_block(&mut out, c.values_bytes());
            }
            Column::Utf8(c) => {
                put_block(&mut out, c.validity().as_bytes());
                put_u32(&mut out, (c.offsets().len() * 4) as u32);
                for offset in c.offsets() {
                    put_u32(&mut out, *offset);
                }
                put_block(&mut out, c.data());
            }
        }
    }

    debug!(
        rows = batch.row_count(),
        columns = batch.num_columns(),
        bytes = out.len(),
        "encoded batch"
    );
    out
}

fn estimated_body(batch: &RecordBatch) -> usize {
    batch
        .columns()
        .iter()
        .map(|c| match c {
            Column::Int32(c) => c.values_bytes().len() + c.validity().as_bytes().len(),
            Column::Utf8(c) => {
                c.data().len() + c.offsets().len() * 4 + c.validity().as_bytes().len()
            }
        })
        .sum()
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_block(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}
