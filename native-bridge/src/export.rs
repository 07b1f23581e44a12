//! Exporting a record batch across the boundary by reference.
//!
//! The batch's buffers are rendered as C-compatible pointer descriptors; no
//! bytes are copied. The native side shares but never owns the memory: the
//! descriptors borrow the batch, so they cannot outlive the buffers they
//! point into, and the caller must keep the batch (and its pool) alive for
//! the duration of every native call that uses them.

use std::marker::PhantomData;

use columnar_core::{Column, RecordBatch};

/// One column as seen from compiled foreign code.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExportedColumn {
    /// Value bytes: `i32` slots for Int32, the shared string bytes for Utf8.
    pub data: *const u8,
    /// Packed validity bitmap, one bit per row, 1 = non-null.
    pub validity: *const u8,
    /// `len + 1` byte offsets for Utf8; null for fixed-width columns.
    pub offsets: *const u32,
    pub len: u64,
    pub null_count: u64,
    /// 0 = Int32, 1 = Utf8.
    pub type_tag: u8,
}

/// A batch flattened to per-column descriptors, borrowing the batch.
pub struct ExportedBatch<'a> {
    columns: Vec<ExportedColumn>,
    row_count: u64,
    _batch: PhantomData<&'a RecordBatch>,
}

impl ExportedBatch<'_> {
    pub fn columns(&self) -> &[ExportedColumn] {
        &self.columns
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }
}

/// Render `batch` as exported descriptors without copying any data.
pub fn export_batch(batch: &RecordBatch) -> ExportedBatch<'_> {
    let columns = batch
        .columns()
        .iter()
        .map(|column| match column {
            Column::Int32(c) => ExportedColumn {
                data: c.values_bytes().as_ptr(),
                validity: c.validity().as_ptr(),
                offsets: std::ptr::null(),
                len: c.len() as u64,
                null_count: c.null_count() as u64,
                type_tag: column.data_type().type_tag(),
            },
            Column::Utf8(c) => ExportedColumn {
                data: c.data().as_ptr(),
                validity: c.validity().as_ptr(),
                offsets: c.offsets().as_ptr(),
                len: c.len() as u64,
                null_count: c.null_count() as u64,
                type_tag: column.data_type().type_tag(),
            },
        })
        .collect();

    ExportedBatch {
        columns,
        row_count: batch.row_count() as u64,
        _batch: PhantomData,
    }
}
