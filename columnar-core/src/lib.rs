//! Typed, nullable columns in a self-describing in-memory layout.
//!
//! # Layout contract
//!
//! Each column carries a packed validity bitmap (one bit per row, LSB-first,
//! 1 = non-null) plus its data buffers:
//!
//! ```text
//! Int32:  [ validity bits ]  [ v[0] | v[1] | ... | v[n-1] ]        (i32, LE)
//! Utf8:   [ validity bits ]  [ o[0] | ... | o[n] ]  [ data bytes ] (u32 offsets)
//! ```
//!
//! Utf8 offsets are non-decreasing with `o[0] == 0` and `o[n] == data.len()`;
//! a null entry has `o[i] == o[i+1]`. All buffers come from a
//! [`batch_memory::MemoryPool`].
//!
//! Columns are built through mutable vectors ([`Int32Vector`],
//! [`Utf8Vector`]); finalizing with `set_value_count` consumes the vector and
//! yields an immutable column, so nothing can write to a finalized column.

pub mod bitmap;
pub mod error;
pub mod record_batch;
pub mod schema;
pub mod vector;

pub use bitmap::ValidityBitmap;
pub use error::ColumnarError;
pub use record_batch::RecordBatch;
pub use schema::{Field, LogicalType, Schema};
pub use vector::{Column, Int32Column, Int32Vector, Utf8Column, Utf8Vector};
