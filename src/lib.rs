//! Columnar record batches with a native scalar-call boundary.
//!
//! Facade over the workspace crates:
//!
//! - [`batch_memory`]: pooled, aligned, zero-initialized buffers; all
//!   column memory comes from a [`MemoryPool`] and is released on drop.
//! - [`columnar_core`]: schema model, validity bitmaps, column builders,
//!   and validated immutable [`RecordBatch`]es.
//! - [`native_bridge`]: dynamic library loading with bind-time signature
//!   checks, scalar invocation, and by-reference batch export.
//! - [`stream_codec`]: the self-describing byte stream for moving a batch
//!   across the boundary.
//!
//! The flow: build a [`Schema`], fill vectors through a pool, finalize them
//! into a [`RecordBatch`], then either invoke a bound native scalar
//! directly, hand the batch over as [`export_batch`] descriptors, or
//! [`encode`] it for transfer.

pub use batch_memory::{Buffer, MemoryError, MemoryPool, PoolConfig};
pub use columnar_core::{
    Column, ColumnarError, Field, Int32Column, Int32Vector, LogicalType, RecordBatch, Schema,
    Utf8Column, Utf8Vector, ValidityBitmap,
};
pub use native_bridge::{
    export_batch, registry, BridgeError, ExportedBatch, ExportedColumn, NativeLibrary, ScalarFn,
    ScalarSignature, ScalarType,
};
pub use stream_codec::{decode, encode, CodecError, MAGIC};
