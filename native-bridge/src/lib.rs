//! Native call bridge: load a compiled library, bind a scalar symbol with a
//! checked signature, invoke it, and export record batches by reference.
//!
//! A dynamic symbol carries no type metadata, so conforming libraries export
//! a sidecar descriptor next to each callable symbol:
//!
//! ```text
//! #[no_mangle] pub extern "C" fn add_one(x: i32) -> i32 { x + 1 }
//! #[no_mangle] pub static add_one_sig: u64 = encode_unary(ScalarType::I32, ScalarType::I32);
//! ```
//!
//! [`NativeLibrary::bind_i32_unary`] reads the descriptor and refuses a
//! mismatched signature at bind time; an invocation can never reach a symbol
//! whose declared widths differ from the caller's expectation.

pub mod error;
pub mod export;
pub mod library;
pub mod registry;
pub mod signature;

pub use error::BridgeError;
pub use export::{export_batch, ExportedBatch, ExportedColumn};
pub use library::{NativeLibrary, ScalarFn};
pub use signature::{encode_unary, sig_symbol_name, ScalarSignature, ScalarType};
