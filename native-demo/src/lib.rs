//! Reference native library for exercising the call bridge.
//!
//! Built as a `cdylib`; each callable export carries the `<symbol>_sig`
//! descriptor the bridge checks at bind time.

#![allow(non_upper_case_globals)]

use native_bridge::{encode_unary, ScalarType};

/// Adds one to its argument.
#[no_mangle]
pub extern "C" fn increment_i32(arg: i32) -> i32 {
    arg + 1
}

#[no_mangle]
pub static increment_i32_sig: u64 = encode_unary(ScalarType::I32, ScalarType::I32);

/// Deliberately mis-described: the sidecar declares 8-byte widths, so
/// binding this as `(i32) -> i32` must fail at bind time.
#[no_mangle]
pub extern "C" fn broken_negate_i32(arg: i32) -> i32 {
    -arg
}

#[no_mangle]
pub static broken_negate_i32_sig: u64 = encode_unary(ScalarType::I64, ScalarType::I64);

/// Callable export with no sidecar descriptor at all; binding must fail
/// with a symbol-resolution error rather than guessing widths.
#[no_mangle]
pub extern "C" fn undescribed_i32(arg: i32) -> i32 {
    arg
}
