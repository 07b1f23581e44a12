//! Demo: load a native library, bind its increment symbol, and invoke it.
//!
//! Run with:  `cargo run --example native_call -- <path-to-library>`
//!
//! The `native-demo` cdylib built by this workspace is a suitable target:
//! `target/debug/libnative_demo.so` (platform naming varies).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use columnar_bridge::NativeLibrary;
use tracing::{info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: native_call <path-to-library>");
    };

    let library = Arc::new(NativeLibrary::load_path(&path)?);
    info!(library = library.name(), "loaded");

    let f = library.bind_i32_unary("increment_i32")?;
    let result = f.invoke(42);
    info!("increment_i32(42) = {result}");

    Ok(())
}
