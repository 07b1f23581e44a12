//! Loading libraries and binding scalar symbols.
//!
//! State machine: `Unloaded -> Loaded (NativeLibrary) -> Bound (ScalarFn)
//! -> (Invoking)*`. Load and bind failures are fatal startup errors; a bound
//! function can always be invoked.

use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use tracing::{debug, info};

use crate::error::BridgeError;
use crate::signature::{sig_symbol_name, ScalarSignature};

/// A loaded native library. Never unloaded while any binding into it lives.
#[derive(Debug)]
pub struct NativeLibrary {
    library: Library,
    name: String,
}

impl NativeLibrary {
    /// Resolve `name` as a platform logical library name (`name` →
    /// `libname.so` / `name.dll` / `libname.dylib`) and map it into the
    /// process.
    pub fn load(name: &str) -> Result<Self, BridgeError> {
        info!(library = name, "loading native library");
        let filename = libloading::library_filename(name);
        // Loading executes the library's initializers; the caller vouches
        // for the artifact.
        let library = unsafe { Library::new(filename) }.map_err(|source| {
            BridgeError::LibraryNotFound {
                name: name.to_string(),
                source,
            }
        })?;
        Ok(Self {
            library,
            name: name.to_string(),
        })
    }

    /// Map the library at an explicit path.
    pub fn load_path(path: &Path) -> Result<Self, BridgeError> {
        let name = path.display().to_string();
        info!(library = %name, "loading native library from path");
        let library =
            unsafe { Library::new(path) }.map_err(|source| BridgeError::LibraryNotFound {
                name: name.clone(),
                source,
            })?;
        Ok(Self { library, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `symbol` as `(i32) -> i32`.
    ///
    /// Resolves the function export and its `<symbol>_sig` descriptor; a
    /// missing export of either kind is `SymbolResolution`, a descriptor
    /// declaring different widths is `SignatureMismatch`. The check happens
    /// here so an invocation can never hit a mismatched symbol.
    pub fn bind_i32_unary(self: &Arc<Self>, symbol: &str) -> Result<ScalarFn, BridgeError> {
        let expected = ScalarSignature::unary_i32();
        let declared = self.read_declared_signature(symbol)?;
        if declared != expected {
            return Err(BridgeError::SignatureMismatch {
                symbol: symbol.to_string(),
                expected,
                declared,
            });
        }

        let f = {
            let sym: Symbol<unsafe extern "C" fn(i32) -> i32> =
                unsafe { self.library.get(symbol.as_bytes()) }.map_err(|_| {
                    BridgeError::SymbolResolution {
                        symbol: symbol.to_string(),
                        library: self.name.clone(),
                    }
                })?;
            *sym
        };

        debug!(library = %self.name, symbol, %declared, "bound scalar symbol");
        Ok(ScalarFn {
            _library: Arc::clone(self),
            f,
        })
    }

    fn read_declared_signature(&self, symbol: &str) -> Result<ScalarSignature, BridgeError> {
        let sidecar = sig_symbol_name(symbol);
        let word = {
            let sym: Symbol<*const u64> =
                unsafe { self.library.get(sidecar.as_bytes()) }.map_err(|_| {
                    BridgeError::SymbolResolution {
                        symbol: sidecar.clone(),
                        library: self.name.clone(),
                    }
                })?;
            // The descriptor is a plain u64 static exported by the library.
            unsafe { (*sym).read() }
        };
        ScalarSignature::from_word(word).ok_or(BridgeError::MalformedDescriptor {
            symbol: symbol.to_string(),
            word,
        })
    }
}

/// A bound `(i32) -> i32` symbol. Holds the library alive.
#[derive(Debug)]
pub struct ScalarFn {
    _library: Arc<NativeLibrary>,
    f: unsafe extern "C" fn(i32) -> i32,
}

impl ScalarFn {
    /// Invoke synchronously on the calling thread. The call runs to
    /// completion; there is no cancellation or timeout.
    pub fn invoke(&self, arg: i32) -> i32 {
        // Widths were checked at bind time against the declared signature.
        unsafe { (self.f)(arg) }
    }
}
