use thiserror::Error;

use crate::signature::ScalarSignature;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("native library '{name}' not found: {source}")]
    LibraryNotFound {
        name: String,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol '{symbol}' missing from library '{library}'")]
    SymbolResolution { symbol: String, library: String },

    #[error("signature mismatch for '{symbol}': expected {expected}, library declares {declared}")]
    SignatureMismatch {
        symbol: String,
        expected: ScalarSignature,
        declared: ScalarSignature,
    },

    #[error("malformed signature descriptor for '{symbol}': {word:#018x}")]
    MalformedDescriptor { symbol: String, word: u64 },
}
