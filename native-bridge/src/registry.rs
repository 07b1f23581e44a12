//! Process-wide library registry: each logical name is resolved at most
//! once per process and never reloaded; libraries are torn down only at
//! process exit.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::error::BridgeError;
use crate::library::NativeLibrary;

static LOADED: Lazy<DashMap<String, Arc<NativeLibrary>>> = Lazy::new(DashMap::new);

/// Load `name` on first use and return the cached handle afterwards.
pub fn load_once(name: &str) -> Result<Arc<NativeLibrary>, BridgeError> {
    match LOADED.entry(name.to_string()) {
        Entry::Occupied(entry) => Ok(entry.get().clone()),
        Entry::Vacant(entry) => {
            let library = Arc::new(NativeLibrary::load(name)?);
            entry.insert(library.clone());
            Ok(library)
        }
    }
}

/// Logical names of the libraries loaded so far.
pub fn loaded_libraries() -> Vec<String> {
    LOADED.iter().map(|entry| entry.key().clone()).collect()
}
