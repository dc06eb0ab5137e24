//! Persisted key/translation stores.
//!
//! Both stores are write-through: every mutation rewrites the backing file
//! before returning. Maps are insertion-ordered ([`indexmap::IndexMap`]) and
//! files are written with key order preserved, so iteration order — and with
//! it compilation output — is reproducible across restarts.

mod keys;
mod translations;

pub use keys::{KEYS_FILE_NAME, KeyMap, KeyStore, ReconcileReport};
pub use translations::{TranslationMap, TranslationStore};

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{EngineError, Result};

/// Read a JSON file into a deserializable value.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| EngineError::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| EngineError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a value as pretty-printed JSON with a trailing newline.
pub(crate) fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    debug!(path = %path.display(), "writing file");
    let content = serde_json::to_string_pretty(value).map_err(|e| EngineError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, format!("{content}\n")).map_err(|e| EngineError::write(path, e))
}
