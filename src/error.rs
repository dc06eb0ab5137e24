//! Error taxonomy for the translation database engine.
//!
//! Extraction problems (a single unparseable source file, a missing catalog
//! toolchain) are deliberately *not* represented here: they are logged and
//! skipped so a scan always runs to completion.

use std::path::PathBuf;

use thiserror::Error;

use crate::msgfmt::MessageSyntaxError;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A mutating operation was rejected before any state change.
    #[error("{0}")]
    Validation(String),

    /// A backing file could not be read or written. Write failures always
    /// propagate: silently losing translations is unacceptable.
    #[error("failed to {op} {path}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A backing file exists but does not hold the expected JSON shape.
    #[error("malformed JSON in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The on-disk database was written by an unknown schema version and no
    /// migration path exists. Fatal at startup.
    #[error("database version {found} has no migration path (this build supports version {supported})")]
    Migration { found: u32, supported: u32 },

    /// A translation failed to compile into a message formatter. The stored
    /// keys and translations are untouched; only derived outputs are stale.
    #[error("failed to compile translations for language {lang:?}")]
    Compilation {
        lang: String,
        #[source]
        source: MessageSyntaxError,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            op: "read",
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            op: "write",
            path: path.into(),
            source,
        }
    }
}
