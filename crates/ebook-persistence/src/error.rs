//! Fallos del sistema de ficheros y su traducción a `PersistenceError`.

use std::io;
use std::path::PathBuf;

use ebook_core::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unreadable record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {path} has schema version {found}, newer than supported {supported}")]
    UnsupportedSchema { path: PathBuf, found: u32, supported: u32 },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io { path: path.into(),
                         source }
    }

    /// Fallos que merecen otro intento.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Io { source, .. } => matches!(source.kind(),
                                                      io::ErrorKind::Interrupted
                                                      | io::ErrorKind::WouldBlock
                                                      | io::ErrorKind::TimedOut),
            _ => false,
        }
    }
}

impl From<StoreError> for PersistenceError {
    fn from(err: StoreError) -> Self {
        match err {
            e @ StoreError::Io { .. } => Self::Io(e.to_string()),
            e @ (StoreError::Corrupt { .. } | StoreError::UnsupportedSchema { .. }) => Self::Serialization(e.to_string()),
        }
    }
}
