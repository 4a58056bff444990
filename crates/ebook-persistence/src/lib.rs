//! ebook-persistence
//!
//! `WorkflowRepository` duradero sobre un directorio de documentos JSON.
//!
//! Módulos:
//! - `file`: `JsonFileRepository`, escritura atómica con rename por instancia.
//! - `config`: directorio del store y reintentos desde el entorno.
//! - `error`: fallos del sistema de ficheros traducidos a `PersistenceError`.

pub mod config;
pub mod error;
pub mod file;

pub use config::StoreConfig;
pub use error::StoreError;
pub use file::JsonFileRepository;
