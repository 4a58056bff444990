//! ebookflow
//!
//! Fachada sobre los crates del workspace:
//! - `ebook_domain`: registro del flujo, steps, capítulos y versiones.
//! - `ebook_core`: el motor, los traits de sus colaboradores y el registro de steps.
//! - `ebook_export`: paginación y salida PDF.
//! - `ebook_persistence`: store de ficheros JSON.
//!
//! `default_engine` monta la configuración habitual de producción desde el entorno.

use std::sync::Arc;

use thiserror::Error;

pub use ebook_core::{self as engine, assemble, ConfigError, DocumentExporter, EngineConfig, ExportedArtifact,
                     GenerationClient, GenerationError, GenerationParams, GenerationRequest, PersistenceError,
                     RetryingClient, StepValue, WorkflowCtx, WorkflowEngine, WorkflowError, WorkflowRepository,
                     WorkflowStatus};
pub use ebook_domain::{self as domain, StepId, WorkflowInstance};
pub use ebook_export::{self as export, PageConfig, Paginator, PdfExporter};
pub use ebook_persistence::{self as persistence, JsonFileRepository, StoreConfig};

pub type DefaultEngine = WorkflowEngine<JsonFileRepository>;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("store: {0}")]
    Store(#[from] PersistenceError),
}

/// Motor sobre un `JsonFileRepository`, con `client` envuelto en un
/// `RetryingClient` y exportación PDF. Lee las variables `EBOOK_*` (y `.env`).
pub fn default_engine<C>(client: C) -> Result<DefaultEngine, SetupError>
    where C: GenerationClient + 'static
{
    let config = EngineConfig::from_env()?;
    let store = JsonFileRepository::open(StoreConfig::from_env()?)?;
    Ok(engine_with(store, client, config))
}

/// El mismo montaje que `default_engine` con las piezas explícitas.
pub fn engine_with<C>(store: JsonFileRepository, client: C, config: EngineConfig) -> DefaultEngine
    where C: GenerationClient + 'static
{
    log::info!("ebookflow:engine store={} model={}", store.dir().display(), config.default_model);
    let client = Arc::new(RetryingClient::from_config(client, &config));
    WorkflowEngine::builder(store, client).config(config)
                                          .exporter(PdfExporter::default())
                                          .build()
}
