//! Builder de `WorkflowEngine`.
//!
//! El repositorio y el cliente de generación son obligatorios. El registro
//! de steps por defecto es `StepRegistry::standard` construido desde la
//! config; sin exportador toda exportación falla con `ExporterMissing`.
//!
//! ```ignore
//! let engine = WorkflowEngine::builder(repo, Arc::new(client))
//!     .config(EngineConfig::from_env()?)
//!     .exporter(PdfExporter::default())
//!     .build();
//! ```

use std::sync::Arc;

use super::core::WorkflowEngine;
use crate::config::EngineConfig;
use crate::export::DocumentExporter;
use crate::generation::GenerationClient;
use crate::repo::WorkflowRepository;
use crate::step::StepRegistry;

pub struct EngineBuilder<R: WorkflowRepository> {
    repository: R,
    client: Arc<dyn GenerationClient>,
    registry: Option<StepRegistry>,
    exporter: Option<Box<dyn DocumentExporter>>,
    config: EngineConfig,
}

impl<R: WorkflowRepository> EngineBuilder<R> {
    pub fn new(repository: R, client: Arc<dyn GenerationClient>) -> Self {
        Self { repository,
               client,
               registry: None,
               exporter: None,
               config: EngineConfig::default() }
    }

    /// También fija modelos y parámetros del registro por defecto: hay que
    /// llamarlo antes de que `build` cree el registro.
    #[inline]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn registry(mut self, registry: StepRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[inline]
    pub fn exporter<X>(mut self, exporter: X) -> Self
        where X: DocumentExporter + 'static
    {
        self.exporter = Some(Box::new(exporter));
        self
    }

    pub fn build(self) -> WorkflowEngine<R> {
        let registry = self.registry
                           .unwrap_or_else(|| StepRegistry::standard(&self.config));
        WorkflowEngine::from_parts(self.repository, self.client, registry, self.exporter, self.config)
    }
}
