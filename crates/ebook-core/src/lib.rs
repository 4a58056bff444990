//! ebook-core: flujo reanudable de generación de eBooks.
//!
//! `WorkflowEngine` lleva un `WorkflowInstance` por la secuencia fija de
//! steps, llamando al `GenerationClient` inyectado en los steps generados y
//! persistiendo cada transición mediante un `WorkflowRepository`. Los
//! formatos de exportación se conectan vía `DocumentExporter`.

pub mod assembly;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod export;
pub mod generation;
pub mod hashing;
pub mod repo;
pub mod step;

pub use assembly::{assemble, AssemblyError};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineBuilder, StepState, WorkflowCtx, WorkflowEngine, WorkflowStatus};
pub use errors::{GenerationError, PersistenceError, WorkflowError};
pub use export::{DocumentExporter, ExportOutput, ExportedArtifact, PlainTextExporter};
pub use generation::{GenerationClient, GenerationParams, GenerationRequest, MockGenerationClient, MockReply,
                     RetryingClient};
pub use repo::{InMemoryWorkflowRepository, WorkflowRepository};
pub use step::{StepDefinition, StepKind, StepRegistry, StepStatus, StepValue};

pub use ebook_domain;
