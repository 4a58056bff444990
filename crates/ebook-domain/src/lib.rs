// Punto de entrada de la librería ebook-domain
pub mod chapter;
pub mod document;
pub mod error;
pub mod event;
pub mod step_id;
pub mod toc;
pub mod version;
pub mod workflow;

pub use chapter::{chapters_match_toc, Chapter, ChapterMetadata, ContentSource};
pub use document::{DocumentChapter, DocumentModel};
pub use error::DomainError;
pub use event::{WorkflowEvent, WorkflowEventKind};
pub use step_id::StepId;
pub use toc::{ChapterOutline, TableOfContents};
pub use version::Version;
pub use workflow::{StepOutputs, WorkflowInstance, INSTANCE_SCHEMA_VERSION};
