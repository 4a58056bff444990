//! Taxonomía de errores del motor y de los contratos de sus colaboradores.

use ebook_domain::{DomainError, StepId};
use thiserror::Error;
use uuid::Uuid;

/// Fallo informado por un `GenerationClient`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation timed out after {0} ms")]
    Timeout(u64),
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
    #[error("generation rejected: {0}")]
    Rejected(String),
    #[error("generation returned an empty response")]
    EmptyResponse,
}

impl GenerationError {
    /// Timeouts y caídas pueden funcionar en un intento posterior; los rechazos no.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Timeout(_) | GenerationError::Unavailable(_))
    }
}

/// Fallo informado por un `WorkflowRepository`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("workflow {0} not found")]
    NotFound(Uuid),
    #[error("revision conflict on workflow {id}: stored {stored}, attempted {attempted}")]
    Conflict { id: Uuid, stored: u64, attempted: u64 },
    #[error("transient IO error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unknown persistence error: {0}")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("prerequisite not met: {0}")]
    PrerequisiteNotMet(String),
    #[error("validation failed for {step}: {reason}")]
    ValidationFailed { step: StepId, reason: String },
    #[error("{step} generation unavailable: {source}")]
    GenerationUnavailable {
        step: StepId,
        #[source]
        source: GenerationError,
    },
    #[error("a generation is already in progress for workflow {0}")]
    ConcurrentGenerationInProgress(Uuid),
    #[error("{0}")]
    IncompleteDocument(DomainError),
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] PersistenceError),
    #[error("no document exporter configured")]
    ExporterMissing,
}

impl WorkflowError {
    pub(crate) fn validation(step: StepId, reason: impl Into<String>) -> Self {
        WorkflowError::ValidationFailed { step,
                                          reason: reason.into() }
    }

    /// Reintentar la misma llamada más tarde puede funcionar.
    pub fn is_recoverable(&self) -> bool {
        matches!(self,
                 WorkflowError::GenerationUnavailable { .. } | WorkflowError::ConcurrentGenerationInProgress(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_human_readable() {
        let e = WorkflowError::validation(StepId::Title, "title is empty");
        assert_eq!(e.to_string(), "validation failed for TITLE: title is empty");

        let e = WorkflowError::GenerationUnavailable { step: StepId::Toc,
                                                       source: GenerationError::Timeout(1500) };
        assert_eq!(e.to_string(), "TOC generation unavailable: generation timed out after 1500 ms");
        assert!(e.is_recoverable());

        let e = WorkflowError::IncompleteDocument(DomainError::IncompleteDocument(vec!["conclusion".into()]));
        assert_eq!(e.to_string(), "document is incomplete, missing: conclusion");
    }

    #[test]
    fn only_transient_generation_errors_retry() {
        assert!(GenerationError::Timeout(1).is_retryable());
        assert!(GenerationError::Unavailable("503".into()).is_retryable());
        assert!(!GenerationError::Rejected("policy".into()).is_retryable());
        assert!(!GenerationError::EmptyResponse.is_retryable());
    }
}
