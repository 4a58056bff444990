use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    ValidationError(String),
    #[error("document is incomplete, missing: {}", .0.join(", "))]
    IncompleteDocument(Vec<String>),
}
