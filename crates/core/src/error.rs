//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Storage
/// backends report their own failures and the service layer folds both.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A write used an identifier that already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A read, edit or view referenced a nonexistent identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input was rejected before anything was persisted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    pub fn duplicate_key(kind: &str, id: impl core::fmt::Display) -> Self {
        Self::DuplicateKey(format!("{kind} '{id}'"))
    }

    pub fn not_found(kind: &str, id: impl core::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} '{id}'"))
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
