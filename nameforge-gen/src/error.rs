//! Error types for the generation pipeline
//!
//! Provider and resolution errors live next to their modules
//! (`providers::ProviderError`, `fallback::ResolveError`); this module holds
//! the errors that reach the orchestrator's callers and the pattern layer.

use thiserror::Error;

/// Errors surfaced to callers of the orchestrator
///
/// Everything below a malformed request is absorbed inside the pipeline and
/// turns into degraded output, so this enum stays small.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Malformed request, rejected before entering the pipeline
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// nameforge-common error
    #[error("Common error: {0}")]
    Common(#[from] nameforge_common::Error),
}

/// Pattern instantiation failures (recovered by the orchestrator)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("Word pool '{0}' is empty")]
    EmptyPool(&'static str),

    #[error("No pattern supports {0} words")]
    NoPatternForCount(usize),

    #[error("Template '{0}' is malformed")]
    MalformedTemplate(String),

    #[error("Generated '{name}' has {actual} words, expected {expected}")]
    WordCountMismatch {
        name: String,
        actual: usize,
        expected: usize,
    },
}
