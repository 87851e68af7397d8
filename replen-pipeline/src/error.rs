//! Pipeline error types.
//!
//! Provider failures are scoped to a single SKU and retryable; the run
//! as a whole only fails on cancellation, so a batch always ends in
//! either a full ranked list plus an explicit failed list, or an error.

use thiserror::Error;

/// A collaborator lookup failed for one SKU.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("lookup timed out after {waited_ms} ms")]
    Timeout { waited_ms: u64 },

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Batch-level failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("run cancelled before all SKUs were computed; partial results withheld")]
    Cancelled,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;
