//! Error types for the stratified generation pipeline.

use thiserror::Error;

/// Planning errors. All of them are raised before any batch is dispatched.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("Invalid weights for axis '{axis}': {reason}")]
    InvalidWeights { axis: String, reason: String },

    #[error(
        "Axis '{axis}' scope '{scope}': pool length {length} is smaller than its {values} legal values"
    )]
    PoolTooShort {
        axis: String,
        scope: String,
        length: usize,
        values: usize,
    },

    #[error("Axis '{axis}' scope '{scope}': pool exhausted at offset {offset} (needed {needed})")]
    PoolExhausted {
        axis: String,
        scope: String,
        offset: usize,
        needed: usize,
    },

    #[error(
        "Axis '{axis}' value '{value}' in scope '{scope}': observed {observed} times, required at least {required}"
    )]
    FloorViolated {
        axis: String,
        scope: String,
        value: String,
        observed: usize,
        required: usize,
    },

    #[error("Axis '{axis}' value '{value}' is not legal at {primary_axis} '{primary_value}'")]
    AffinityViolated {
        axis: String,
        value: String,
        primary_axis: String,
        primary_value: String,
    },

    #[error("Plan total mismatch: expected {expected}, got {actual}")]
    TotalMismatch { expected: usize, actual: usize },

    #[error(
        "Duplicate tuple persists in cell {cell} at index {index} after {attempts} resolution attempts"
    )]
    DuplicateResolutionExhausted {
        cell: usize,
        index: usize,
        attempts: usize,
    },
}

/// Crate-wide errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Planning failed: {0}")]
    Planning(#[from] PlanError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("Batch {batch} failed on attempt {attempt}: {message}")]
    BatchFailed {
        batch: String,
        attempt: usize,
        message: String,
    },

    #[error("Assembly failed: {0}")]
    AssemblyError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::OutputError(err.to_string())
    }
}
