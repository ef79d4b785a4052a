use std::path::PathBuf;

use thiserror::Error;

/// Input problems caught before any upload or network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("'{field}' is required and cannot be empty")]
    Required { field: &'static str },

    /// A string exceeded its character limit.
    #[error("'{field}' is {len} characters long, maximum is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A numeric value fell outside its declared closed interval.
    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Two fields that may not be combined were both supplied.
    #[error("{first} and {second} cannot be used at the same time")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    /// Neither of two alternative fields was supplied.
    #[error("Either {first} or {second} is required")]
    MissingOneOf {
        first: &'static str,
        second: &'static str,
    },
}

/// Errors returned by Meshy node operations.
#[derive(Error, Debug)]
pub enum MeshyError {
    /// Inputs failed validation; nothing was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The API returned a non-success HTTP status.
    #[error("Meshy API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// The response was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// The task reached a failed terminal status.
    #[error("Meshy task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// Timed out waiting for the task to reach a terminal status.
    #[error("Timed out waiting for Meshy task {task_id}")]
    Timeout { task_id: String },

    /// The caller cancelled the operation.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Writing a downloaded artifact failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshyError {
    /// True for errors the user can fix by changing node inputs.
    pub fn is_validation(&self) -> bool {
        matches!(self, MeshyError::Validation(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MeshyError>;
