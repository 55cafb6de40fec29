// Error types shared across the crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors from the ammonia-production formula. Fatal to the invocation.
#[derive(Debug, Error)]
pub enum ComputationError {
    #[error("temperature range is empty")]
    EmptyRange,

    #[error("temperature sample {0} is not finite")]
    NonFiniteTemperature(f32),
}

/// Errors from tabular data ingestion. Fatal to the invocation.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} line {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{0:?} is empty")]
    EmptyFile(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors from a predictor. Handled fail-safe at the step boundary:
/// the prior field is retained and the loop continues.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("predicted field shape {got:?} does not match grid {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("predicted field contains non-finite values")]
    NonFinite,

    #[error("failed to load predictor weights from {path:?}: {reason}")]
    WeightLoad { path: PathBuf, reason: String },
}

/// Errors from the display surface.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to create window: {0}")]
    Surface(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}
