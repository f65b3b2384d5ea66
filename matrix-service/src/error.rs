// Service error types
// Errors surfaced by matrix fan-out callers, config loading and parsing

use crate::parser::error::{ParseError, ValidationError};

use std::io;
use thiserror::Error;

/// Errors that can occur around matrix fan-out
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("task '{task}' has {count} matrix combinations, more than the maximum of {max}")]
    TooManyCombinations {
        task: String,
        count: usize,
        max: usize,
    },

    #[error("{} validation error(s), first: {}", .0.len(), first_message(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
}

fn first_message(errors: &[ValidationError]) -> String {
    errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Result type for matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;
