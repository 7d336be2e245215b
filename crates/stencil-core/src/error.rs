//! Error types for the symbolic DAG layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cycle detected while sorting values: {0} value(s) never became computable")]
    Cycle(usize),

    #[error("value referenced as an input was not reachable from any sink: {0}")]
    UnreachableInput(String),

    #[error("shape mismatch evaluating {value}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        value: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("operation failed while evaluating {value}: {cause}")]
    OperationFailed { value: String, cause: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
