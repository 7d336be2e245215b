//! Error types for the execution fabric.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("tile shape {got:?} incompatible with worker tile {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("unknown worker variable: {0:?}")]
    UnknownVariable(crate::variable::VarKey),

    #[error("unknown custom function: {0}")]
    UnknownFunction(String),

    #[error("unknown built-in method: {0}")]
    UnknownMethod(String),

    #[error("worker does not support method: {0}")]
    UnsupportedMethod(String),

    #[error("task result shape mismatch: expected {expected} output(s), got {got}")]
    ResultArity { expected: usize, got: usize },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("graph evaluation error: {0}")]
    Graph(#[from] stencil_core::GraphError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
