//! Error types for stage decomposition.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecompositionError {
    #[error("graph error during decomposition: {0}")]
    Graph(#[from] stencil_core::GraphError),

    #[error("partitioner exited with error: {0}")]
    PartitionerFailed(String),

    #[error("partitioner produced malformed output: {0}")]
    MalformedOutput(String),

    #[error("partitioner could not be launched: {0}")]
    Launch(String),

    #[error("decomposition produced an empty stage set for {sinks} non-empty sink(s)")]
    EmptyStageSet { sinks: usize },

    #[error("stage invoked with {got} source tile(s), expected {expected}")]
    SourceArity { expected: usize, got: usize },

    #[error("no tile bound for value: {0}")]
    UnboundValue(String),
}

pub type Result<T> = std::result::Result<T, DecompositionError>;
