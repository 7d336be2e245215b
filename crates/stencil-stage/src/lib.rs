//! Stencil Stage
//!
//! Partition-graph construction, the external-partitioner wire protocol,
//! and the atomic-stage compiler that turns a symbolic DAG closure into a
//! sequence of reinvocable stages.

pub mod atomic_stage;
pub mod decompose;
pub mod error;
pub mod partition_graph;
pub mod partitioner;
pub mod wire;

pub use atomic_stage::{AtomicStage, TributaryResolver};
pub use decompose::decompose;
pub use error::{DecompositionError, Result};
pub use partition_graph::PartitionGraph;
pub use partitioner::{ExternalPartitioner, GreedyPartitioner, Partitioner};
pub use wire::{decode_partition_result, encode_wire_format, PartitionAssignment};
