//! Stencil Core
//!
//! Symbolic DAG value/operation model, DAG discovery, and topological sort
//! for the distributed stencil execution engine. This crate has minimal
//! dependencies and defines the shared vocabulary used by `stencil-stage`
//! and `stencil-runtime`.

pub mod builtins;
pub mod discover;
pub mod error;
pub mod tile;
pub mod value;

pub use builtins::BuiltinSources;
pub use discover::{discover, topo_sort, Discovery};
pub use error::{GraphError, Result};
pub use tile::{leading_dims, Tile};
pub use value::{Operand, Operation, Value};
