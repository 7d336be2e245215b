//! Stencil Runtime
//!
//! Commander/worker execution fabric: a toroidal process mesh of tokio
//! tasks standing in for MPI worker processes, each owning one grid tile
//! plus its ghost halo, commanded through broadcast/scatter/gather-style
//! calls from a single [`Commander`].

pub mod commander;
pub mod custom_func;
pub mod error;
pub mod halo;
pub mod message;
pub mod task;
pub mod topology;
pub mod variable;
pub mod worker;

pub use commander::Commander;
pub use custom_func::{CustomFn, CustomFuncRegistry};
pub use error::{Result, RuntimeError};
pub use task::{BuiltinFn, BuiltinMethod, FuncRef, ResultVar, TaskArg, TaskDescriptor, TaskOutput};
pub use variable::VarKey;
pub use worker::Worker;
