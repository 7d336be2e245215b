//! Named custom functions a worker can invoke (spec §5.E, ported from
//! `MPI_Worker.set_custom_func`/`.custom_funcs`).
//!
//! The original ships closures to workers with `dill`, pickled bytes that
//! are unpickled in the worker process. Workers here are tokio tasks in
//! the same process as the commander, so the closure itself is shared via
//! `Arc` instead of being serialized.

use crate::error::{Result, RuntimeError};
use crate::task::TaskOutput;
use stencil_core::Tile;
use std::collections::HashMap;
use std::sync::Arc;

/// A function registered by name, taking the substituted argument tiles
/// and producing a task output.
pub type CustomFn = Arc<dyn Fn(&[Tile]) -> Result<TaskOutput> + Send + Sync>;

/// Per-worker table of custom functions, populated by
/// `Commander::set_custom_func` and consulted by `FuncRef::Named` tasks.
#[derive(Clone, Default)]
pub struct CustomFuncRegistry {
    funcs: HashMap<String, CustomFn>,
}

impl CustomFuncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, func: CustomFn) {
        self.funcs.insert(name.into(), func);
    }

    pub fn invoke(&self, name: &str, args: &[Tile]) -> Result<TaskOutput> {
        let func = self
            .funcs
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?;
        func(args)
    }
}

impl std::fmt::Debug for CustomFuncRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomFuncRegistry")
            .field("names", &self.funcs.keys().collect::<Vec<_>>())
            .finish()
    }
}
