//! Task descriptors exchanged between commander and workers (spec §5.E,
//! ported from `MPI_Worker.func`/`.method` and their `next_task_list`
//! wire shape).
//!
//! The original splits a call's positional/keyword arguments and has a
//! `_substitute_kwargs` bug (spec §9) that substitutes worker variables
//! into the wrong dict. This port collapses both into a single ordered
//! argument list, which sidesteps the bug instead of reproducing it.

use crate::variable::VarKey;
use stencil_core::Tile;

/// One task argument: either a raw tile, a scalar, or a reference to a
/// value already held in the worker's variable table.
#[derive(Debug, Clone)]
pub enum TaskArg {
    Tile(Tile),
    Scalar(f64),
    Var(VarKey),
}

impl From<VarKey> for TaskArg {
    fn from(key: VarKey) -> Self {
        TaskArg::Var(key)
    }
}

impl From<Tile> for TaskArg {
    fn from(tile: Tile) -> Self {
        TaskArg::Tile(tile)
    }
}

/// Where a task's result should go: discarded, stored under a single key,
/// or unpacked element-wise into several keys (spec's tuple-returning
/// custom functions, e.g. `double_triple`).
#[derive(Debug, Clone)]
pub enum ResultVar {
    None,
    Single(VarKey),
    Tuple(Vec<VarKey>),
}

/// A task's return value, sent back to the commander via gather when the
/// task requests it.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Tile(Tile),
    Scalar(f64),
    Shape(Vec<usize>),
    Tuple(Vec<TaskOutput>),
}

/// Fixed set of reduction/elementwise functions available without
/// registering a custom closure, standing in for directly passing a numpy
/// free function (`np.sum`, `np.sin`, ...) in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFn {
    Sin,
    Copy,
    Sum,
    Max,
    Min,
    Shape,
}

/// Which function a `Func` task invokes.
#[derive(Debug, Clone)]
pub enum FuncRef {
    Builtin(BuiltinFn),
    Named(String),
}

/// Fixed set of methods a `Method` task can invoke on a stored variable,
/// standing in for the original's `getattr(variable, method_name)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMethod {
    Sum,
    Max,
    Min,
    Shape,
}

/// One unit of work a worker executes, with an indication of whether the
/// commander expects a gathered reply.
#[derive(Debug, Clone)]
pub enum TaskDescriptor {
    Func {
        func: FuncRef,
        args: Vec<TaskArg>,
        result_var: ResultVar,
    },
    Method {
        var: VarKey,
        method: BuiltinMethod,
        args: Vec<TaskArg>,
        result_var: ResultVar,
    },
}
