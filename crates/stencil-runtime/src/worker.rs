//! One tile-owning worker task (spec §5.E, ported from `MPI_Worker`).

use crate::custom_func::CustomFuncRegistry;
use crate::error::{Result, RuntimeError};
use crate::halo::{self, needs_halo, HaloLinks};
use crate::task::{BuiltinFn, BuiltinMethod, FuncRef, ResultVar, TaskArg, TaskDescriptor, TaskOutput};
use crate::topology::AxisRange;
use crate::variable::VarKey;
use stencil_core::Tile;
use std::collections::HashMap;
use tracing::trace;

fn index_tile(range: AxisRange, other_len: usize, axis_is_i: bool) -> Tile {
    let n = range.len();
    let shape = if axis_is_i {
        [n + 2, other_len + 2]
    } else {
        [other_len + 2, n + 2]
    };
    let mut t = Tile::zeros(ndarray::IxDyn(&shape));
    for a in 0..shape[0] {
        for b in 0..shape[1] {
            let coord = if axis_is_i { a } else { b };
            t[[a, b]] = (range.start as isize - 1 + coord as isize) as f64;
        }
    }
    t
}

/// A single MPI-rank-equivalent worker owning one tile of the grid plus its
/// 1-cell ghost halo, a variable table, and a registry of custom functions.
pub struct Worker {
    pub rank: usize,
    pub ni: usize,
    pub nj: usize,
    variables: HashMap<VarKey, Tile>,
    custom_funcs: CustomFuncRegistry,
}

impl Worker {
    pub fn new(rank: usize, i_range: AxisRange, j_range: AxisRange) -> Self {
        let ni = i_range.len();
        let nj = j_range.len();
        let i_tile = index_tile(i_range, nj, true);
        let j_tile = index_tile(j_range, ni, false);
        let zero = Tile::zeros(ndarray::IxDyn(&[ni + 2, nj + 2]));

        let mut variables = HashMap::new();
        variables.insert(VarKey::I, i_tile);
        variables.insert(VarKey::J, j_tile);
        variables.insert(VarKey::ZERO, zero);

        Self {
            rank,
            ni,
            nj,
            variables,
            custom_funcs: CustomFuncRegistry::new(),
        }
    }

    pub fn register_func(&mut self, name: String, func: crate::custom_func::CustomFn) {
        self.custom_funcs.register(name, func);
    }

    fn substitute(&self, args: &[TaskArg]) -> Result<Vec<Tile>> {
        args.iter()
            .map(|arg| match arg {
                TaskArg::Tile(t) => Ok(t.clone()),
                TaskArg::Scalar(x) => Ok(Tile::from_elem(ndarray::IxDyn(&[]), *x)),
                TaskArg::Var(key) => self
                    .variables
                    .get(key)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownVariable(key.clone())),
            })
            .collect()
    }

    fn call_builtin_fn(&self, func: BuiltinFn, tiles: &[Tile]) -> Result<TaskOutput> {
        let first = tiles
            .first()
            .ok_or_else(|| RuntimeError::Protocol("builtin function called with no arguments".into()))?;
        Ok(match func {
            BuiltinFn::Sin => TaskOutput::Tile(first.mapv(f64::sin)),
            BuiltinFn::Copy => TaskOutput::Tile(first.clone()),
            BuiltinFn::Sum => TaskOutput::Scalar(first.sum()),
            BuiltinFn::Max => TaskOutput::Scalar(first.iter().copied().fold(f64::MIN, f64::max)),
            BuiltinFn::Min => TaskOutput::Scalar(first.iter().copied().fold(f64::MAX, f64::min)),
            BuiltinFn::Shape => TaskOutput::Shape(first.shape().to_vec()),
        })
    }

    fn call_builtin_method(&self, method: BuiltinMethod, base: &Tile) -> Result<TaskOutput> {
        Ok(match method {
            BuiltinMethod::Sum => TaskOutput::Scalar(base.sum()),
            BuiltinMethod::Max => TaskOutput::Scalar(base.iter().copied().fold(f64::MIN, f64::max)),
            BuiltinMethod::Min => TaskOutput::Scalar(base.iter().copied().fold(f64::MAX, f64::min)),
            BuiltinMethod::Shape => TaskOutput::Shape(base.shape().to_vec()),
        })
    }

    /// Execute one task, applying halo exchange to any tile result whose
    /// shape shows it still needs ghost cells, and returning a value only
    /// when the task has no `result_var` (spec's "return_result" path).
    pub async fn execute(
        &mut self,
        descriptor: TaskDescriptor,
        links: &mut HaloLinks,
    ) -> Result<Option<TaskOutput>> {
        let (output, result_var) = match descriptor {
            TaskDescriptor::Func {
                func,
                args,
                result_var,
            } => {
                let tiles = self.substitute(&args)?;
                let output = match func {
                    FuncRef::Builtin(b) => self.call_builtin_fn(b, &tiles)?,
                    FuncRef::Named(name) => self.custom_funcs.invoke(&name, &tiles)?,
                };
                (output, result_var)
            }
            TaskDescriptor::Method {
                var,
                method,
                args,
                result_var,
            } => {
                let base = self
                    .variables
                    .get(&var)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownVariable(var.clone()))?;
                let _ = self.substitute(&args)?;
                (self.call_builtin_method(method, &base)?, result_var)
            }
        };
        self.store_or_return(output, result_var, links).await
    }

    fn store_or_return<'a>(
        &'a mut self,
        output: TaskOutput,
        result_var: ResultVar,
        links: &'a mut HaloLinks,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Option<TaskOutput>>> + Send + 'a>> {
        Box::pin(async move {
            match (output, result_var) {
                (TaskOutput::Tuple(outs), ResultVar::Tuple(keys)) => {
                    if outs.len() != keys.len() {
                        return Err(RuntimeError::ResultArity {
                            expected: keys.len(),
                            got: outs.len(),
                        });
                    }
                    for (out, key) in outs.into_iter().zip(keys) {
                        self.store_or_return(out, ResultVar::Single(key), links).await?;
                    }
                    Ok(None)
                }
                (TaskOutput::Tile(tile), ResultVar::Single(key)) => {
                    let stored = if needs_halo(&tile, self.ni, self.nj) {
                        trace!(rank = self.rank, "exchanging halo for stored result");
                        halo::exchange(&tile, links).await?
                    } else {
                        tile
                    };
                    self.variables.insert(key, stored);
                    Ok(None)
                }
                (_, ResultVar::Single(_)) => Err(RuntimeError::Protocol(
                    "only tile results can be stored in a variable".into(),
                )),
                (output, ResultVar::None) => Ok(Some(output)),
                (_, ResultVar::Tuple(_)) => Err(RuntimeError::Protocol(
                    "tuple result_var requires a tuple output".into(),
                )),
            }
        })
    }
}

/// Drive one worker's message loop until it receives `Envelope::Finalize`
/// or its command channel closes, mirroring `mpi_worker_main`'s `while
/// True` bcast loop.
pub async fn run_worker(
    mut worker: Worker,
    mut cmd_rx: tokio::sync::mpsc::Receiver<crate::message::Envelope>,
    result_tx: tokio::sync::mpsc::Sender<TaskOutput>,
    mut links: HaloLinks,
) {
    use crate::message::Envelope;

    while let Some(envelope) = cmd_rx.recv().await {
        match envelope {
            Envelope::Finalize => break,
            Envelope::RegisterFunc { name, func } => {
                worker.register_func(name, func);
                let _ = result_tx.send(TaskOutput::Shape(Vec::new())).await;
            }
            Envelope::Task {
                descriptor,
                return_result,
            } => match worker.execute(descriptor, &mut links).await {
                Ok(Some(output)) if return_result => {
                    let _ = result_tx.send(output).await;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(rank = worker.rank, error = %err, "task failed on worker");
                    if return_result {
                        let _ = result_tx.send(TaskOutput::Scalar(f64::NAN)).await;
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::AxisRange;

    #[test]
    fn new_worker_seeds_i_j_zero_variables() {
        let w = Worker::new(0, AxisRange { start: 0, end: 4 }, AxisRange { start: 0, end: 4 });
        assert_eq!(w.variables[&VarKey::ZERO].shape(), &[6, 6]);
        assert_eq!(w.variables[&VarKey::I][[0, 0]], -1.0);
        assert_eq!(w.variables[&VarKey::J][[0, 0]], -1.0);
    }
}
