//! Process-mesh orchestrator (spec §5.E, ported from `MPI_Commander`).

use crate::custom_func::CustomFn;
use crate::error::{Result, RuntimeError};
use crate::halo::{Direction, HaloLinks};
use crate::message::Envelope;
use crate::task::{BuiltinMethod, FuncRef, ResultVar, TaskArg, TaskDescriptor, TaskOutput};
use crate::topology::{self, axis_ranges, AxisRange};
use crate::variable::{VarKey, VarKeyGenerator};
use crate::worker::{run_worker, Worker};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

static NEXT_COMMANDER_ID: AtomicU64 = AtomicU64::new(0);

/// Owns one independent set of worker tasks tiling an `ni x nj` grid over a
/// `ni_proc x nj_proc` process mesh, and the only handle able to command
/// them. Two commanders in the same process never share workers or
/// variable keys (spec §9 "multiple commanders" — unsupported, by design:
/// each commander is its own singleton owner).
pub struct Commander {
    id: u64,
    key_gen: VarKeyGenerator,
    cmd_txs: Vec<mpsc::Sender<Envelope>>,
    result_rxs: Vec<mpsc::Receiver<TaskOutput>>,
    handles: Vec<JoinHandle<()>>,
    pub i_ranges: Vec<AxisRange>,
    pub j_ranges: Vec<AxisRange>,
    pub ni_proc: usize,
    pub nj_proc: usize,
    finalized: bool,
}

impl Commander {
    pub fn spawn(ni: usize, nj: usize, ni_proc: usize, nj_proc: usize) -> Self {
        let id = NEXT_COMMANDER_ID.fetch_add(1, Ordering::Relaxed);
        let i_ranges = axis_ranges(ni, ni_proc);
        let j_ranges = axis_ranges(nj, nj_proc);
        let num_workers = ni_proc * nj_proc;

        info!(id, ni, nj, ni_proc, nj_proc, "spawning worker mesh");

        let mut halo_tx: HashMap<(usize, Direction), mpsc::Sender<stencil_core::Tile>> = HashMap::new();
        let mut halo_rx: HashMap<(usize, Direction), mpsc::Receiver<stencil_core::Tile>> = HashMap::new();
        for i in 0..ni_proc {
            for j in 0..nj_proc {
                let rank = topology::rank_of(i, j, nj_proc);
                let nb = topology::neighbor_ranks(i, j, ni_proc, nj_proc);
                for (dir, neighbor_rank, opposite) in [
                    (Direction::XMinus, nb.x_minus, Direction::XPlus),
                    (Direction::XPlus, nb.x_plus, Direction::XMinus),
                    (Direction::YMinus, nb.y_minus, Direction::YPlus),
                    (Direction::YPlus, nb.y_plus, Direction::YMinus),
                ] {
                    let (tx, rx) = mpsc::channel(1);
                    halo_tx.insert((rank, dir), tx);
                    halo_rx.insert((neighbor_rank, opposite), rx);
                }
            }
        }

        let mut cmd_txs = Vec::with_capacity(num_workers);
        let mut result_rxs = Vec::with_capacity(num_workers);
        let mut handles = Vec::with_capacity(num_workers);

        for i in 0..ni_proc {
            for j in 0..nj_proc {
                let rank = topology::rank_of(i, j, nj_proc);
                let worker = Worker::new(rank, i_ranges[i], j_ranges[j]);
                let links = HaloLinks {
                    tx: Direction::ALL
                        .into_iter()
                        .map(|d| (d, halo_tx.remove(&(rank, d)).expect("halo tx wired")))
                        .collect(),
                    rx: Direction::ALL
                        .into_iter()
                        .map(|d| (d, halo_rx.remove(&(rank, d)).expect("halo rx wired")))
                        .collect(),
                };

                let (cmd_tx, cmd_rx) = mpsc::channel(8);
                let (result_tx, result_rx) = mpsc::channel(8);
                handles.push(tokio::spawn(run_worker(worker, cmd_rx, result_tx, links)));
                cmd_txs.push(cmd_tx);
                result_rxs.push(result_rx);
            }
        }

        Self {
            id,
            key_gen: VarKeyGenerator::new(id),
            cmd_txs,
            result_rxs,
            handles,
            i_ranges,
            j_ranges,
            ni_proc,
            nj_proc,
            finalized: false,
        }
    }

    pub fn new_variable(&self) -> VarKey {
        self.key_gen.next_key()
    }

    pub fn num_workers(&self) -> usize {
        self.cmd_txs.len()
    }

    async fn broadcast(&mut self, envelope: Envelope, return_result: bool) -> Result<Vec<TaskOutput>> {
        for tx in &self.cmd_txs {
            tx.send(envelope.clone())
                .await
                .map_err(|_| RuntimeError::Transport("worker channel closed".into()))?;
        }
        if return_result {
            self.gather().await
        } else {
            Ok(Vec::new())
        }
    }

    async fn scatter(&mut self, envelopes: Vec<Envelope>, return_result: bool) -> Result<Vec<TaskOutput>> {
        if envelopes.len() != self.cmd_txs.len() {
            return Err(RuntimeError::Protocol(format!(
                "scatter supplied {} task(s) for {} worker(s)",
                envelopes.len(),
                self.cmd_txs.len()
            )));
        }
        for (tx, envelope) in self.cmd_txs.iter().zip(envelopes) {
            tx.send(envelope)
                .await
                .map_err(|_| RuntimeError::Transport("worker channel closed".into()))?;
        }
        if return_result {
            self.gather().await
        } else {
            Ok(Vec::new())
        }
    }

    async fn gather(&mut self) -> Result<Vec<TaskOutput>> {
        let mut results = Vec::with_capacity(self.result_rxs.len());
        for rx in &mut self.result_rxs {
            let output = rx
                .recv()
                .await
                .ok_or_else(|| RuntimeError::Transport("worker result channel closed".into()))?;
            results.push(output);
        }
        Ok(results)
    }

    /// Broadcast a function call to every worker (spec's `MPI_Commander.func`).
    pub async fn func(
        &mut self,
        func: FuncRef,
        args: Vec<TaskArg>,
        result_var: ResultVar,
        return_result: bool,
    ) -> Result<Vec<TaskOutput>> {
        let descriptor = TaskDescriptor::Func {
            func,
            args,
            result_var,
        };
        self.broadcast(
            Envelope::Task {
                descriptor,
                return_result,
            },
            return_result,
        )
        .await
    }

    /// Scatter one distinct argument list per worker to the same function
    /// (spec's `func_nonuniform_args`).
    pub async fn func_nonuniform_args(
        &mut self,
        func: FuncRef,
        args_per_worker: Vec<Vec<TaskArg>>,
        result_var: ResultVar,
        return_result: bool,
    ) -> Result<Vec<TaskOutput>> {
        if args_per_worker.len() != self.num_workers() {
            return Err(RuntimeError::Protocol(format!(
                "expected {} per-worker argument list(s), got {}",
                self.num_workers(),
                args_per_worker.len()
            )));
        }
        let envelopes = args_per_worker
            .into_iter()
            .map(|args| Envelope::Task {
                descriptor: TaskDescriptor::Func {
                    func: func.clone(),
                    args,
                    result_var: result_var.clone(),
                },
                return_result,
            })
            .collect();
        self.scatter(envelopes, return_result).await
    }

    /// Broadcast a method invocation on an existing variable to every
    /// worker (spec's `MPI_Commander.method`).
    pub async fn method(
        &mut self,
        var: VarKey,
        method: BuiltinMethod,
        args: Vec<TaskArg>,
        result_var: ResultVar,
        return_result: bool,
    ) -> Result<Vec<TaskOutput>> {
        let descriptor = TaskDescriptor::Method {
            var,
            method,
            args,
            result_var,
        };
        self.broadcast(
            Envelope::Task {
                descriptor,
                return_result,
            },
            return_result,
        )
        .await
    }

    /// Register a custom function under `name` on every worker. The
    /// original always gathers after this call even though it passes
    /// `return_result=False` to the task tuple (the worker loop treats
    /// any non-`None` `return_result` as "gather anyway"); this barrier
    /// is reproduced directly instead of inherited as a side effect.
    pub async fn set_custom_func(&mut self, name: impl Into<String>, func: CustomFn) -> Result<()> {
        let name = name.into();
        debug!(commander = self.id, %name, "registering custom function on all workers");
        for tx in &self.cmd_txs {
            tx.send(Envelope::RegisterFunc {
                name: name.clone(),
                func: func.clone(),
            })
            .await
            .map_err(|_| RuntimeError::Transport("worker channel closed".into()))?;
        }
        self.gather().await?;
        Ok(())
    }

    /// Best-effort finalize, idempotent: safe to call more than once, and
    /// called automatically on drop if not already done.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        for tx in &self.cmd_txs {
            let _ = tx.try_send(Envelope::Finalize);
        }
    }
}

impl Drop for Commander {
    fn drop(&mut self) {
        self.finalize();
        for handle in &self.handles {
            handle.abort();
        }
    }
}
