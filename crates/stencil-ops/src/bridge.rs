//! Runs an [`AtomicStage`] across a [`Commander`]'s worker mesh instead of
//! evaluating it in-process, turning each sorted internal `Value` into one
//! broadcast `func` call whose custom function wraps that value's
//! `Operation::perform`.

use std::collections::HashMap;
use std::sync::Arc;

use stencil_core::{Operand, Tile, Value};
use stencil_runtime::{Commander, FuncRef, ResultVar, RuntimeError, TaskArg, TaskOutput, VarKey};
use stencil_stage::AtomicStage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("runtime error while distributing stage: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("stage invoked with {got} source tile(s), expected {expected}")]
    SourceArity { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Evaluate `stage` across `commander`'s worker mesh. `sources` supplies
/// one pre-distributed variable key per `stage.source_values` entry (the
/// caller is responsible for having already scattered or broadcast those
/// tiles to the workers under those keys); returns one variable key per
/// `stage.sink_values`, holding the result on every worker.
pub async fn run_stage_on_commander(
    stage: &AtomicStage,
    commander: &mut Commander,
    sources: Vec<VarKey>,
) -> Result<Vec<VarKey>> {
    if sources.len() != stage.source_values.len() {
        return Err(BridgeError::SourceArity {
            expected: stage.source_values.len(),
            got: sources.len(),
        });
    }

    let mut bound: HashMap<Value, VarKey> = HashMap::new();
    for (v, key) in stage.source_values.iter().zip(sources) {
        bound.insert(v.clone(), key);
    }

    for v in &stage.tributary_values {
        // Tributaries are expected to already be resolvable as named/global
        // worker variables (e.g. the predefined `ZERO`/`I`/`J`); nothing to
        // distribute here.
        bound.entry(v.clone()).or_insert(VarKey::ZERO);
    }

    for v in &stage.sorted_values {
        let owner = v
            .owner()
            .expect("sorted internal values are always owned by construction");
        let name = format!("stage_op_{}", v.id());
        let op = owner.clone();
        let arity = owner.inputs().len();
        commander
            .set_custom_func(
                name.clone(),
                Arc::new(move |tiles: &[Tile]| {
                    op.perform(tiles.to_vec())
                        .map(TaskOutput::Tile)
                        .map_err(|e| RuntimeError::Protocol(e.to_string()))
                }),
            )
            .await?;

        let mut args = Vec::with_capacity(arity);
        for operand in owner.inputs() {
            match operand {
                Operand::Const(tile) => args.push(TaskArg::Tile(tile.clone())),
                Operand::Value(v_inp) => {
                    let key = bound
                        .get(v_inp)
                        .cloned()
                        .ok_or_else(|| RuntimeError::Protocol(format!("{v_inp:?} not yet bound")))?;
                    args.push(TaskArg::Var(key));
                }
            }
        }

        let result_key = commander.new_variable();
        commander
            .func(
                FuncRef::Named(name),
                args,
                ResultVar::Single(result_key.clone()),
                false,
            )
            .await?;
        bound.insert(v.clone(), result_key);
    }

    stage
        .sink_values
        .iter()
        .map(|v| {
            bound
                .get(v)
                .cloned()
                .ok_or_else(|| BridgeError::Runtime(RuntimeError::Protocol(format!("sink {v:?} never bound"))))
        })
        .collect()
}
