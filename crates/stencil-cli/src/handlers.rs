//! Command handlers.

use std::path::Path;

use stencil_ops::run_stage_on_commander;
use stencil_runtime::{BuiltinFn, Commander, FuncRef, ResultVar, TaskArg, TaskOutput};
use stencil_stage::{decompose, ExternalPartitioner, GreedyPartitioner, Partitioner};
use tracing::info;

use crate::config::RuntimeConfig;
use crate::demo::build_chain;

fn pick_partitioner(config: &RuntimeConfig) -> Box<dyn Partitioner> {
    match &config.partitioner_binary {
        Some(path) => Box::new(ExternalPartitioner::new(path.clone())),
        None => Box::new(GreedyPartitioner),
    }
}

pub async fn decompose_demo(config: &RuntimeConfig, chain_length: usize) -> anyhow::Result<()> {
    let dag = build_chain(config.ni, config.nj, chain_length);
    let partitioner = pick_partitioner(config);
    let stages = decompose(vec![dag.source], vec![dag.sink], partitioner.as_ref()).await?;

    println!("decomposed into {} stage(s):", stages.len());
    for (idx, stage) in stages.iter().enumerate() {
        println!(
            "  stage {idx}: {} source(s), {} tributary(ies), {} internal value(s), {} sink(s)",
            stage.source_values.len(),
            stage.tributary_values.len(),
            stage.sorted_values.len(),
            stage.sink_values.len(),
        );
    }
    Ok(())
}

pub async fn run_demo(config: &RuntimeConfig, chain_length: usize) -> anyhow::Result<()> {
    let dag = build_chain(config.ni, config.nj, chain_length);
    let partitioner = pick_partitioner(config);
    let stages = decompose(vec![dag.source], vec![dag.sink], partitioner.as_ref()).await?;
    info!(stage_count = stages.len(), "decomposed demo DAG");

    let mut commander = Commander::spawn(config.ni, config.nj, config.ni_proc, config.nj_proc);
    let mut current = commander.new_variable();
    commander
        .func(
            FuncRef::Builtin(BuiltinFn::Copy),
            vec![TaskArg::Tile(stencil_core::Tile::zeros(ndarray::IxDyn(&[
                config.ni, config.nj,
            ])))],
            ResultVar::Single(current.clone()),
            false,
        )
        .await?;

    for stage in &stages {
        let sinks = run_stage_on_commander(stage, &mut commander, vec![current]).await?;
        current = sinks
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("stage produced no sink variable"))?;
    }

    let result = commander
        .func(FuncRef::Builtin(BuiltinFn::Sum), vec![TaskArg::Var(current)], ResultVar::None, true)
        .await?;

    match result.first() {
        Some(TaskOutput::Scalar(sum)) => println!("sum across mesh: {sum}"),
        other => println!("unexpected demo result: {other:?}"),
    }
    Ok(())
}

pub fn validate(path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let config: RuntimeConfig = serde_yaml::from_str(&content)?;

    println!("configuration at {} is valid", path.display());
    println!("  grid: {}x{}", config.ni, config.nj);
    println!("  process mesh: {}x{}", config.ni_proc, config.nj_proc);
    println!(
        "  partitioner: {}",
        config
            .partitioner_binary
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "greedy (in-process)".to_string())
    );
    Ok(())
}
