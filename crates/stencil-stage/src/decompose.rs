//! Top-level stage decomposition entry point (spec §4.C step 5).

use crate::atomic_stage::AtomicStage;
use crate::error::{DecompositionError, Result};
use crate::partition_graph::PartitionGraph;
use crate::partitioner::Partitioner;
use stencil_core::Value;
use tracing::info;

/// Decompose the DAG closure between `sources` and `sinks` into a sequence
/// of [`AtomicStage`]s, each small enough to fit the partitioner's notion of
/// a stage, reinvoked one after another with the previous stage's sinks
/// feeding the next stage's sources.
pub async fn decompose(
    sources: Vec<Value>,
    sinks: Vec<Value>,
    partitioner: &dyn Partitioner,
) -> Result<Vec<AtomicStage>> {
    let graph = PartitionGraph::build(&sources, &sinks);
    let assignment = partitioner.partition(&graph).await?;
    let num_stages = assignment.discard_stage.iter().copied().max().unwrap_or(0);

    if num_stages == 0 && !sinks.is_empty() {
        return Err(DecompositionError::EmptyStageSet { sinks: sinks.len() });
    }

    info!(
        vertices = graph.num_vertices(),
        num_stages, "decomposed DAG into atomic stages"
    );

    let mut stages = Vec::new();
    let mut stage_source = sources;
    for k in 1..num_stages {
        let next_stage_source: Vec<Value> = graph
            .values
            .iter()
            .enumerate()
            .filter(|(idx, _)| assignment.create_stage[*idx] <= k && assignment.discard_stage[*idx] > k)
            .map(|(_, v)| v.clone())
            .collect();
        stages.push(AtomicStage::new(stage_source, next_stage_source.clone())?);
        stage_source = next_stage_source;
    }
    stages.push(AtomicStage::new(stage_source, sinks)?);

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioner::GreedyPartitioner;
    use stencil_core::{GraphError, Operand, Operation, Tile};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Double {
        inputs: Vec<Operand>,
    }

    impl Operation for Double {
        fn inputs(&self) -> &[Operand] {
            &self.inputs
        }
        fn access_neighbor(&self) -> bool {
            false
        }
        fn perform(&self, inputs: Vec<Tile>) -> std::result::Result<Tile, GraphError> {
            Ok(&inputs[0] * 2.0)
        }
    }

    fn build_chain() -> (Value, Value, Value) {
        let a = Value::source(vec![2, 2]);
        let op_b = Arc::new(Double {
            inputs: vec![Operand::Value(a.clone())],
        });
        let b = Value::derived(vec![2, 2], op_b);
        let op_c = Arc::new(Double {
            inputs: vec![Operand::Value(b.clone())],
        });
        let c = Value::derived(vec![2, 2], op_c);
        (a, b, c)
    }

    #[tokio::test]
    async fn decomposes_a_two_step_chain_under_the_greedy_partitioner() {
        let (a, _b, c) = build_chain();

        let stages = decompose(vec![a], vec![c], &GreedyPartitioner).await.unwrap();
        assert!(!stages.is_empty());

        let mut tile = Tile::from_elem(ndarray::IxDyn(&[2, 2]), 1.0);
        let resolver: std::collections::HashMap<Value, Tile> = std::collections::HashMap::new();
        for stage in &stages {
            let out = stage.invoke(vec![tile], &resolver).unwrap();
            tile = out.into_iter().next().unwrap();
        }
        assert!(tile.iter().all(|&x| x == 4.0));
    }

    #[tokio::test]
    async fn a_two_step_chain_cuts_exactly_at_each_intermediate_value() {
        let (a, b, c) = build_chain();

        let stages = decompose(vec![a.clone()], vec![c.clone()], &GreedyPartitioner)
            .await
            .unwrap();

        assert_eq!(stages.len(), 2, "one cut for the one intermediate value `b`");
        assert_eq!(stages[0].source_values, vec![a]);
        assert_eq!(stages[0].sink_values, vec![b.clone()]);
        assert_eq!(stages[1].source_values, vec![b]);
        assert_eq!(stages[1].sink_values, vec![c]);
    }

    #[tokio::test]
    async fn empty_stage_set_is_rejected_for_non_empty_sinks() {
        struct NoStages;

        #[async_trait::async_trait]
        impl crate::partitioner::Partitioner for NoStages {
            async fn partition(
                &self,
                graph: &PartitionGraph,
            ) -> Result<crate::wire::PartitionAssignment> {
                Ok(crate::wire::PartitionAssignment {
                    create_stage: vec![0; graph.num_vertices()],
                    discard_stage: vec![0; graph.num_vertices()],
                    edge_tag: vec![0; graph.num_vertices()],
                })
            }
        }

        let (a, _b, c) = build_chain();
        let err = decompose(vec![a], vec![c], &NoStages).await.unwrap_err();
        assert!(matches!(err, DecompositionError::EmptyStageSet { sinks: 1 }));
    }
}
