//! Partitioner port (spec §4.C step 4, §6) and its two adapters.

use crate::error::DecompositionError;
use crate::partition_graph::PartitionGraph;
use crate::wire::{decode_partition_result, encode_wire_format, PartitionAssignment};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use stencil_core::GraphError;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Assigns every non-synthetic vertex of a [`PartitionGraph`] a
/// `create_stage`/`discard_stage` span, deciding where the symbolic DAG is
/// cut into reinvocable [`crate::AtomicStage`]s.
#[async_trait]
pub trait Partitioner: Send + Sync {
    async fn partition(
        &self,
        graph: &PartitionGraph,
    ) -> Result<PartitionAssignment, DecompositionError>;
}

/// Invokes an external graph-partitioner subprocess over the textual wire
/// protocol (spec §6): the graph is written to its stdin, the assignment is
/// read back from its stdout.
pub struct ExternalPartitioner {
    binary: PathBuf,
    args: Vec<String>,
}

impl ExternalPartitioner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl Partitioner for ExternalPartitioner {
    async fn partition(
        &self,
        graph: &PartitionGraph,
    ) -> Result<PartitionAssignment, DecompositionError> {
        let input = encode_wire_format(graph);
        debug!(
            binary = %self.binary.display(),
            vertices = graph.num_vertices(),
            edges = graph.num_edges(),
            "launching external partitioner"
        );

        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecompositionError::Launch(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DecompositionError::Launch("partitioner stdin unavailable".into()))?;
        stdin
            .write_all(input.as_bytes())
            .await
            .map_err(|e| DecompositionError::Launch(e.to_string()))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DecompositionError::Launch(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(status = %output.status, %stderr, "partitioner exited non-zero");
            return Err(DecompositionError::PartitionerFailed(stderr));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| DecompositionError::MalformedOutput(e.to_string()))?;
        decode_partition_result(&stdout, graph.num_vertices())
    }
}

/// In-process fallback partitioner used in tests and demos when no external
/// partitioner binary is configured: a level-based longest-path schedule.
/// Every vertex is assigned `create_stage` = its longest-path distance from
/// a source (so a value only appears once every producer it depends on has
/// run) and `discard_stage` = the latest level among its consumers (so it
/// survives as a stage boundary's source until nothing still needs it).
/// Vertices with no consumers (the sinks themselves) discard at their own
/// level, since they are threaded through as `sinks` directly rather than
/// as an intermediate stage boundary.
pub struct GreedyPartitioner;

#[async_trait]
impl Partitioner for GreedyPartitioner {
    async fn partition(
        &self,
        graph: &PartitionGraph,
    ) -> Result<PartitionAssignment, DecompositionError> {
        let n = graph.num_vertices();
        let edges: Vec<(usize, usize, u8)> = graph.edges().collect();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree = vec![0usize; n];
        for &(u, v, _) in &edges {
            successors[u].push(v);
            indegree[v] += 1;
        }

        let mut level = vec![0u64; n];
        let mut remaining_indegree = indegree.clone();
        let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
        let mut processed = 0usize;
        while let Some(u) = queue.pop_front() {
            processed += 1;
            for &v in &successors[u] {
                level[v] = level[v].max(level[u] + 1);
                remaining_indegree[v] -= 1;
                if remaining_indegree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        if processed != n {
            return Err(DecompositionError::Graph(GraphError::Cycle(n - processed)));
        }

        let mut discard = level.clone();
        for &(u, v, _) in &edges {
            discard[u] = discard[u].max(level[v]);
        }

        Ok(PartitionAssignment {
            create_stage: level,
            discard_stage: discard,
            edge_tag: vec![0; n],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition_graph::PartitionGraph;
    use stencil_core::{GraphError, Operand, Operation, Tile, Value};
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

    #[tokio::test]
    async fn an_isolated_source_sink_graph_has_a_single_trivial_level() {
        let a = Value::source(vec![4]);
        let graph = PartitionGraph::build(&[a.clone()], &[a]);
        let assignment = GreedyPartitioner.partition(&graph).await.unwrap();
        assert_eq!(assignment.create_stage, vec![0]);
        assert_eq!(assignment.discard_stage, vec![0]);
    }

    #[tokio::test]
    async fn a_two_step_chain_gets_increasing_levels_with_intermediates_alive_one_stage() {
        // values = [c, b, a] (discovery order from the sink back), ids 0/1/2.
        let a = Value::source(vec![2, 2]);
        let op_b = Arc::new(Double {
            inputs: vec![Operand::Value(a.clone())],
        });
        let b = Value::derived(vec![2, 2], op_b);
        let op_c = Arc::new(Double {
            inputs: vec![Operand::Value(b.clone())],
        });
        let c = Value::derived(vec![2, 2], op_c);

        let graph = PartitionGraph::build(&[a.clone()], &[c.clone()]);
        let assignment = GreedyPartitioner.partition(&graph).await.unwrap();

        let id = |v: &Value| graph.values.iter().position(|x| x == v).unwrap();
        let (id_a, id_b, id_c) = (id(&a), id(&b), id(&c));

        assert_eq!(assignment.create_stage[id_a], 0);
        assert_eq!(assignment.create_stage[id_b], 1);
        assert_eq!(assignment.create_stage[id_c], 2);

        // `a` is only needed to produce `b` (level 1), so it is discarded
        // once stage 1 has run; `b` is only needed to produce `c` (level
        // 2); `c` has no consumers, so it discards at its own level.
        assert_eq!(assignment.discard_stage[id_a], 1);
        assert_eq!(assignment.discard_stage[id_b], 2);
        assert_eq!(assignment.discard_stage[id_c], 2);
    }
}
