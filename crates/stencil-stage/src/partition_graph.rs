//! Partition-graph construction (spec §3 "Partition graph", §4.C steps 1-3).

use petgraph::graph::{DiGraph, NodeIndex};
use stencil_core::{discover, Operand, Value};
use std::collections::HashMap;

/// Weighted, stencil-flagged graph handed to the external partitioner.
///
/// Vertices are all reachable internal values plus the formal sources,
/// followed by a synthetic sink vertex (weight 1, no incident edges) that
/// gives the partitioner a fixed terminal id even though the spec's own
/// reference implementation never wires edges to it.
pub struct PartitionGraph {
    graph: DiGraph<u64, u8>,
    /// Non-synthetic vertices, in assigned-id order: discovered internal
    /// values first, then the formal sources.
    pub values: Vec<Value>,
    pub synthetic_sink: NodeIndex,
}

impl PartitionGraph {
    /// Build the partition graph for a decomposition of `sinks` given
    /// `sources` as the formal boundary of the walk.
    pub fn build(sources: &[Value], sinks: &[Value]) -> Self {
        let discovery = discover(sources, sinks);
        let mut values = discovery.internal;
        let internal_count = values.len();
        values.extend(sources.iter().cloned());

        let mut value_id: HashMap<Value, usize> = HashMap::with_capacity(values.len());
        for (idx, v) in values.iter().enumerate() {
            value_id.insert(v.clone(), idx);
        }

        let mut graph = DiGraph::with_capacity(values.len() + 1, 0);
        for v in &values {
            graph.add_node(v.size() as u64);
        }
        let synthetic_sink = graph.add_node(1);

        for v in values.iter().take(internal_count) {
            let owner = v
                .owner()
                .expect("internal values are always owned by construction");
            let v_id = value_id[v];
            let stencil = u8::from(owner.access_neighbor());
            for operand in owner.inputs() {
                if let Operand::Value(v_inp) = operand
                    && let Some(&u_id) = value_id.get(v_inp)
                {
                    graph.add_edge(NodeIndex::new(u_id), NodeIndex::new(v_id), stencil);
                }
            }
        }

        Self {
            graph,
            values,
            synthetic_sink,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.values.len()
    }

    pub fn weight(&self, id: usize) -> u64 {
        self.graph[NodeIndex::new(id)]
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| (e.source().index(), e.target().index(), e.weight))
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::{GraphError, Operation, Tile};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Stencil {
        inputs: Vec<Operand>,
    }

    impl Operation for Stencil {
        fn inputs(&self) -> &[Operand] {
            &self.inputs
        }
        fn access_neighbor(&self) -> bool {
            true
        }
        fn perform(&self, mut inputs: Vec<Tile>) -> Result<Tile, GraphError> {
            Ok(inputs.remove(0))
        }
    }

    #[test]
    fn builds_vertices_and_stencil_edges() {
        let a = Value::source(vec![4, 4]);
        let op = Arc::new(Stencil {
            inputs: vec![Operand::Value(a.clone())],
        });
        let b = Value::derived(vec![4, 4], op);

        let pg = PartitionGraph::build(&[a.clone()], &[b.clone()]);
        // internal = {b}, sources = {a} => 2 non-synthetic vertices.
        assert_eq!(pg.num_vertices(), 2);
        assert_eq!(pg.num_edges(), 1);
        let (u, v, s) = pg.edges().next().unwrap();
        assert_eq!(s, 1, "stencil flag must propagate from access_neighbor");
        assert_eq!(pg.values[u], a);
        assert_eq!(pg.values[v], b);
    }
}
