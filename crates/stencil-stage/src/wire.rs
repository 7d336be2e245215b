//! Partitioner wire protocol (spec §6).

use crate::error::DecompositionError;
use crate::partition_graph::PartitionGraph;

/// Encode a [`PartitionGraph`] as the textual stdin format the external
/// partitioner expects:
///
/// ```text
/// <numVertices> <numEdges>
/// <weight_0>
/// ...
/// <weight_numVertices>   # synthetic sink, always 1
/// <u_0> <v_0> <s_0>
/// ...
/// ```
pub fn encode_wire_format(graph: &PartitionGraph) -> String {
    let num_vertices = graph.num_vertices();
    let num_edges = graph.num_edges();
    let mut out = String::with_capacity(32 + (num_vertices + 1) * 4 + num_edges * 8);

    out.push_str(&format!("{num_vertices} {num_edges}\n"));
    for id in 0..num_vertices {
        out.push_str(&format!("{}\n", graph.weight(id)));
    }
    out.push_str(&format!("{}\n", graph.weight(num_vertices))); // synthetic sink

    for (u, v, s) in graph.edges() {
        out.push_str(&format!("{u} {v} {s}\n"));
    }

    out
}

/// Parallel integer columns returned by the partitioner: `create_stage`,
/// `discard_stage`, `edge_tag` (unused by the core), one row per
/// non-synthetic vertex.
#[derive(Debug, Clone, Default)]
pub struct PartitionAssignment {
    pub create_stage: Vec<u64>,
    pub discard_stage: Vec<u64>,
    pub edge_tag: Vec<u64>,
}

/// Parse the whitespace-separated integer matrix the partitioner writes to
/// stdout into three parallel columns.
pub fn decode_partition_result(
    output: &str,
    expected_rows: usize,
) -> Result<PartitionAssignment, DecompositionError> {
    let mut tokens = output.split_whitespace();
    let mut assignment = PartitionAssignment {
        create_stage: Vec::with_capacity(expected_rows),
        discard_stage: Vec::with_capacity(expected_rows),
        edge_tag: Vec::with_capacity(expected_rows),
    };

    for row in 0..expected_rows {
        let c = tokens.next().ok_or_else(|| {
            DecompositionError::MalformedOutput(format!(
                "expected {expected_rows} rows, ran out of tokens at row {row}"
            ))
        })?;
        let d = tokens.next().ok_or_else(|| {
            DecompositionError::MalformedOutput(format!("missing discard_stage at row {row}"))
        })?;
        let e = tokens.next().ok_or_else(|| {
            DecompositionError::MalformedOutput(format!("missing edge_tag at row {row}"))
        })?;

        let c: u64 = c
            .parse()
            .map_err(|_| DecompositionError::MalformedOutput(format!("bad create_stage: {c}")))?;
        let d: u64 = d
            .parse()
            .map_err(|_| DecompositionError::MalformedOutput(format!("bad discard_stage: {d}")))?;
        let e: u64 = e
            .parse()
            .map_err(|_| DecompositionError::MalformedOutput(format!("bad edge_tag: {e}")))?;

        if c > d {
            return Err(DecompositionError::MalformedOutput(format!(
                "row {row}: create_stage {c} > discard_stage {d}"
            )));
        }

        assignment.create_stage.push(c);
        assignment.discard_stage.push(d);
        assignment.edge_tag.push(e);
    }

    if tokens.next().is_some() {
        return Err(DecompositionError::MalformedOutput(format!(
            "partitioner produced more than the expected {expected_rows} rows"
        )));
    }

    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_simple_encoding() {
        use crate::partition_graph::PartitionGraph;
        use stencil_core::Value;

        let a = Value::source(vec![4]);
        let graph = PartitionGraph::build(&[a.clone()], &[a]);
        let encoded = encode_wire_format(&graph);
        assert!(encoded.starts_with("1 0\n"));
    }

    #[test]
    fn decode_rejects_create_after_discard() {
        let err = decode_partition_result("0 2 0\n1 0 0\n", 2).unwrap_err();
        assert!(matches!(err, DecompositionError::MalformedOutput(_)));
    }

    #[test]
    fn decode_rejects_truncated_output() {
        let err = decode_partition_result("0 1 0\n", 2).unwrap_err();
        assert!(matches!(err, DecompositionError::MalformedOutput(_)));
    }
}
