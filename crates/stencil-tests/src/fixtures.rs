//! Reusable building blocks for integration tests across the workspace.

use std::sync::Arc;

use stencil_core::{GraphError, Operand, Operation, Tile, Value};

/// `y = x + 1`, used as a minimal stand-in operation when a test only
/// cares about DAG shape (source/sink arity, stage boundaries) rather than
/// a specific computation.
#[derive(Debug)]
pub struct Increment {
    pub input: Operand,
}

impl Operation for Increment {
    fn inputs(&self) -> &[Operand] {
        std::slice::from_ref(&self.input)
    }

    fn access_neighbor(&self) -> bool {
        false
    }

    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError> {
        Ok(&inputs[0] + 1.0)
    }
}

/// A uniform-valued `(ni, nj)` tile fixture.
pub fn uniform_tile(ni: usize, nj: usize, value: f64) -> Tile {
    Tile::from_elem(ndarray::IxDyn(&[ni, nj]), value)
}

/// A two-node chain `source -> Increment -> sink` over a `(ni, nj)` grid,
/// the smallest DAG shape exercised by the stage-decomposition tests.
pub fn increment_chain(ni: usize, nj: usize) -> (Value, Value) {
    let source = Value::source(vec![ni, nj]);
    let op = Arc::new(Increment {
        input: Operand::Value(source.clone()),
    });
    let sink = Value::derived(vec![ni, nj], op);
    (source, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_tile_has_the_requested_shape_and_value() {
        let t = uniform_tile(3, 4, 2.5);
        assert_eq!(t.shape(), &[3, 4]);
        assert!(t.iter().all(|&x| x == 2.5));
    }

    #[test]
    fn increment_chain_has_one_source_and_one_sink() {
        let (source, sink) = increment_chain(2, 2);
        assert!(source.owner().is_none());
        assert!(sink.owner().is_some());
    }
}
