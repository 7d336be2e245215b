//! Compiled, reinvocable sub-DAG (spec §4.D).

use crate::error::{DecompositionError, Result};
use stencil_core::{discover, topo_sort, Operand, Tile, Value};
use std::collections::HashMap;

/// Supplies tiles for an [`AtomicStage`]'s tributaries — values that enter
/// the stage's computation without being one of its formal sources.
///
/// Implemented both for closures and for a plain lookup table, mirroring the
/// original's duality of a callable-or-subscriptable tributary argument.
pub trait TributaryResolver {
    fn resolve(&self, value: &Value) -> Result<Tile>;
}

impl<F> TributaryResolver for F
where
    F: Fn(&Value) -> Result<Tile>,
{
    fn resolve(&self, value: &Value) -> Result<Tile> {
        self(value)
    }
}

impl TributaryResolver for HashMap<Value, Tile> {
    fn resolve(&self, value: &Value) -> Result<Tile> {
        self.get(value)
            .cloned()
            .ok_or_else(|| DecompositionError::UnboundValue(format!("{value:?}")))
    }
}

/// Immutable compiled stage: a closed sub-DAG between a fixed set of formal
/// `source_values` (plus tributaries resolved at invocation time) and a
/// fixed set of `sink_values`. Reinvocable with different concrete tiles.
#[derive(Debug)]
pub struct AtomicStage {
    pub source_values: Vec<Value>,
    pub tributary_values: Vec<Value>,
    pub sorted_values: Vec<Value>,
    pub sink_values: Vec<Value>,
}

impl AtomicStage {
    /// Close the sub-DAG reachable from `sink_values`, stopping at
    /// `source_values`, and topologically order everything in between.
    pub fn new(source_values: Vec<Value>, sink_values: Vec<Value>) -> Result<Self> {
        let discovery = discover(&source_values, &sink_values);
        let sorted_values = topo_sort(&source_values, discovery.internal)?;
        Ok(Self {
            source_values,
            tributary_values: discovery.tributaries,
            sorted_values,
            sink_values,
        })
    }

    /// Evaluate the stage given one concrete tile per `source_values` (in
    /// the same order) and a resolver for tributaries, returning one tile
    /// per `sink_values`.
    pub fn invoke(&self, sources: Vec<Tile>, tributary: &dyn TributaryResolver) -> Result<Vec<Tile>> {
        if sources.len() != self.source_values.len() {
            return Err(DecompositionError::SourceArity {
                expected: self.source_values.len(),
                got: sources.len(),
            });
        }

        let mut bound: HashMap<Value, Tile> = HashMap::with_capacity(
            self.source_values.len() + self.tributary_values.len() + self.sorted_values.len(),
        );
        for (v, t) in self.source_values.iter().zip(sources) {
            bound.insert(v.clone(), t);
        }
        for v in &self.tributary_values {
            let tile = tributary.resolve(v)?;
            bound.insert(v.clone(), tile);
        }

        for v in &self.sorted_values {
            let owner = v
                .owner()
                .expect("sorted internal values are always owned by construction");
            let mut inputs = Vec::with_capacity(owner.inputs().len());
            for operand in owner.inputs() {
                let tile = match operand {
                    Operand::Const(t) => t.clone(),
                    Operand::Value(v_inp) => bound
                        .get(v_inp)
                        .cloned()
                        .ok_or_else(|| DecompositionError::UnboundValue(format!("{v_inp:?}")))?,
                };
                inputs.push(tile);
            }
            let result = owner.perform(inputs)?;
            bound.insert(v.clone(), result);
        }

        self.sink_values
            .iter()
            .map(|v| {
                bound
                    .get(v)
                    .cloned()
                    .ok_or_else(|| DecompositionError::UnboundValue(format!("{v:?}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::{GraphError, Operation};
    use std::sync::Arc;

    #[derive(Debug)]
    struct ElemAdd {
        inputs: Vec<Operand>,
    }

    impl Operation for ElemAdd {
        fn inputs(&self) -> &[Operand] {
            &self.inputs
        }
        fn access_neighbor(&self) -> bool {
            false
        }
        fn perform(&self, inputs: Vec<Tile>) -> std::result::Result<Tile, GraphError> {
            Ok(&inputs[0] + &inputs[1])
        }
    }

    #[test]
    fn invokes_a_single_stage_elementwise_add() {
        let a = Value::source(vec![2, 2]);
        let one = Value::source(vec![2, 2]);
        let op = Arc::new(ElemAdd {
            inputs: vec![Operand::Value(a.clone()), Operand::Value(one.clone())],
        });
        let b = Value::derived(vec![2, 2], op);

        let stage = AtomicStage::new(vec![a, one.clone()], vec![b]).unwrap();
        assert_eq!(stage.sorted_values.len(), 1);
        assert!(stage.tributary_values.is_empty());

        let a_tile = Tile::from_elem(ndarray::IxDyn(&[2, 2]), 1.0);
        let one_tile = Tile::from_elem(ndarray::IxDyn(&[2, 2]), 1.0);
        let resolver = HashMap::<Value, Tile>::new();
        let out = stage.invoke(vec![a_tile, one_tile], &resolver).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].iter().all(|&x| x == 2.0));
    }
}
