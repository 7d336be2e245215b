//! Builds the small demo DAG the `decompose`/`run-demo` subcommands operate
//! on: a chain of scalar-add operations followed by a scale, the same shape
//! of computation exercised by `stencil-ops`'s bridge integration test.

use std::sync::Arc;

use stencil_core::{Operand, Value};
use stencil_ops::{AddScalar, Scale};

/// The demo DAG's single source and sink, plus the shape it was built for.
pub struct DemoDag {
    pub ni: usize,
    pub nj: usize,
    pub source: Value,
    pub sink: Value,
}

/// Chains `chain_length` `AddScalar(+1)` operations after the source, then
/// a final `Scale(*2)`.
pub fn build_chain(ni: usize, nj: usize, chain_length: usize) -> DemoDag {
    let source = Value::source(vec![ni, nj]);
    let mut current = source.clone();
    for _ in 0..chain_length {
        let op = Arc::new(AddScalar {
            input: Operand::Value(current.clone()),
            constant: 1.0,
        });
        current = Value::derived(vec![ni, nj], op);
    }
    let op = Arc::new(Scale {
        input: Operand::Value(current.clone()),
        factor: 2.0,
    });
    let sink = Value::derived(vec![ni, nj], op);
    DemoDag { ni, nj, source, sink }
}
