//! Stencil Ops
//!
//! Concrete [`stencil_core::Operation`] implementations and the bridge
//! that distributes an [`stencil_stage::AtomicStage`]'s evaluation across
//! a [`stencil_runtime::Commander`]'s worker mesh.

pub mod bridge;
pub mod elementwise;
pub mod stencil;

pub use bridge::{run_stage_on_commander, BridgeError};
pub use elementwise::{Add, AddScalar, Scale, Sine};
pub use stencil::FivePointAverage;

#[cfg(test)]
mod integration {
    use super::*;
    use stencil_core::{Operand, Value};
    use stencil_runtime::{BuiltinFn, Commander, FuncRef, ResultVar, TaskArg};
    use stencil_stage::{decompose, GreedyPartitioner};
    use std::sync::Arc;

    #[tokio::test]
    async fn distributes_a_two_step_chain_across_the_worker_mesh() {
        stencil_tests::init_test_logging();

        let a = Value::source(vec![4, 4]);
        let op_b = Arc::new(AddScalar {
            input: Operand::Value(a.clone()),
            constant: 1.0,
        });
        let b = Value::derived(vec![4, 4], op_b);
        let op_c = Arc::new(Scale {
            input: Operand::Value(b.clone()),
            factor: 2.0,
        });
        let c = Value::derived(vec![4, 4], op_c);

        let stages = decompose(vec![a], vec![c], &GreedyPartitioner).await.unwrap();

        let mut commander = Commander::spawn(4, 4, 1, 1);
        let mut current = commander.new_variable();
        commander
            .func(
                FuncRef::Builtin(BuiltinFn::Copy),
                vec![TaskArg::Tile(stencil_core::Tile::zeros(ndarray::IxDyn(&[4, 4])))],
                ResultVar::Single(current.clone()),
                false,
            )
            .await
            .unwrap();

        for stage in &stages {
            let sinks = run_stage_on_commander(stage, &mut commander, vec![current]).await.unwrap();
            current = sinks.into_iter().next().unwrap();
        }

        let sum = commander
            .func(FuncRef::Builtin(BuiltinFn::Sum), vec![TaskArg::Var(current)], ResultVar::None, true)
            .await
            .unwrap();
        // AddScalar(+1) on a (4,4) result triggers a (self-looping, on a
        // 1x1 mesh) halo exchange, padding it to (6,6); Scale(*2) then
        // runs over all 36 cells at value 2.0 each.
        match &sum[0] {
            stencil_runtime::TaskOutput::Scalar(x) => assert!((x - 72.0).abs() < 1e-9),
            other => panic!("expected scalar, got {other:?}"),
        }
    }
}
