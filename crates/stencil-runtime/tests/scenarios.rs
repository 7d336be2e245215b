//! End-to-end commander/worker scenarios (spec §8).

use stencil_core::Tile;
use stencil_runtime::{BuiltinFn, Commander, FuncRef, ResultVar, TaskArg, TaskOutput};
use std::sync::Arc;

fn scalar(output: &TaskOutput) -> f64 {
    match output {
        TaskOutput::Scalar(x) => *x,
        other => panic!("expected scalar output, got {other:?}"),
    }
}

fn tile(output: TaskOutput) -> Tile {
    match output {
        TaskOutput::Tile(t) => t,
        other => panic!("expected tile output, got {other:?}"),
    }
}

#[tokio::test]
async fn halo_exchange_fills_ghosts_from_neighbor_interior() {
    stencil_tests::init_test_logging();

    // (4, 8, 1, 2): one row of workers, two columns, so each worker's
    // y-neighbors wrap toroidally to the other worker.
    let mut commander = Commander::spawn(4, 8, 1, 2);
    commander
        .set_custom_func(
            "trim_interior",
            Arc::new(|tiles: &[Tile]| {
                let j = &tiles[0];
                let (ni_p, nj_p) = (j.shape()[0], j.shape()[1]);
                let interior = j.slice(ndarray::s![1..ni_p - 1, 1..nj_p - 1]).to_owned();
                Ok(TaskOutput::Tile(interior))
            }),
        )
        .await
        .unwrap();

    let v = commander.new_variable();
    commander
        .func(
            FuncRef::Named("trim_interior".into()),
            vec![TaskArg::Var(stencil_runtime::VarKey::J)],
            ResultVar::Single(v.clone()),
            false,
        )
        .await
        .unwrap();

    let stored = commander
        .func(
            FuncRef::Builtin(BuiltinFn::Copy),
            vec![TaskArg::Var(v)],
            ResultVar::None,
            true,
        )
        .await
        .unwrap();

    let worker0 = tile(stored[0].clone());
    let worker1 = tile(stored[1].clone());
    assert_eq!(worker0.shape(), &[6, 6]);

    // worker0's y_plus ghost (global j=4) equals worker1's leftmost
    // interior column (also global j=4).
    assert_eq!(worker0[[3, 5]], 4.0);
    // worker0's y_minus ghost wraps toroidally to worker1's rightmost
    // interior column (global j=7).
    assert_eq!(worker0[[3, 0]], 7.0);
    // worker1's y_minus ghost equals worker0's rightmost interior column
    // (global j=3).
    assert_eq!(worker1[[3, 0]], 3.0);
}

#[tokio::test]
async fn add_one_yields_expected_per_worker_sums() {
    let mut commander = Commander::spawn(8, 8, 2, 2);
    commander
        .set_custom_func(
            "add_one",
            Arc::new(|tiles: &[Tile]| Ok(TaskOutput::Tile(&tiles[0] + 1.0))),
        )
        .await
        .unwrap();

    let ip1 = commander.new_variable();
    commander
        .func(
            FuncRef::Named("add_one".into()),
            vec![TaskArg::Var(stencil_runtime::VarKey::I)],
            ResultVar::Single(ip1.clone()),
            false,
        )
        .await
        .unwrap();

    let sums = commander
        .func(
            FuncRef::Builtin(BuiltinFn::Sum),
            vec![TaskArg::Var(ip1)],
            ResultVar::None,
            true,
        )
        .await
        .unwrap();

    let sums: Vec<f64> = sums.iter().map(scalar).collect();
    assert_eq!(sums, vec![90.0, 90.0, 234.0, 234.0]);
}

#[tokio::test]
async fn double_triple_stores_a_tuple_result() {
    let mut commander = Commander::spawn(8, 8, 2, 2);
    commander
        .set_custom_func(
            "double_triple",
            Arc::new(|tiles: &[Tile]| {
                Ok(TaskOutput::Tuple(vec![
                    TaskOutput::Tile(&tiles[0] * 2.0),
                    TaskOutput::Tile(&tiles[0] * 3.0),
                ]))
            }),
        )
        .await
        .unwrap();

    let j_double = commander.new_variable();
    let j_triple = commander.new_variable();
    commander
        .func(
            FuncRef::Named("double_triple".into()),
            vec![TaskArg::Var(stencil_runtime::VarKey::J)],
            ResultVar::Tuple(vec![j_double.clone(), j_triple.clone()]),
            false,
        )
        .await
        .unwrap();

    let double_max = commander
        .func(
            FuncRef::Builtin(BuiltinFn::Max),
            vec![TaskArg::Var(j_double)],
            ResultVar::None,
            true,
        )
        .await
        .unwrap();
    let triple_max = commander
        .func(
            FuncRef::Builtin(BuiltinFn::Max),
            vec![TaskArg::Var(j_triple)],
            ResultVar::None,
            true,
        )
        .await
        .unwrap();

    assert_eq!(
        double_max.iter().map(scalar).collect::<Vec<_>>(),
        vec![8.0, 16.0, 8.0, 16.0]
    );
    assert_eq!(
        triple_max.iter().map(scalar).collect::<Vec<_>>(),
        vec![12.0, 24.0, 12.0, 24.0]
    );
}

#[tokio::test]
async fn non_uniform_scatter_applies_distinct_constants_per_worker() {
    let mut commander = Commander::spawn(4, 8, 1, 2);
    commander
        .set_custom_func(
            "make_worker_variable",
            Arc::new(|tiles: &[Tile]| {
                // z.reshape(z.shape + (1,) * x.ndim) + x, written out as an
                // explicit outer broadcast since both ranks are dynamic.
                let z = &tiles[0];
                let x = &tiles[1];
                let (a, b) = (z.shape()[0], z.shape()[1]);
                let (c, d) = (x.shape()[0], x.shape()[1]);
                let mut out = Tile::zeros(ndarray::IxDyn(&[a, b, c, d]));
                for i in 0..a {
                    for j in 0..b {
                        let z_ij = z[[i, j]];
                        for k in 0..c {
                            for l in 0..d {
                                out[[i, j, k, l]] = z_ij + x[[k, l]];
                            }
                        }
                    }
                }
                Ok(TaskOutput::Tile(out))
            }),
        )
        .await
        .unwrap();

    let z34 = commander.new_variable();
    let worker0_const = Tile::zeros(ndarray::IxDyn(&[3, 4]));
    let worker1_const = Tile::ones(ndarray::IxDyn(&[3, 4]));
    commander
        .func_nonuniform_args(
            FuncRef::Named("make_worker_variable".into()),
            vec![
                vec![TaskArg::Var(stencil_runtime::VarKey::ZERO), TaskArg::Tile(worker0_const)],
                vec![TaskArg::Var(stencil_runtime::VarKey::ZERO), TaskArg::Tile(worker1_const)],
            ],
            ResultVar::Single(z34.clone()),
            false,
        )
        .await
        .unwrap();

    let max = commander
        .func(
            FuncRef::Builtin(BuiltinFn::Max),
            vec![TaskArg::Var(z34.clone())],
            ResultVar::None,
            true,
        )
        .await
        .unwrap();
    let min = commander
        .func(
            FuncRef::Builtin(BuiltinFn::Min),
            vec![TaskArg::Var(z34)],
            ResultVar::None,
            true,
        )
        .await
        .unwrap();

    assert_eq!(scalar(&max[0]), 0.0);
    assert_eq!(scalar(&min[0]), 0.0);
    assert_eq!(scalar(&max[1]), 1.0);
    assert_eq!(scalar(&min[1]), 1.0);
}

#[tokio::test]
async fn elementwise_then_copy_matches_expected_maxima() {
    let mut commander = Commander::spawn(4, 8, 1, 2);
    let v = commander.new_variable();
    commander
        .func(
            FuncRef::Builtin(BuiltinFn::Sin),
            vec![TaskArg::Var(stencil_runtime::VarKey::J)],
            ResultVar::Single(v.clone()),
            false,
        )
        .await
        .unwrap();
    commander
        .func(
            FuncRef::Builtin(BuiltinFn::Copy),
            vec![TaskArg::Var(v.clone())],
            ResultVar::Single(v.clone()),
            false,
        )
        .await
        .unwrap();

    let max = commander
        .func(FuncRef::Builtin(BuiltinFn::Max), vec![TaskArg::Var(v)], ResultVar::None, true)
        .await
        .unwrap();

    let max: Vec<f64> = max.iter().map(scalar).collect();
    assert!((max[0] - 0.909_297_426_825_681_7).abs() < 1e-9);
    assert!((max[1] - 0.989_358_246_623_381_8).abs() < 1e-9);
}
