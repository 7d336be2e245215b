//! Concrete array representation shared by the symbolic and runtime layers.

use ndarray::ArrayD;

/// A dense, dynamic-rank numeric array.
///
/// Worker-side tiles carry a leading `(ni, nj)` or haloed `(ni+2, nj+2)`
/// pair of dimensions followed by whatever per-cell shape the computation
/// produces (scalar fields have no trailing dims; vector/tensor fields do).
pub type Tile = ArrayD<f64>;

/// Leading two dimensions of a tile, ignoring any per-cell trailing shape.
pub fn leading_dims(tile: &Tile) -> (usize, usize) {
    let shape = tile.shape();
    (shape.first().copied().unwrap_or(0), shape.get(1).copied().unwrap_or(0))
}
