//! Ghost-cell halo exchange (spec §5.E, ported from
//! `MPI_Worker._update_result_neighbor`).
//!
//! The original posts four non-blocking sends (x-, x+, y-, y+) followed by
//! four blocking receives in the same order. Point-to-point channels here
//! play the same role as the paired `Isend`/`Recv` calls, one channel per
//! mesh edge per direction.

use crate::error::{Result, RuntimeError};
use ndarray::{s, Axis};
use stencil_core::Tile;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    XMinus,
    XPlus,
    YMinus,
    YPlus,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::XMinus,
        Direction::XPlus,
        Direction::YMinus,
        Direction::YPlus,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::XMinus => Direction::XPlus,
            Direction::XPlus => Direction::XMinus,
            Direction::YMinus => Direction::YPlus,
            Direction::YPlus => Direction::YMinus,
        }
    }
}

/// Outgoing senders (one per edge of this worker's own tile) and incoming
/// receivers (one per ghost edge this worker owns), wired up by the
/// commander at spawn time.
pub struct HaloLinks {
    pub tx: std::collections::HashMap<Direction, mpsc::Sender<Tile>>,
    pub rx: std::collections::HashMap<Direction, mpsc::Receiver<Tile>>,
}

/// True iff `result`'s leading two axes already carry a 1-cell halo, i.e.
/// it is `(ni+2, nj+2, ...)` rather than `(ni, nj, ...)` — mirrors the
/// shape check the original uses to decide whether exchange is needed.
pub fn needs_halo(result: &Tile, ni: usize, nj: usize) -> bool {
    let shape = result.shape();
    !(shape[0] == ni + 2 && shape[1] == nj + 2)
}

/// Exchange ghost cells for an interior result of shape `(ni, nj, ...)`,
/// returning the padded `(ni+2, nj+2, ...)` tile with borrowed neighbor
/// edges in place.
pub async fn exchange(interior: &Tile, links: &mut HaloLinks) -> Result<Tile> {
    let shape = interior.shape().to_vec();
    let ni = shape[0];
    let nj = shape[1];

    let x_minus_edge = interior.index_axis(Axis(0), 0).to_owned();
    let x_plus_edge = interior.index_axis(Axis(0), ni - 1).to_owned();
    let y_minus_edge = interior.index_axis(Axis(1), 0).to_owned();
    let y_plus_edge = interior.index_axis(Axis(1), nj - 1).to_owned();

    for (dir, edge) in [
        (Direction::XMinus, x_minus_edge),
        (Direction::XPlus, x_plus_edge),
        (Direction::YMinus, y_minus_edge),
        (Direction::YPlus, y_plus_edge),
    ] {
        links
            .tx
            .get(&dir)
            .ok_or_else(|| RuntimeError::Transport(format!("no halo sender for {dir:?}")))?
            .send(edge)
            .await
            .map_err(|_| RuntimeError::Transport(format!("halo peer for {dir:?} is gone")))?;
    }

    let mut received = std::collections::HashMap::new();
    for dir in Direction::ALL {
        let tile = links
            .rx
            .get_mut(&dir)
            .ok_or_else(|| RuntimeError::Transport(format!("no halo receiver for {dir:?}")))?
            .recv()
            .await
            .ok_or_else(|| RuntimeError::Transport(format!("halo peer for {dir:?} closed")))?;
        received.insert(dir, tile);
    }

    let mut padded_shape = vec![ni + 2, nj + 2];
    padded_shape.extend(&shape[2..]);
    // Matches the original's `np.ones(...)` allocation: corner ghost cells,
    // which no direction's edge ever writes, stay at 1.0 rather than 0.0.
    let mut full = Tile::from_elem(ndarray::IxDyn(&padded_shape), 1.0);
    full.slice_mut(s![1..ni + 1, 1..nj + 1, ..]).assign(interior);

    full.index_axis_mut(Axis(0), 0)
        .slice_mut(s![1..nj + 1, ..])
        .assign(&received[&Direction::XMinus]);
    full.index_axis_mut(Axis(0), ni + 1)
        .slice_mut(s![1..nj + 1, ..])
        .assign(&received[&Direction::XPlus]);
    full.index_axis_mut(Axis(1), 0)
        .slice_mut(s![1..ni + 1, ..])
        .assign(&received[&Direction::YMinus]);
    full.index_axis_mut(Axis(1), nj + 1)
        .slice_mut(s![1..ni + 1, ..])
        .assign(&received[&Direction::YPlus]);

    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_halo_detects_unpadded_result() {
        let unpadded = Tile::zeros(ndarray::IxDyn(&[4, 4]));
        let padded = Tile::zeros(ndarray::IxDyn(&[6, 6]));
        assert!(needs_halo(&unpadded, 4, 4));
        assert!(!needs_halo(&padded, 4, 4));
    }
}
