//! Process-mesh topology: tile ranges and toroidal neighbor ranks
//! (spec §5.E, ported from `MPI_Commander._i_ranges` / neighbor computation).

/// Half-open `[start, end)` index range along one grid axis assigned to one
/// row or column of the process mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub start: usize,
    pub end: usize,
}

impl AxisRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `n` grid cells into `procs` near-equal contiguous ranges using the
/// same rounding rule as the original (`round(n / procs * k)` boundaries),
/// which load-balances remainders across the leading processes.
pub fn axis_ranges(n: usize, procs: usize) -> Vec<AxisRange> {
    let n = n as f64;
    let procs_f = procs as f64;
    let boundaries: Vec<usize> = (0..=procs)
        .map(|k| (n / procs_f * k as f64).round() as usize)
        .collect();
    boundaries
        .windows(2)
        .map(|w| AxisRange {
            start: w[0],
            end: w[1],
        })
        .collect()
}

/// Four toroidal neighbor ranks of worker `(i, j)` on a `ni_proc x nj_proc`
/// mesh, in `(x_minus, x_plus, y_minus, y_plus)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborRanks {
    pub x_minus: usize,
    pub x_plus: usize,
    pub y_minus: usize,
    pub y_plus: usize,
}

pub fn rank_of(i: usize, j: usize, nj_proc: usize) -> usize {
    i * nj_proc + j
}

pub fn neighbor_ranks(i: usize, j: usize, ni_proc: usize, nj_proc: usize) -> NeighborRanks {
    let x_minus = rank_of((i + ni_proc - 1) % ni_proc, j, nj_proc);
    let x_plus = rank_of((i + 1) % ni_proc, j, nj_proc);
    let y_minus = rank_of(i, (j + nj_proc - 1) % nj_proc, nj_proc);
    let y_plus = rank_of(i, (j + 1) % nj_proc, nj_proc);
    NeighborRanks {
        x_minus,
        x_plus,
        y_minus,
        y_plus,
    }
}
