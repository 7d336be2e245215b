//! Neighbor-accessing (stencil) operations. Inputs are expected to already
//! carry a 1-cell halo, i.e. shape `(ni+2, nj+2, ...)`; outputs are
//! interior-only, `(ni, nj, ...)`, so the runtime knows to halo-exchange
//! the result before it can feed another stencil operation.

use stencil_core::{GraphError, Operand, Operation, Tile};

/// Five-point Laplacian-style average: each interior cell becomes the mean
/// of itself and its four von Neumann neighbors.
#[derive(Debug)]
pub struct FivePointAverage {
    pub input: Operand,
}

impl Operation for FivePointAverage {
    fn inputs(&self) -> &[Operand] {
        std::slice::from_ref(&self.input)
    }

    fn access_neighbor(&self) -> bool {
        true
    }

    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError> {
        let padded = &inputs[0];
        let shape = padded.shape();
        if shape.len() != 2 {
            return Err(GraphError::ShapeMismatch {
                value: "FivePointAverage input".into(),
                expected: vec![0, 0],
                got: shape.to_vec(),
            });
        }
        let (ni_p, nj_p) = (shape[0], shape[1]);
        let ni = ni_p - 2;
        let nj = nj_p - 2;
        let mut out = Tile::zeros(ndarray::IxDyn(&[ni, nj]));
        for a in 0..ni {
            for b in 0..nj {
                let (i, j) = (a + 1, b + 1);
                let center = padded[[i, j]];
                let sum = center
                    + padded[[i - 1, j]]
                    + padded[[i + 1, j]]
                    + padded[[i, j - 1]]
                    + padded[[i, j + 1]];
                out[[a, b]] = sum / 5.0;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::Value;

    #[test]
    fn averages_a_uniform_field_to_itself() {
        let src = Value::source(vec![4, 4]);
        let op = FivePointAverage {
            input: Operand::Value(src),
        };
        let padded = Tile::from_elem(ndarray::IxDyn(&[4, 4]), 2.0);
        let out = op.perform(vec![padded]).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert!(out.iter().all(|&x| (x - 2.0).abs() < 1e-12));
    }
}
