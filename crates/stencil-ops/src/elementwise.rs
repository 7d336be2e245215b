//! Elementwise operations with no neighbor access.

use stencil_core::{GraphError, Operand, Operation, Tile};

/// `y = x + c`.
#[derive(Debug)]
pub struct AddScalar {
    pub input: Operand,
    pub constant: f64,
}

impl Operation for AddScalar {
    fn inputs(&self) -> &[Operand] {
        std::slice::from_ref(&self.input)
    }

    fn access_neighbor(&self) -> bool {
        false
    }

    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError> {
        Ok(&inputs[0] + self.constant)
    }
}

/// `y = c * x`.
#[derive(Debug)]
pub struct Scale {
    pub input: Operand,
    pub factor: f64,
}

impl Operation for Scale {
    fn inputs(&self) -> &[Operand] {
        std::slice::from_ref(&self.input)
    }

    fn access_neighbor(&self) -> bool {
        false
    }

    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError> {
        Ok(&inputs[0] * self.factor)
    }
}

/// `y = sin(x)`.
#[derive(Debug)]
pub struct Sine {
    pub input: Operand,
}

impl Operation for Sine {
    fn inputs(&self) -> &[Operand] {
        std::slice::from_ref(&self.input)
    }

    fn access_neighbor(&self) -> bool {
        false
    }

    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError> {
        Ok(inputs[0].mapv(f64::sin))
    }
}

/// `y = x + z` elementwise, both operands the same shape.
#[derive(Debug)]
pub struct Add {
    pub inputs: [Operand; 2],
}

impl Add {
    pub fn new(lhs: Operand, rhs: Operand) -> Self {
        Self { inputs: [lhs, rhs] }
    }
}

impl Operation for Add {
    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn access_neighbor(&self) -> bool {
        false
    }

    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError> {
        Ok(&inputs[0] + &inputs[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::Value;

    #[test]
    fn add_scalar_shifts_every_cell() {
        let src = Value::source(vec![2, 2]);
        let op = AddScalar {
            input: Operand::Value(src),
            constant: 1.0,
        };
        let tile = Tile::from_elem(ndarray::IxDyn(&[2, 2]), 3.0);
        let out = op.perform(vec![tile]).unwrap();
        assert!(out.iter().all(|&x| x == 4.0));
    }
}
