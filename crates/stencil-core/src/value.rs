//! Symbolic DAG node model (spec §3, §4.A).

use crate::error::GraphError;
use crate::tile::Tile;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One operand of an [`Operation`]: either a symbolic [`Value`] that must be
/// resolved through a stage's symbol table, or a raw constant tile baked
/// directly into the graph. Distinguishing the two explicitly replaces the
/// original implementation's `hasattr`-based reflection (spec §9).
#[derive(Clone, Debug)]
pub enum Operand {
    Value(Value),
    Const(Tile),
}

impl Operand {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(v) => Some(v),
            Operand::Const(_) => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<Tile> for Operand {
    fn from(t: Tile) -> Self {
        Operand::Const(t)
    }
}

/// A producer of one [`Value`]. Operations are polymorphic over the
/// capability set the spec requires: `inputs`, `access_neighbor`, `perform`.
pub trait Operation: fmt::Debug + Send + Sync {
    /// Ordered operands consumed by this operation.
    fn inputs(&self) -> &[Operand];

    /// True iff evaluating this operation reads cells beyond the tile being
    /// written — i.e. this is a stencil operation.
    fn access_neighbor(&self) -> bool;

    /// Evaluate the operation given concrete tiles, one per entry of
    /// `inputs()`, in the same order.
    fn perform(&self, inputs: Vec<Tile>) -> Result<Tile, GraphError>;
}

struct ValueInner {
    shape: Vec<usize>,
    owner: Option<Arc<dyn Operation>>,
    label: Option<String>,
}

/// Immutable node of the symbolic DAG.
///
/// Two `Value`s are distinct iff they are distinct object identities;
/// structural equality (same shape, same owner) is never used — cloning a
/// `Value` shares its identity, it does not produce an equal-but-distinct
/// node.
#[derive(Clone)]
pub struct Value(Arc<ValueInner>);

impl Value {
    /// Construct a source value (no owner) — externally supplied.
    pub fn source(shape: impl Into<Vec<usize>>) -> Self {
        Self(Arc::new(ValueInner {
            shape: shape.into(),
            owner: None,
            label: None,
        }))
    }

    /// Construct a source value with a debug label (used for the builtin
    /// `ZERO`/`I`/`J` values and in test fixtures).
    pub fn labeled_source(shape: impl Into<Vec<usize>>, label: impl Into<String>) -> Self {
        Self(Arc::new(ValueInner {
            shape: shape.into(),
            owner: None,
            label: Some(label.into()),
        }))
    }

    /// Construct a derived value produced by `owner`.
    pub fn derived(shape: impl Into<Vec<usize>>, owner: Arc<dyn Operation>) -> Self {
        Self(Arc::new(ValueInner {
            shape: shape.into(),
            owner: Some(owner),
            label: None,
        }))
    }

    pub fn shape(&self) -> &[usize] {
        &self.0.shape
    }

    pub fn ndim(&self) -> usize {
        self.0.shape.len()
    }

    pub fn size(&self) -> usize {
        if self.0.shape.is_empty() {
            1
        } else {
            self.0.shape.iter().product()
        }
    }

    pub fn owner(&self) -> Option<&Arc<dyn Operation>> {
        self.0.owner.as_ref()
    }

    pub fn is_source(&self) -> bool {
        self.0.owner.is_none()
    }

    /// Pointer identity, usable as a stable key in maps keyed by `Value`.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0.label, &self.0.owner) {
            (Some(label), _) => write!(f, "Value({label}, shape={:?})", self.0.shape),
            (None, Some(owner)) => {
                write!(f, "Value(shape={:?}, owner={:?})", self.0.shape, owner)
            }
            (None, None) => write!(f, "Value(shape={:?}, source)", self.0.shape),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_identity_even_with_same_shape() {
        let a = Value::source(vec![4, 4]);
        let b = Value::source(vec![4, 4]);
        assert_ne!(a, b, "structurally identical sources must still be distinct");
        assert_eq!(a.clone(), a, "cloning shares identity");
    }

    #[test]
    fn ndim_and_size() {
        let scalar = Value::source(vec![]);
        assert_eq!(scalar.ndim(), 0);
        assert_eq!(scalar.size(), 1);

        let grid = Value::source(vec![8, 8]);
        assert_eq!(grid.ndim(), 2);
        assert_eq!(grid.size(), 64);
    }
}
