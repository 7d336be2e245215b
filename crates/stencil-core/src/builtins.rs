//! Distinguished source values visible in the symbolic world (spec §3).

use crate::value::Value;

/// The three builtin source values a DAG session can reference: a
/// zero-filled field, and the tile-local `i`/`j` coordinate fields. Their
/// runtime counterparts are the pre-registered worker variables keyed
/// `"_z"`, `"i"`, `"j"`.
#[derive(Debug, Clone)]
pub struct BuiltinSources {
    pub zero: Value,
    pub i: Value,
    pub j: Value,
}

impl BuiltinSources {
    /// Create a fresh set of builtin sources for a DAG session over a grid
    /// of the given (haloed) tile shape.
    pub fn new(shape: impl Into<Vec<usize>> + Clone) -> Self {
        Self {
            zero: Value::labeled_source(shape.clone(), "_z"),
            i: Value::labeled_source(shape.clone(), "i"),
            j: Value::labeled_source(shape, "j"),
        }
    }
}
