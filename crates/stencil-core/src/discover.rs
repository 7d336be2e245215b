//! DAG discovery and topological sort (spec §4.B).

use crate::error::GraphError;
use crate::value::{Operand, Value};
use std::collections::HashSet;
use tracing::trace;

/// Result of walking a DAG from its sinks back to its sources.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Owned (derived) values reachable from the sinks, in discovery order.
    pub internal: Vec<Value>,
    /// Unowned values reachable from the sinks that are not formal sources
    /// — they enter the computation "from the side".
    pub tributaries: Vec<Value>,
}

/// Walk the DAG starting from each sink, recording every reachable
/// [`Value`] as internal (owned) or tributary (unowned, not a source), and
/// stopping at the boundary formed by `sources`.
pub fn discover(sources: &[Value], sinks: &[Value]) -> Discovery {
    let source_set: HashSet<Value> = sources.iter().cloned().collect();
    let mut internal = Vec::new();
    let mut internal_set: HashSet<Value> = HashSet::new();
    let mut tributaries = Vec::new();
    let mut tributary_set: HashSet<Value> = HashSet::new();

    fn visit(
        v: &Value,
        source_set: &HashSet<Value>,
        internal: &mut Vec<Value>,
        internal_set: &mut HashSet<Value>,
        tributaries: &mut Vec<Value>,
        tributary_set: &mut HashSet<Value>,
    ) {
        if source_set.contains(v) {
            return;
        }
        match v.owner() {
            None => {
                if tributary_set.insert(v.clone()) {
                    tributaries.push(v.clone());
                }
            }
            Some(owner) => {
                if !internal_set.insert(v.clone()) {
                    return;
                }
                internal.push(v.clone());
                for operand in owner.inputs() {
                    if let Operand::Value(v_inp) = operand {
                        visit(
                            v_inp,
                            source_set,
                            internal,
                            internal_set,
                            tributaries,
                            tributary_set,
                        );
                    }
                }
            }
        }
    }

    for sink in sinks {
        visit(
            sink,
            &source_set,
            &mut internal,
            &mut internal_set,
            &mut tributaries,
            &mut tributary_set,
        );
    }

    trace!(
        internal = internal.len(),
        tributaries = tributaries.len(),
        "discovered DAG closure"
    );

    Discovery {
        internal,
        tributaries,
    }
}

/// Topologically sort `unsorted` given the already-known (computable)
/// values in `known`. A value is computable once every operand of its
/// owner is either a raw constant, already in `known`, or an unowned
/// source/tributary.
///
/// Progress is required on every pass; a pass that extracts nothing while
/// `unsorted` is still non-empty means the DAG is malformed (a cycle), and
/// is reported as [`GraphError::Cycle`].
pub fn topo_sort(known: &[Value], mut unsorted: Vec<Value>) -> Result<Vec<Value>, GraphError> {
    let mut known_set: HashSet<Value> = known.iter().cloned().collect();
    let mut sorted = Vec::with_capacity(unsorted.len());

    let is_computable = |operand: &Operand, known_set: &HashSet<Value>| match operand {
        Operand::Const(_) => true,
        Operand::Value(v) => known_set.contains(v) || v.is_source(),
    };

    while !unsorted.is_empty() {
        let mut ready_idx = Vec::new();
        for (idx, v) in unsorted.iter().enumerate() {
            let owner = match v.owner() {
                Some(o) => o,
                None => {
                    // An unowned value should never reach here via normal
                    // discovery (it would have been classified as a
                    // tributary), but treat it as immediately computable.
                    ready_idx.push(idx);
                    continue;
                }
            };
            if owner.inputs().iter().all(|op| is_computable(op, &known_set)) {
                ready_idx.push(idx);
            }
        }

        if ready_idx.is_empty() {
            return Err(GraphError::Cycle(unsorted.len()));
        }

        // Extract ready values in reverse index order so earlier indices
        // remain valid, preserving original relative (insertion) order
        // among the values actually removed.
        let mut removed = Vec::with_capacity(ready_idx.len());
        for &idx in ready_idx.iter().rev() {
            removed.push(unsorted.remove(idx));
        }
        removed.reverse();

        for v in removed {
            known_set.insert(v.clone());
            sorted.push(v);
        }
    }

    Ok(sorted)
}
