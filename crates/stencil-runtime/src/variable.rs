//! Worker-side variable handles (spec §5.E, §9 "commander-scoped counter").
//!
//! The original Python keeps a process-wide class-level counter on
//! `WorkerVariable`, which would leak identity across independent
//! `MPI_Commander` instances in the same process. Each [`Commander`] here
//! owns its own counter instead, so two commanders never collide on keys.
//!
//! [`Commander`]: crate::commander::Commander

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Key identifying a value stored in every worker's variable table.
///
/// Predefined keys (`"_z"`, `"i"`, `"j"`) are shared across all commanders;
/// generated keys are namespaced by the owning commander's id to keep two
/// commanders' auto-generated keys from colliding if ever compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarKey {
    Named(&'static str),
    Generated { commander_id: u64, seq: u64 },
}

impl VarKey {
    pub const ZERO: VarKey = VarKey::Named("_z");
    pub const I: VarKey = VarKey::Named("i");
    pub const J: VarKey = VarKey::Named("j");
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Named(name) => write!(f, "{name}"),
            VarKey::Generated { commander_id, seq } => write!(f, "c{commander_id}#{seq}"),
        }
    }
}

/// Monotonic key generator, one per [`Commander`](crate::commander::Commander).
#[derive(Debug)]
pub struct VarKeyGenerator {
    commander_id: u64,
    next: AtomicU64,
}

impl VarKeyGenerator {
    pub fn new(commander_id: u64) -> Self {
        Self {
            commander_id,
            next: AtomicU64::new(0),
        }
    }

    pub fn next_key(&self) -> VarKey {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        VarKey::Generated {
            commander_id: self.commander_id,
            seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique_and_scoped() {
        let gen_a = VarKeyGenerator::new(1);
        let gen_b = VarKeyGenerator::new(2);
        let a0 = gen_a.next_key();
        let a1 = gen_a.next_key();
        let b0 = gen_b.next_key();
        assert_ne!(a0, a1);
        assert_ne!(a0, b0);
    }
}
