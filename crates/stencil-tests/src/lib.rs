//! Shared integration-test infrastructure: DAG/tile fixtures and a
//! once-per-binary logging initializer, used by `stencil-runtime`'s and
//! `stencil-ops`'s test suites.

pub mod fixtures;

pub use fixtures::{increment_chain, uniform_tile, Increment};

/// Initialize `tracing` for a test binary. Safe to call more than once;
/// only the first call takes effect.
pub fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,stencil_runtime=debug")),
        )
        .with_test_writer()
        .try_init();
}
