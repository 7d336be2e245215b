//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Decompose a built-in demo DAG into atomic stages and print the
    /// boundaries the partitioner chose.
    Decompose {
        /// Number of elementwise operations chained in the demo DAG.
        #[arg(short, long, default_value_t = 3)]
        chain_length: usize,
    },

    /// Run a built-in demo computation end-to-end across an in-process
    /// worker mesh and print the resulting reduction.
    RunDemo {
        /// Number of elementwise operations chained in the demo DAG.
        #[arg(short, long, default_value_t = 3)]
        chain_length: usize,
    },

    /// Validate a runtime configuration file.
    Validate {
        /// Path to a YAML configuration file.
        path: PathBuf,
    },
}
