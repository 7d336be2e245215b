//! Runtime configuration for the CLI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration controlling the grid size, process mesh shape, and the
/// external partitioner binary used by the `decompose`/`run-demo`
/// subcommands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Number of interior rows in the logical grid.
    #[serde(default = "default_ni")]
    pub ni: usize,
    /// Number of interior columns in the logical grid.
    #[serde(default = "default_nj")]
    pub nj: usize,
    /// Process mesh rows.
    #[serde(default = "default_procs")]
    pub ni_proc: usize,
    /// Process mesh columns.
    #[serde(default = "default_procs")]
    pub nj_proc: usize,
    /// Path to an external partitioner binary. When absent, the in-process
    /// greedy partitioner is used instead.
    pub partitioner_binary: Option<PathBuf>,
    /// `tracing` env-filter directive, e.g. `"info"` or `"stencil_runtime=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ni() -> usize {
    8
}

fn default_nj() -> usize {
    8
}

fn default_procs() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ni: default_ni(),
            nj: default_nj(),
            ni_proc: default_procs(),
            nj_proc: default_procs(),
            partitioner_binary: None,
            log_level: default_log_level(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the user config directory, falling back to
    /// defaults when no file is present or it fails to parse.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("engine", "stencil", "stencil-cli")
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_a_square_process_mesh() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.ni_proc, cfg.nj_proc);
        assert!(cfg.partitioner_binary.is_none());
    }
}
