//! `polaris.toml` configuration

use anyhow::Context;
use polaris_compose::DEFAULT_VERSION;
use polaris_simulate::{SimulationParams, DEFAULT_RUNS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when none is named
pub(crate) const DEFAULT_CONFIG_FILE: &str = "polaris.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PolarisConfig {
    /// Directory of governance object JSON files
    pub(crate) memory_dir: PathBuf,
    /// Module version selected by `compose`
    pub(crate) default_version: String,
    /// Simulation defaults
    pub(crate) simulation: SimulationConfig,
}

impl Default for PolarisConfig {
    fn default() -> Self {
        Self {
            memory_dir: PathBuf::from("memory"),
            default_version: DEFAULT_VERSION.to_string(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// `[simulation]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SimulationConfig {
    /// Monte-Carlo runs
    pub(crate) runs: usize,
    /// Fixed base seed
    pub(crate) seed: Option<u64>,
    /// Per-task model
    #[serde(flatten)]
    pub(crate) params: SimulationParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            seed: None,
            params: SimulationParams::default(),
        }
    }
}

impl PolarisConfig {
    /// Parse a TOML document
    pub(crate) fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid polaris configuration")
    }

    /// Load the named file, or `polaris.toml` if present, or defaults
    pub(crate) fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    tracing::debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(PolarisConfig::from_toml("").unwrap(), PolarisConfig::default());
    }

    #[test]
    fn simulation_table_overrides_params() {
        let config = PolarisConfig::from_toml(
            r#"
            memory_dir = "library/denpasar_v1"
            default_version = "v2"

            [simulation]
            runs = 250
            seed = 9
            task_duration_range = [3, 7]
            failure_rate = 0.25
            max_feedback_loops = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.memory_dir, PathBuf::from("library/denpasar_v1"));
        assert_eq!(config.default_version, "v2");
        assert_eq!(config.simulation.runs, 250);
        assert_eq!(config.simulation.seed, Some(9));
        assert_eq!(config.simulation.params.task_duration_range, (3, 7));
        assert_eq!(config.simulation.params.max_feedback_loops, 4);
        assert_eq!(config.simulation.params.override_days, 45);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PolarisConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polaris.toml");
        fs::write(&path, "[simulation]\nruns = 10\n").unwrap();
        assert_eq!(PolarisConfig::load(Some(&path)).unwrap().simulation.runs, 10);
    }
}
