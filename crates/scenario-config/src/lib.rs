#![deny(warnings)]

//! YAML-backed scenario configuration with an embedded default.

use plan_core::{
    validate_sets, ComboRequest, ScenarioSets, SimConfig, ValidationError, DEFAULT_HORIZON_YEARS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const DEFAULT_YAML: &str = include_str!("../../../assets/scenarios/default.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("yaml error: {0}")]
    Yaml(String),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e.to_string())
    }
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_YEARS
}

/// Scenario sets plus the combinations to run, loaded once per process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
    #[serde(default)]
    pub scenarios: ScenarioSets,
    #[serde(default)]
    pub combinations: Vec<ComboRequest>,
}

impl PlanConfig {
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            horizon_years: self.horizon_years,
        }
    }
}

/// Parse and validate a configuration document.
pub fn parse_yaml(text: &str) -> Result<PlanConfig, ConfigError> {
    let cfg: PlanConfig = serde_yaml::from_str(text)?;
    validate_sets(&cfg.scenarios, cfg.horizon_years)?;
    Ok(cfg)
}

/// Load a configuration file from disk.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<PlanConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let cfg = parse_yaml(&text)?;
    info!(
        path = %path.display(),
        combinations = cfg.combinations.len(),
        "loaded scenario configuration"
    );
    Ok(cfg)
}

/// The configuration compiled into the binary.
pub fn builtin() -> Result<PlanConfig, ConfigError> {
    parse_yaml(DEFAULT_YAML)
}
