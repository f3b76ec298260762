//! Configuration for Simulation
//!
//! Defines where packs and run bundles live, the region rows are written
//! under, and the market levels used to seed the first year. Everything
//! has a default, so a config file only needs the keys it changes.

//-----------------------------------------------------------------------------
// Configuration Structures
//-----------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use agent_zero_engine::MarketDefaults;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimulationError, SimulationResult};

pub const ASSUMPTIONS_PACKS_DIR: &str = "assumptions_packs";
pub const SCENARIO_PACKS_DIR: &str = "scenario_packs";

/// Settings shared by every CLI command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Root holding `assumptions_packs/` and `scenario_packs/`.
    pub data_dir: PathBuf,
    /// Where run bundles are written.
    pub runs_dir: PathBuf,
    /// Region the agent roster is placed in and result rows are labelled with.
    pub region: String,
    /// Recorded in manifests and hashed into run ids.
    pub engine_version: String,
    pub defaults: MarketDefaults,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            runs_dir: PathBuf::from("runs"),
            region: agent_zero_engine::init::DEFAULT_REGION.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            defaults: MarketDefaults::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(content: &str) -> SimulationResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> SimulationResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| SimulationError::io(path, e))?;
        debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> SimulationResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn assumptions_pack_dir(&self, name: &str) -> PathBuf {
        self.data_dir.join(ASSUMPTIONS_PACKS_DIR).join(name)
    }

    pub fn scenario_pack_dir(&self, name: &str) -> PathBuf {
        self.data_dir.join(SCENARIO_PACKS_DIR).join(name)
    }
}
