//! Assumptions and scenario packs on disk
//!
//! A pack is a directory holding a `manifest.yaml` plus CSV tables.
//! Assumptions packs carry `assumptions.csv` and `policy.csv`; scenario
//! packs carry `scenario.yaml` and `patches.csv`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use agent_zero_engine::{AssumptionRow, AssumptionsTable, PolicyRow, PolicyTable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimulationError, SimulationResult};
use crate::patches::Patch;

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const ASSUMPTIONS_FILE: &str = "assumptions.csv";
pub const POLICY_FILE: &str = "policy.csv";
pub const SCENARIO_FILE: &str = "scenario.yaml";
pub const PATCHES_FILE: &str = "patches.csv";

/// Kind of pack declared by a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackKind {
    Assumptions,
    Scenario,
}

/// Contents of `manifest.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackManifest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub pack_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PackManifest {
    pub fn kind(&self) -> SimulationResult<PackKind> {
        match self.pack_type.as_deref() {
            Some("assumptions") => Ok(PackKind::Assumptions),
            Some("scenario") => Ok(PackKind::Scenario),
            other => Err(SimulationError::UnknownPackType(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Hash recorded in the manifest, or `NA` when the pack has none.
    pub fn hash_or_na(&self) -> &str {
        self.hash.as_deref().unwrap_or("NA")
    }
}

/// Baseline assumptions and policy.
#[derive(Debug, Clone)]
pub struct AssumptionsPack {
    pub manifest: PackManifest,
    pub assumptions: AssumptionsTable,
    pub policy: PolicyTable,
    pub dir: PathBuf,
}

/// A named set of patches on top of a baseline.
#[derive(Debug, Clone)]
pub struct ScenarioPack {
    pub manifest: PackManifest,
    pub scenario: serde_yaml::Value,
    pub patches: Vec<Patch>,
    pub dir: PathBuf,
}

pub fn load_manifest(pack_dir: &Path) -> SimulationResult<PackManifest> {
    read_yaml(&pack_dir.join(MANIFEST_FILE))
}

pub fn load_assumptions_pack(pack_dir: &Path) -> SimulationResult<AssumptionsPack> {
    let manifest = load_manifest(pack_dir)?;
    let assumptions: Vec<AssumptionRow> = read_csv(&pack_dir.join(ASSUMPTIONS_FILE))?;
    let policy: Vec<PolicyRow> = read_csv(&pack_dir.join(POLICY_FILE))?;
    debug!(
        pack = %pack_dir.display(),
        assumptions = assumptions.len(),
        policy = policy.len(),
        "loaded assumptions pack"
    );
    Ok(AssumptionsPack {
        manifest,
        assumptions: AssumptionsTable::new(assumptions),
        policy: PolicyTable::new(policy),
        dir: pack_dir.to_path_buf(),
    })
}

pub fn load_scenario_pack(pack_dir: &Path) -> SimulationResult<ScenarioPack> {
    let manifest = load_manifest(pack_dir)?;
    let scenario: serde_yaml::Value = read_yaml(&pack_dir.join(SCENARIO_FILE))?;
    let patches: Vec<Patch> = read_csv(&pack_dir.join(PATCHES_FILE))?;
    debug!(pack = %pack_dir.display(), patches = patches.len(), "loaded scenario pack");
    Ok(ScenarioPack {
        manifest,
        scenario,
        patches,
        dir: pack_dir.to_path_buf(),
    })
}

/// Read every record of a headed CSV file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> SimulationResult<Vec<T>> {
    let file = File::open(path).map_err(|e| SimulationError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Write records to a headed CSV file, creating parent directories.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> SimulationResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SimulationError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SimulationError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| SimulationError::io(path, e))?;
    Ok(())
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> SimulationResult<T> {
    let content = fs::read_to_string(path).map_err(|e| SimulationError::io(path, e))?;
    Ok(serde_yaml::from_str(&content)?)
}
