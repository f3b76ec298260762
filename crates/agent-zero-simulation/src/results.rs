//! Run bundles
//!
//! A finished run is written to `<out>/<run_id>/` as four files:
//! `timeseries.csv`, `agent_states.csv`, `summary.json` and `manifest.yaml`.
//! Nested values in `agent_states.csv` are JSON-encoded into single cells.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use agent_zero_engine::{commodity, Action, History, RunSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SimulationError, SimulationResult};
use crate::packs::{write_csv, PackManifest};

pub const TIMESERIES_FILE: &str = "timeseries.csv";
pub const AGENT_STATES_FILE: &str = "agent_states.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const RUN_MANIFEST_FILE: &str = "manifest.yaml";

/// One year x region x commodity observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRow {
    pub year: i32,
    pub region: String,
    pub commodity: String,
    pub price: f64,
    pub demand: Option<f64>,
    pub supply: Option<f64>,
    pub emissions: f64,
}

/// One year x agent observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStateRow {
    pub year: i32,
    pub agent_id: String,
    pub agent_type: String,
    pub region: String,
    pub sector: Option<String>,
    pub tech: Option<String>,
    pub capacity: f64,
    pub investment: f64,
    pub expected_price: Option<f64>,
    pub action: String,
    pub action_inputs: Option<String>,
    pub state_before: Option<String>,
    pub state_after: Option<String>,
}

/// Flows of an action without its trace.
#[derive(Serialize)]
struct ActionFlows<'a> {
    supply: &'a BTreeMap<String, f64>,
    invest: &'a BTreeMap<String, f64>,
    retire: &'a BTreeMap<String, f64>,
    emissions: f64,
}

impl<'a> From<&'a Action> for ActionFlows<'a> {
    fn from(action: &'a Action) -> Self {
        Self {
            supply: &action.supply,
            invest: &action.invest,
            retire: &action.retire,
            emissions: action.emissions,
        }
    }
}

/// Provenance written to the run's `manifest.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub run_timestamp: DateTime<Utc>,
    pub engine_version: String,
    pub seed: u64,
    pub years: Vec<i32>,
    pub assumptions: PackManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<PackManifest>,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunBundleSummary {
    pub run_id: String,
    pub created: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: RunSummary,
}

pub fn timeseries_rows(history: &History, region: &str) -> Vec<TimeseriesRow> {
    let mut rows = Vec::new();
    for entry in history {
        let world = &entry.world;
        for (name, price) in &world.prices {
            rows.push(TimeseriesRow {
                year: world.t,
                region: region.to_string(),
                commodity: name.clone(),
                price: *price,
                demand: world.demand.get(name).copied(),
                supply: world.flows.get(&commodity::supply_flow(name)).copied(),
                emissions: world.emissions,
            });
        }
    }
    rows
}

pub fn agent_state_rows(history: &History) -> SimulationResult<Vec<AgentStateRow>> {
    let mut rows = Vec::new();
    for entry in history {
        for agent in &entry.agents {
            let action = entry.actions.iter().find(|a| a.agent_id == agent.id);
            rows.push(AgentStateRow {
                year: entry.world.t,
                agent_id: agent.id.clone(),
                agent_type: agent.agent_type.to_string(),
                region: agent.region.clone(),
                sector: agent.sector.clone(),
                tech: agent.tech.clone(),
                capacity: agent.capacity,
                investment: action.map_or(0.0, Action::total_investment),
                expected_price: action.and_then(|a| a.expected_price),
                action: match action {
                    Some(a) => serde_json::to_string(&ActionFlows::from(a))?,
                    None => String::new(),
                },
                action_inputs: to_json_cell(action.and_then(|a| a.action_inputs.as_ref()))?,
                state_before: to_json_cell(action.and_then(|a| a.state_before.as_ref()))?,
                state_after: to_json_cell(action.and_then(|a| a.state_after.as_ref()))?,
            });
        }
    }
    Ok(rows)
}

fn to_json_cell<T: Serialize>(value: Option<&T>) -> SimulationResult<Option<String>> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

/// Write the bundle for `manifest.run_id` under `out_base` and return its directory.
pub fn write_run_bundle(
    out_base: &Path,
    manifest: &RunManifest,
    history: &History,
    region: &str,
) -> SimulationResult<PathBuf> {
    let run_dir = out_base.join(&manifest.run_id);
    fs::create_dir_all(&run_dir).map_err(|e| SimulationError::io(&run_dir, e))?;

    write_csv(&run_dir.join(TIMESERIES_FILE), &timeseries_rows(history, region))?;
    write_csv(&run_dir.join(AGENT_STATES_FILE), &agent_state_rows(history)?)?;

    let summary = RunBundleSummary {
        run_id: manifest.run_id.clone(),
        created: manifest.run_timestamp,
        summary: RunSummary::from_history(history),
    };
    let summary_path = run_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .map_err(|e| SimulationError::io(&summary_path, e))?;

    let manifest_path = run_dir.join(RUN_MANIFEST_FILE);
    fs::write(&manifest_path, serde_yaml::to_string(manifest)?)
        .map_err(|e| SimulationError::io(&manifest_path, e))?;

    info!(run_id = %manifest.run_id, dir = %run_dir.display(), "wrote run bundle");
    Ok(run_dir)
}
