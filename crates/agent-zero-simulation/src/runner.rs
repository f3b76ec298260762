//! Resolving packs into tables and driving a full run
//!
//! The CLI commands are thin wrappers around these functions so the whole
//! pipeline can be exercised without a terminal.

use std::path::PathBuf;
use std::sync::Arc;

use agent_zero_engine::{
    init_agents_in_region, init_world, simulate, AssumptionsTable, PolicyTable, RunSummary,
};
use chrono::Utc;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::packs::{load_assumptions_pack, load_scenario_pack, PackManifest};
use crate::patches::apply_patches;
use crate::results::{write_run_bundle, RunManifest};
use crate::run_id::make_run_id;

/// Baseline tables with any scenario patches applied.
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    pub assumptions: AssumptionsTable,
    pub policy: PolicyTable,
    pub assumptions_manifest: PackManifest,
    pub scenario_manifest: Option<PackManifest>,
}

/// Load the named packs from the config's data directory and patch them.
pub fn resolve_inputs(
    config: &SimulationConfig,
    assumptions: &str,
    scenario: Option<&str>,
) -> SimulationResult<ResolvedInputs> {
    let base = load_assumptions_pack(&config.assumptions_pack_dir(assumptions))?;

    let Some(scenario) = scenario else {
        return Ok(ResolvedInputs {
            assumptions: base.assumptions,
            policy: base.policy,
            assumptions_manifest: base.manifest,
            scenario_manifest: None,
        });
    };

    let scen = load_scenario_pack(&config.scenario_pack_dir(scenario))?;
    let (patched_assumptions, patched_policy) =
        apply_patches(&base.assumptions, &base.policy, &scen.patches)?;
    info!(
        assumptions = %base.dir.display(),
        scenario = %scen.dir.display(),
        patches = scen.patches.len(),
        "resolved scenario"
    );
    Ok(ResolvedInputs {
        assumptions: patched_assumptions,
        policy: patched_policy,
        assumptions_manifest: base.manifest,
        scenario_manifest: Some(scen.manifest),
    })
}

/// What to run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub assumptions: String,
    pub scenario: Option<String>,
    pub years: Vec<i32>,
    pub seed: u64,
    /// Overrides the config's `runs_dir`.
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub summary: RunSummary,
}

/// Resolve inputs, simulate every requested year and write the bundle.
pub fn run_simulation(config: &SimulationConfig, request: &RunRequest) -> SimulationResult<RunOutcome> {
    let start_year = *request.years.first().ok_or_else(|| {
        SimulationError::Configuration("at least one year is required".to_string())
    })?;
    let inputs = resolve_inputs(config, &request.assumptions, request.scenario.as_deref())?;

    let run_id = make_run_id(
        &config.engine_version,
        inputs.assumptions_manifest.hash_or_na(),
        inputs.scenario_manifest.as_ref().map(PackManifest::hash_or_na),
        &request.years,
        request.seed,
    )?;
    info!(%run_id, start_year, years = request.years.len(), "starting run");

    let assumptions = Arc::new(inputs.assumptions);
    let world0 = init_world(
        assumptions.clone(),
        Arc::new(inputs.policy),
        start_year,
        &config.defaults,
    );
    let agents0 = init_agents_in_region(&assumptions, start_year, &config.region);
    let history = simulate(&world0, agents0, &request.years)?;

    let manifest = RunManifest {
        run_id: run_id.clone(),
        run_timestamp: Utc::now(),
        engine_version: config.engine_version.clone(),
        seed: request.seed,
        years: request.years.clone(),
        assumptions: inputs.assumptions_manifest,
        scenario: inputs.scenario_manifest,
    };
    let out_base = request.out_dir.as_ref().unwrap_or(&config.runs_dir);
    let run_dir = write_run_bundle(out_base, &manifest, &history, &config.region)?;

    Ok(RunOutcome {
        run_id,
        run_dir,
        summary: RunSummary::from_history(&history),
    })
}
