//! Agent Zero Simulation
//!
//! File-backed workflow around the agent-zero engine: loading assumptions
//! and scenario packs, applying scenario patches, running the engine over a
//! year list and writing a reproducible result bundle.
//!
//! ## Core Components
//!
//! - **Packs**: `manifest.yaml` plus CSV tables on disk
//! - **Validate**: collects every problem in a pack
//! - **Patches**: replace, scale and add edits over the baseline tables
//! - **Years / Run ids**: `--years` parsing and deterministic run hashes
//! - **Results**: `timeseries.csv`, `agent_states.csv`, `summary.json`, `manifest.yaml`
//! - **Runner**: the end-to-end pipeline used by the `agent-zero` binary
//!
//! ## Getting Started
//!
//! ```rust
//! use agent_zero_simulation::parse_years;
//!
//! assert_eq!(parse_years("2025:5:2035").unwrap(), vec![2025, 2030, 2035]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod packs;
pub mod patches;
pub mod results;
pub mod run_id;
pub mod runner;
pub mod validate;
pub mod years;

// Core exports
pub use config::SimulationConfig;
pub use error::{SimulationError, SimulationResult};
pub use packs::{
    load_assumptions_pack, load_manifest, load_scenario_pack, AssumptionsPack, PackKind,
    PackManifest, ScenarioPack,
};
pub use patches::{apply_patches, Patch, PatchOp, PatchTarget};
pub use results::{
    agent_state_rows, timeseries_rows, write_run_bundle, AgentStateRow, RunBundleSummary,
    RunManifest, TimeseriesRow,
};
pub use run_id::make_run_id;
pub use runner::{resolve_inputs, run_simulation, ResolvedInputs, RunOutcome, RunRequest};
pub use validate::validate_pack;
pub use years::parse_years;
