//! Agent Zero Simulation Engine
//!
//! A small agent-based model of an energy-system transition. Four agents
//! (an electricity producer, a hydrogen producer, an industrial consumer and
//! a regulator) act once per simulated year against exogenous assumptions
//! and policy. Markets clear by a single proportional price adjustment.
//!
//! ## Core Components
//!
//! - **Tables**: assumption and policy rows with first-match lookups
//! - **Decisions**: NPV-driven investment and supply rules per agent type
//! - **Markets**: price adjustment, carbon price and emissions aggregation
//! - **Simulate**: the yearly `step` and the `simulate` fold over years
//! - **Init**: the starting world and the fixed agent roster
//! - **Summary**: headline metrics over a finished history
//!
//! ## Getting Started
//!
//! ```rust
//! use std::sync::Arc;
//! use agent_zero_engine::{init_agents, init_world, simulate, MarketDefaults};
//! use agent_zero_engine::{AssumptionsTable, PolicyTable, RunSummary};
//!
//! let assumptions = Arc::new(AssumptionsTable::default());
//! let policy = Arc::new(PolicyTable::default());
//! let world0 = init_world(assumptions.clone(), policy, 2025, &MarketDefaults::default());
//! let agents0 = init_agents(&assumptions, 2025);
//!
//! let history = simulate(&world0, agents0, &[2025, 2026, 2027]).unwrap();
//! assert_eq!(history.len(), 3);
//! let summary = RunSummary::from_history(&history);
//! assert!(summary.peak_emissions >= 0.0);
//! ```

pub mod decisions;
pub mod defaults;
pub mod error;
pub mod init;
pub mod markets;
pub mod simulate;
pub mod summary;
pub mod tables;
pub mod types;

// Core exports
pub use decisions::{compute_npv, decide, forecast_prices};
pub use defaults::MarketDefaults;
pub use error::{EngineError, EngineResult};
pub use init::{init_agents, init_agents_in_region, init_world};
pub use markets::clear_markets;
pub use simulate::{simulate, step};
pub use summary::{InvestmentTotals, RunSummary};
pub use tables::{AssumptionRow, AssumptionsTable, PolicyRow, PolicyTable};
pub use types::{
    commodity, Action, AgentState, AgentType, DecisionInputs, History, HistoryEntry,
    ProducerCosts, WorldState,
};
