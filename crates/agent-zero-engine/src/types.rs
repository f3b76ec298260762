//! World, agent and action types threaded through every simulated year
//!
//! A [`WorldState`] is built once per year and never changed afterwards.
//! [`AgentState`]s are the exception: the step orchestrator owns them and
//! bumps producer capacity in place, so an investment becomes visible to the
//! following year only.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::tables::{AssumptionsTable, PolicyTable};

/// Names of the commodities known to the model.
pub mod commodity {
    pub const ELECTRICITY: &str = "electricity";
    pub const HYDROGEN: &str = "hydrogen";
    pub const CARBON: &str = "carbon";

    /// Commodities cleared by the market each year, in clearing order.
    pub const TRADED: [&str; 2] = [ELECTRICITY, HYDROGEN];

    /// Flow key recording total supply of a traded commodity.
    pub fn supply_flow(commodity: &str) -> String {
        format!("{commodity}_supply")
    }

    /// Flow key recording the demand a traded commodity was cleared against.
    pub fn demand_flow(commodity: &str) -> String {
        format!("{commodity}_demand")
    }
}

//-----------------------------------------------------------------------------
// World
//-----------------------------------------------------------------------------

/// Shared state of the world for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldState {
    pub t: i32,
    pub prices: BTreeMap<String, f64>,
    pub demand: BTreeMap<String, f64>,
    #[serde(skip)]
    pub policy: Arc<PolicyTable>,
    #[serde(skip)]
    pub assumptions: Arc<AssumptionsTable>,
    /// Derived flows such as `electricity_supply` and `electricity_demand`,
    /// filled by market clearing.
    pub flows: BTreeMap<String, f64>,
    pub emissions: f64,
}

impl WorldState {
    /// World with empty flows and zero emissions.
    pub fn new(
        t: i32,
        prices: BTreeMap<String, f64>,
        demand: BTreeMap<String, f64>,
        policy: Arc<PolicyTable>,
        assumptions: Arc<AssumptionsTable>,
    ) -> Self {
        Self {
            t,
            prices,
            demand,
            policy,
            assumptions,
            flows: BTreeMap::new(),
            emissions: 0.0,
        }
    }

    pub fn price(&self, commodity: &str) -> Option<f64> {
        self.prices.get(commodity).copied()
    }

    /// Price a decision cannot proceed without.
    pub fn required_price(&self, commodity: &str) -> Result<f64, EngineError> {
        self.price(commodity).ok_or_else(|| EngineError::MissingPrice {
            commodity: commodity.to_string(),
            year: self.t,
        })
    }

    pub fn demand_for(&self, commodity: &str) -> f64 {
        self.demand.get(commodity).copied().unwrap_or(0.0)
    }
}

//-----------------------------------------------------------------------------
// Agents
//-----------------------------------------------------------------------------

/// The fixed set of agent behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentType {
    ElectricityProducer,
    HydrogenProducer,
    IndustrialConsumer,
    Regulator,
}

impl AgentType {
    pub const ALL: [AgentType; 4] = [
        AgentType::ElectricityProducer,
        AgentType::HydrogenProducer,
        AgentType::IndustrialConsumer,
        AgentType::Regulator,
    ];

    pub fn is_producer(self) -> bool {
        matches!(self, AgentType::ElectricityProducer | AgentType::HydrogenProducer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentType::ElectricityProducer => "ElectricityProducer",
            AgentType::HydrogenProducer => "HydrogenProducer",
            AgentType::IndustrialConsumer => "IndustrialConsumer",
            AgentType::Regulator => "Regulator",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EngineError::UnknownAgentType(s.to_string()))
    }
}

/// Private state of one agent. Also used as the before/after trace dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: String,
    pub agent_type: AgentType,
    pub region: String,
    pub sector: Option<String>,
    /// Commodity produced; only producers carry one.
    pub tech: Option<String>,
    pub capacity: f64,
    pub vintage: i32,
    /// Carried through untouched; no decision reads it yet.
    pub cash: f64,
    pub horizon: u32,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl AgentState {
    pub fn new(id: impl Into<String>, agent_type: AgentType, region: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent_type,
            region: region.into(),
            sector: None,
            tech: None,
            capacity: 0.0,
            vintage: 0,
            cash: 0.0,
            horizon: 1,
            params: BTreeMap::new(),
        }
    }

    pub fn with_tech(mut self, tech: impl Into<String>) -> Self {
        self.tech = Some(tech.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_vintage(mut self, vintage: i32) -> Self {
        self.vintage = vintage;
        self
    }

    pub fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }
}

//-----------------------------------------------------------------------------
// Actions
//-----------------------------------------------------------------------------

/// Cost parameters a producer resolved from the assumptions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerCosts {
    pub capex: f64,
    pub opex: f64,
    pub emissions_intensity: f64,
    pub trend_param: f64,
    pub invest_threshold: f64,
    pub max_capacity: f64,
    pub invest_step: f64,
}

/// Everything a decision rule consulted, kept for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DecisionInputs {
    Producer {
        year: i32,
        prices: BTreeMap<String, f64>,
        capacity: f64,
        costs: ProducerCosts,
        horizon: u32,
        discount_rate: f64,
        carbon_price: f64,
        price_forecast: Vec<f64>,
        npv: f64,
    },
    Consumer {
        year: i32,
        prices: BTreeMap<String, f64>,
        demand: BTreeMap<String, f64>,
        ref_price: f64,
        demand_high: f64,
        demand_low: f64,
        consumption: f64,
    },
    Regulator {
        year: i32,
        carbon_price: f64,
    },
}

/// What one agent did in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub agent_id: String,
    pub supply: BTreeMap<String, f64>,
    /// Capacity added this year, realised at the end of the step.
    pub invest: BTreeMap<String, f64>,
    /// Always zero for now.
    pub retire: BTreeMap<String, f64>,
    pub emissions: f64,
    pub expected_price: Option<f64>,
    pub action_inputs: Option<DecisionInputs>,
    pub state_before: Option<AgentState>,
    pub state_after: Option<AgentState>,
}

impl Action {
    /// An action with no flows, no emissions and no trace.
    pub fn idle(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            supply: BTreeMap::new(),
            invest: BTreeMap::new(),
            retire: BTreeMap::new(),
            emissions: 0.0,
            expected_price: None,
            action_inputs: None,
            state_before: None,
            state_after: None,
        }
    }

    pub fn supplied(&self, commodity: &str) -> f64 {
        self.supply.get(commodity).copied().unwrap_or(0.0)
    }

    pub fn invested(&self, commodity: &str) -> f64 {
        self.invest.get(commodity).copied().unwrap_or(0.0)
    }

    pub fn total_investment(&self) -> f64 {
        self.invest.values().sum()
    }
}

//-----------------------------------------------------------------------------
// History
//-----------------------------------------------------------------------------

/// World after a step, the agents as they stood then, and their actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub world: WorldState,
    pub agents: Vec<AgentState>,
    pub actions: Vec<Action>,
}

/// One entry per simulated year, in simulation order.
pub type History = Vec<HistoryEntry>;
