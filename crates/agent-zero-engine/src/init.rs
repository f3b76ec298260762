//! Initial world and agent roster

use std::sync::Arc;

use crate::defaults::MarketDefaults;
use crate::markets::CARBON_PRICE_POLICY;
use crate::simulate::DEMAND_PARAM;
use crate::tables::{AssumptionsTable, PolicyTable};
use crate::types::commodity::{self, CARBON, ELECTRICITY, HYDROGEN};
use crate::types::{AgentState, AgentType, WorldState};

/// Region every agent of the fixed roster belongs to.
pub const DEFAULT_REGION: &str = "AUS";

const DEFAULT_ELECTRICITY_CAPACITY: f64 = 100.0;
const DEFAULT_HYDROGEN_CAPACITY: f64 = 10.0;
const PRODUCER_HORIZON: u32 = 3;

/// Build the world for `start_year`.
///
/// Prices come from `defaults` except carbon, which takes the policy value
/// for the start year when there is one (and the default otherwise). Demand
/// for each traded commodity takes the assumptions' `demand` row for the
/// start year when present.
pub fn init_world(
    assumptions: Arc<AssumptionsTable>,
    policy: Arc<PolicyTable>,
    start_year: i32,
    defaults: &MarketDefaults,
) -> WorldState {
    let mut prices = defaults.prices.clone();
    let carbon = policy
        .lookup(start_year, CARBON_PRICE_POLICY)
        .or_else(|| defaults.prices.get(CARBON).copied())
        .unwrap_or(0.0);
    prices.insert(CARBON.to_string(), carbon);

    let mut demand = defaults.demand.clone();
    for traded in commodity::TRADED {
        if let Some(value) = assumptions.lookup(traded, start_year, DEMAND_PARAM) {
            demand.insert(traded.to_string(), value);
        }
    }

    WorldState::new(start_year, prices, demand, policy, assumptions)
}

/// Create the four agents of the model in [`DEFAULT_REGION`]: one
/// electricity producer, one hydrogen producer, one industrial consumer and
/// the regulator.
///
/// Producer capacity comes from the `initial_capacity` assumption for the
/// start year, defaulting to 100 for electricity and 10 for hydrogen.
pub fn init_agents(assumptions: &AssumptionsTable, start_year: i32) -> Vec<AgentState> {
    init_agents_in_region(assumptions, start_year, DEFAULT_REGION)
}

/// Same roster as [`init_agents`], placed in `region`.
pub fn init_agents_in_region(
    assumptions: &AssumptionsTable,
    start_year: i32,
    region: &str,
) -> Vec<AgentState> {
    let capacity = |tech: &str, default: f64| {
        assumptions.value_or(tech, start_year, "initial_capacity", default)
    };

    vec![
        AgentState::new("EGEN1", AgentType::ElectricityProducer, region)
            .with_tech(ELECTRICITY)
            .with_capacity(capacity(ELECTRICITY, DEFAULT_ELECTRICITY_CAPACITY))
            .with_vintage(start_year)
            .with_horizon(PRODUCER_HORIZON),
        AgentState::new("H2GEN1", AgentType::HydrogenProducer, region)
            .with_tech(HYDROGEN)
            .with_capacity(capacity(HYDROGEN, DEFAULT_HYDROGEN_CAPACITY))
            .with_vintage(start_year)
            .with_horizon(PRODUCER_HORIZON),
        AgentState::new("IND1", AgentType::IndustrialConsumer, region).with_sector("Industry"),
        AgentState::new("REG", AgentType::Regulator, region),
    ]
}
