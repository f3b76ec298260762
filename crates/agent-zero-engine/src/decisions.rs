//! Per-agent decision rules
//!
//! Producers forecast their commodity price over their horizon, value one
//! unit of new capacity by NPV and invest a fixed step when that NPV clears
//! a threshold. They always supply their existing capacity. The industrial
//! consumer works out how much electricity it would like at the current
//! price, but that figure is recorded only and does not reach the market.
//! The regulator acts through the policy table, so its own action is idle.
//!
//! Every parameter is read from the assumptions table for the agent's tech
//! and the current year; missing rows fall back to the constants below.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::types::commodity::{CARBON, ELECTRICITY};
use crate::types::{Action, AgentState, AgentType, DecisionInputs, ProducerCosts, WorldState};

pub const DEFAULT_CAPEX: f64 = 1000.0;
pub const DEFAULT_OPEX: f64 = 10.0;
pub const DEFAULT_EMISSIONS_INTENSITY: f64 = 0.0;
pub const DEFAULT_TREND_PARAM: f64 = 0.0;
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.07;
pub const DEFAULT_INVEST_THRESHOLD: f64 = 0.0;
pub const DEFAULT_MAX_CAPACITY: f64 = f64::INFINITY;
pub const DEFAULT_INVEST_STEP: f64 = 10.0;
pub const DEFAULT_REF_PRICE: f64 = 60.0;
/// Share of current demand an industrial consumer keeps when prices are high.
pub const DEFAULT_DEMAND_LOW_SHARE: f64 = 0.8;
const FALLBACK_ELECTRICITY_DEMAND: f64 = 100.0;

/// Produce this year's action for `agent` from the shared world snapshot.
pub fn decide(agent: &AgentState, world: &WorldState) -> EngineResult<Action> {
    let action = match agent.agent_type {
        AgentType::Regulator => decide_regulator(agent, world),
        AgentType::ElectricityProducer | AgentType::HydrogenProducer => {
            decide_producer(agent, world)?
        }
        AgentType::IndustrialConsumer => decide_consumer(agent, world),
    };
    debug!(
        agent = %agent.id,
        year = world.t,
        supply = ?action.supply,
        invest = ?action.invest,
        "agent decided"
    );
    Ok(action)
}

/// Linear price trend: year `y` of `horizon` moves the price by
/// `trend_param * y / horizon` of its current level.
pub fn forecast_prices(current: f64, trend_param: f64, horizon: u32) -> Vec<f64> {
    let h = f64::from(horizon);
    (1..=horizon)
        .map(|y| current * (1.0 + trend_param * (f64::from(y) / h)))
        .collect()
}

/// NPV of one unit of capacity: discounted yearly margins minus capex.
pub fn compute_npv(
    capex: f64,
    opex: f64,
    price_forecast: &[f64],
    emissions_intensity: f64,
    carbon_price: f64,
    discount_rate: f64,
) -> f64 {
    let discounted: f64 = price_forecast
        .iter()
        .zip(1..)
        .map(|(price, y)| {
            let margin = price - opex - emissions_intensity * carbon_price;
            margin / (1.0 + discount_rate).powi(y)
        })
        .sum();
    discounted - capex
}

fn decide_regulator(agent: &AgentState, world: &WorldState) -> Action {
    let mut action = Action::idle(&agent.id);
    action.action_inputs = Some(DecisionInputs::Regulator {
        year: world.t,
        carbon_price: world.price(CARBON).unwrap_or(0.0),
    });
    action
}

fn decide_producer(agent: &AgentState, world: &WorldState) -> EngineResult<Action> {
    let tech = agent.tech.as_deref().ok_or_else(|| EngineError::MissingTech {
        agent_id: agent.id.clone(),
    })?;
    let t = world.t;
    let table = &world.assumptions;

    let costs = ProducerCosts {
        capex: table.value_or(tech, t, "capex", DEFAULT_CAPEX),
        opex: table.value_or(tech, t, "opex", DEFAULT_OPEX),
        emissions_intensity: table.value_or(
            tech,
            t,
            "emissions_intensity",
            DEFAULT_EMISSIONS_INTENSITY,
        ),
        trend_param: table.value_or(tech, t, "trend_param", DEFAULT_TREND_PARAM),
        invest_threshold: table.value_or(tech, t, "invest_threshold", DEFAULT_INVEST_THRESHOLD),
        max_capacity: table.value_or(tech, t, "max_capacity", DEFAULT_MAX_CAPACITY),
        invest_step: table.value_or(tech, t, "invest_step", DEFAULT_INVEST_STEP),
    };
    let discount_rate = table.value_or(tech, t, "discount_rate", DEFAULT_DISCOUNT_RATE);

    let current_price = world.required_price(tech)?;
    let carbon_price = world.required_price(CARBON)?;
    let price_forecast = forecast_prices(current_price, costs.trend_param, agent.horizon);
    let npv = compute_npv(
        costs.capex,
        costs.opex,
        &price_forecast,
        costs.emissions_intensity,
        carbon_price,
        discount_rate,
    );

    let invest = if npv > costs.invest_threshold && agent.capacity < costs.max_capacity {
        costs.invest_step.min(costs.max_capacity - agent.capacity)
    } else {
        0.0
    };
    // New capacity only produces from next year on.
    let supply = agent.capacity;

    Ok(Action {
        agent_id: agent.id.clone(),
        supply: BTreeMap::from([(tech.to_string(), supply)]),
        invest: BTreeMap::from([(tech.to_string(), invest)]),
        retire: BTreeMap::from([(tech.to_string(), 0.0)]),
        emissions: supply * costs.emissions_intensity,
        expected_price: price_forecast.first().copied(),
        action_inputs: Some(DecisionInputs::Producer {
            year: t,
            prices: world.prices.clone(),
            capacity: agent.capacity,
            costs,
            horizon: agent.horizon,
            discount_rate,
            carbon_price,
            price_forecast,
            npv,
        }),
        state_before: None,
        state_after: None,
    })
}

fn decide_consumer(agent: &AgentState, world: &WorldState) -> Action {
    let t = world.t;
    let table = &world.assumptions;
    let current_demand = world
        .demand
        .get(ELECTRICITY)
        .copied()
        .unwrap_or(FALLBACK_ELECTRICITY_DEMAND);

    let ref_price = table.value_or(ELECTRICITY, t, "ref_price", DEFAULT_REF_PRICE);
    let demand_high = table.value_or(ELECTRICITY, t, "demand_high", current_demand);
    let demand_low = table.value_or(
        ELECTRICITY,
        t,
        "demand_low",
        DEFAULT_DEMAND_LOW_SHARE * current_demand,
    );
    let price = world.price(ELECTRICITY).unwrap_or(0.0);
    let consumption = if price < ref_price { demand_high } else { demand_low };

    // TODO: feed `consumption` into next year's electricity demand once the
    // market treats consumer bids as demand.
    let mut action = Action::idle(&agent.id);
    action.action_inputs = Some(DecisionInputs::Consumer {
        year: t,
        prices: world.prices.clone(),
        demand: world.demand.clone(),
        ref_price,
        demand_high,
        demand_low,
        consumption,
    });
    action
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tables::{AssumptionRow, AssumptionsTable, PolicyTable};
    use crate::types::commodity::HYDROGEN;

    fn world_with(rows: Vec<AssumptionRow>, electricity_price: f64, carbon: f64) -> WorldState {
        WorldState::new(
            2025,
            BTreeMap::from([
                (ELECTRICITY.to_string(), electricity_price),
                (HYDROGEN.to_string(), 3.0),
                (CARBON.to_string(), carbon),
            ]),
            BTreeMap::from([(ELECTRICITY.to_string(), 100.0), (HYDROGEN.to_string(), 10.0)]),
            Arc::new(PolicyTable::default()),
            Arc::new(AssumptionsTable::new(rows)),
        )
    }

    fn generator(capacity: f64) -> AgentState {
        AgentState::new("EGEN1", AgentType::ElectricityProducer, "AUS")
            .with_tech(ELECTRICITY)
            .with_capacity(capacity)
            .with_horizon(3)
    }

    fn producer_inputs(action: &Action) -> (&ProducerCosts, f64, f64) {
        match action.action_inputs.as_ref() {
            Some(DecisionInputs::Producer {
                costs,
                discount_rate,
                npv,
                ..
            }) => (costs, *discount_rate, *npv),
            other => panic!("expected producer inputs, got {other:?}"),
        }
    }

    #[test]
    fn test_forecast_follows_linear_trend() {
        assert_eq!(forecast_prices(50.0, 0.0, 3), vec![50.0, 50.0, 50.0]);

        let rising = forecast_prices(100.0, 0.3, 3);
        assert_eq!(rising.len(), 3);
        assert!((rising[0] - 110.0).abs() < 1e-9);
        assert!((rising[1] - 120.0).abs() < 1e-9);
        assert!((rising[2] - 130.0).abs() < 1e-9);

        assert!(forecast_prices(50.0, 0.1, 0).is_empty());
    }

    #[test]
    fn test_npv_discounts_margins_and_subtracts_capex() {
        let npv = compute_npv(1000.0, 10.0, &[50.0, 50.0, 50.0], 0.0, 0.0, 0.07);
        let annuity = 1.0 / 1.07 + 1.0 / 1.07_f64.powi(2) + 1.0 / 1.07_f64.powi(3);
        assert!((npv - (40.0 * annuity - 1000.0)).abs() < 1e-9);
        assert!((npv - -895.03).abs() < 0.01);

        // Carbon cost eats into the margin.
        let taxed = compute_npv(0.0, 0.0, &[10.0], 2.0, 5.0, 0.0);
        assert_eq!(taxed, 0.0);
    }

    #[test]
    fn test_producer_uses_defaults_without_assumptions() {
        let world = world_with(Vec::new(), 50.0, 0.0);
        let action = decide(&generator(100.0), &world).unwrap();

        let (costs, discount_rate, npv) = producer_inputs(&action);
        assert_eq!(costs.capex, 1000.0);
        assert_eq!(costs.opex, 10.0);
        assert_eq!(costs.emissions_intensity, 0.0);
        assert_eq!(costs.invest_step, 10.0);
        assert_eq!(costs.max_capacity, f64::INFINITY);
        assert_eq!(discount_rate, 0.07);
        assert!(npv < 0.0);

        assert_eq!(action.invested(ELECTRICITY), 0.0);
        assert_eq!(action.supplied(ELECTRICITY), 100.0);
        assert_eq!(action.retire.get(ELECTRICITY), Some(&0.0));
        assert_eq!(action.expected_price, Some(50.0));
        assert_eq!(action.emissions, 0.0);
    }

    #[test]
    fn test_producer_invests_when_npv_clears_threshold() {
        let rows = vec![
            AssumptionRow::new("AUS", ELECTRICITY, 2025, "capex", 10.0),
            AssumptionRow::new("AUS", ELECTRICITY, 2025, "emissions_intensity", 0.5),
        ];
        let world = world_with(rows, 50.0, 4.0);
        let action = decide(&generator(100.0), &world).unwrap();

        assert_eq!(action.invested(ELECTRICITY), 10.0);
        assert_eq!(action.supplied(ELECTRICITY), 100.0);
        assert_eq!(action.emissions, 50.0);
    }

    #[test]
    fn test_investment_is_capped_by_max_capacity() {
        let rows = vec![
            AssumptionRow::new("AUS", ELECTRICITY, 2025, "capex", 10.0),
            AssumptionRow::new("AUS", ELECTRICITY, 2025, "max_capacity", 104.0),
        ];
        let world = world_with(rows.clone(), 50.0, 0.0);
        let action = decide(&generator(100.0), &world).unwrap();
        assert_eq!(action.invested(ELECTRICITY), 4.0);

        let full = decide(&generator(104.0), &world).unwrap();
        assert_eq!(full.invested(ELECTRICITY), 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        // One year of margin 40 at zero discount against capex 40 gives NPV 0.
        let rows = vec![
            AssumptionRow::new("AUS", ELECTRICITY, 2025, "capex", 40.0),
            AssumptionRow::new("AUS", ELECTRICITY, 2025, "discount_rate", 0.0),
        ];
        let world = world_with(rows, 50.0, 0.0);
        let agent = generator(100.0).with_horizon(1);
        let action = decide(&agent, &world).unwrap();

        assert_eq!(producer_inputs(&action).2, 0.0);
        assert_eq!(action.invested(ELECTRICITY), 0.0);
    }

    #[test]
    fn test_producer_without_tech_is_fatal() {
        let world = world_with(Vec::new(), 50.0, 0.0);
        let agent = AgentState::new("EGEN1", AgentType::ElectricityProducer, "AUS");
        assert_eq!(
            decide(&agent, &world),
            Err(EngineError::MissingTech {
                agent_id: "EGEN1".to_string()
            })
        );
    }

    #[test]
    fn test_consumer_records_consumption_without_acting() {
        let cheap = world_with(Vec::new(), 50.0, 0.0);
        let consumer = AgentState::new("IND1", AgentType::IndustrialConsumer, "AUS")
            .with_sector("Industry");

        let action = decide(&consumer, &cheap).unwrap();
        assert!(action.supply.is_empty());
        assert!(action.invest.is_empty());
        assert!(action.retire.is_empty());
        assert_eq!(action.emissions, 0.0);
        assert_eq!(action.expected_price, None);
        match action.action_inputs {
            Some(DecisionInputs::Consumer {
                ref_price,
                consumption,
                ..
            }) => {
                assert_eq!(ref_price, 60.0);
                assert_eq!(consumption, 100.0);
            }
            other => panic!("expected consumer inputs, got {other:?}"),
        }

        let dear = world_with(Vec::new(), 75.0, 0.0);
        match decide(&consumer, &dear).unwrap().action_inputs {
            Some(DecisionInputs::Consumer { consumption, .. }) => assert_eq!(consumption, 80.0),
            other => panic!("expected consumer inputs, got {other:?}"),
        }
    }

    #[test]
    fn test_regulator_is_idle() {
        for carbon in [0.0, 35.0, 1e6] {
            let world = world_with(Vec::new(), 50.0, carbon);
            let regulator = AgentState::new("REG", AgentType::Regulator, "AUS");
            let action = decide(&regulator, &world).unwrap();

            assert!(action.supply.is_empty());
            assert!(action.invest.is_empty());
            assert!(action.retire.is_empty());
            assert_eq!(action.emissions, 0.0);
            assert_eq!(
                action.action_inputs,
                Some(DecisionInputs::Regulator {
                    year: 2025,
                    carbon_price: carbon
                })
            );
        }
    }
}
