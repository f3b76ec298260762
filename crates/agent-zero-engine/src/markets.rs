//! Market clearing
//!
//! Each traded commodity gets one proportional price adjustment per year:
//! excess supply pushes the price down, excess demand pushes it up, and the
//! price never drops below zero. There is no iteration to convergence.
//! The carbon price comes straight from the policy table and holds its last
//! value in years without a policy row.

use std::collections::BTreeMap;

use crate::types::commodity::{self, CARBON};
use crate::types::{Action, WorldState};

/// Price change per unit of supply/demand imbalance.
pub const PRICE_ADJUSTMENT: f64 = 0.05;

/// Policy type carrying the carbon price.
pub const CARBON_PRICE_POLICY: &str = "carbon_price";

/// Clear this year's markets. Returns a new world with the same `t`.
pub fn clear_markets(world: &WorldState, actions: &[Action]) -> WorldState {
    let mut prices = world.prices.clone();
    let mut flows = BTreeMap::new();

    for traded in commodity::TRADED {
        let supply: f64 = actions.iter().map(|action| action.supplied(traded)).sum();
        let demand = world.demand_for(traded);
        let balance = supply - demand;
        let old_price = world.price(traded).unwrap_or(0.0);
        prices.insert(
            traded.to_string(),
            adjust_price(old_price, balance, PRICE_ADJUSTMENT),
        );
        flows.insert(commodity::supply_flow(traded), supply);
        flows.insert(commodity::demand_flow(traded), demand);
    }

    if let Some(carbon) = world.policy.lookup(world.t, CARBON_PRICE_POLICY) {
        prices.insert(CARBON.to_string(), carbon);
    }

    WorldState {
        t: world.t,
        prices,
        demand: world.demand.clone(),
        policy: world.policy.clone(),
        assumptions: world.assumptions.clone(),
        flows,
        emissions: actions.iter().map(|action| action.emissions).sum(),
    }
}

/// One tâtonnement step, floored at zero. `balance` is supply minus demand.
pub fn adjust_price(price: f64, balance: f64, k: f64) -> f64 {
    (price + k * -balance).max(0.0)
}
