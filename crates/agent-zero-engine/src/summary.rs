//! Headline metrics derived from a run history
//!
//! Years are labelled with `world.t` of each history entry, which is the
//! year after the one whose flows and emissions the entry records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{commodity, AgentType, History};

/// Investment summed over the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentTotals {
    pub total: f64,
    pub by_agent_type: BTreeMap<AgentType, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub cumulative_emissions: f64,
    pub peak_emissions: f64,
    /// First year with the lowest emissions.
    pub year_min_emissions: Option<i32>,
    /// First year with emissions at or below zero.
    pub year_net_zero: Option<i32>,
    pub average_prices: BTreeMap<String, f64>,
    pub investment_totals: InvestmentTotals,
    /// Largest capacity reached by any producer of each type.
    pub peak_capacity: BTreeMap<AgentType, f64>,
    /// Worst yearly ratio of supply to demand per traded commodity.
    pub security_of_supply: BTreeMap<String, f64>,
}

impl RunSummary {
    pub fn from_history(history: &History) -> Self {
        let mut summary = RunSummary::default();
        if history.is_empty() {
            return summary;
        }

        let mut min_emissions = f64::INFINITY;
        let mut peak_emissions = f64::NEG_INFINITY;
        let mut price_sums: BTreeMap<String, f64> = BTreeMap::new();

        for entry in history {
            let world = &entry.world;
            summary.cumulative_emissions += world.emissions;
            peak_emissions = peak_emissions.max(world.emissions);
            if world.emissions < min_emissions {
                min_emissions = world.emissions;
                summary.year_min_emissions = Some(world.t);
            }
            if summary.year_net_zero.is_none() && world.emissions <= 0.0 {
                summary.year_net_zero = Some(world.t);
            }

            for (name, price) in &world.prices {
                *price_sums.entry(name.clone()).or_default() += price;
            }

            for traded in commodity::TRADED {
                // world.demand already holds next year's demand
                let flow = |key: String| world.flows.get(&key).copied().unwrap_or(0.0);
                let demand = flow(commodity::demand_flow(traded));
                if demand <= 0.0 {
                    continue;
                }
                let supply = flow(commodity::supply_flow(traded));
                let ratio = supply / demand;
                summary
                    .security_of_supply
                    .entry(traded.to_string())
                    .and_modify(|worst| *worst = worst.min(ratio))
                    .or_insert(ratio);
            }

            for action in &entry.actions {
                let invested = action.total_investment();
                if invested == 0.0 {
                    continue;
                }
                summary.investment_totals.total += invested;
                if let Some(agent) = entry.agents.iter().find(|agent| agent.id == action.agent_id) {
                    *summary
                        .investment_totals
                        .by_agent_type
                        .entry(agent.agent_type)
                        .or_default() += invested;
                }
            }

            for agent in entry.agents.iter().filter(|agent| agent.agent_type.is_producer()) {
                summary
                    .peak_capacity
                    .entry(agent.agent_type)
                    .and_modify(|peak| *peak = peak.max(agent.capacity))
                    .or_insert(agent.capacity);
            }
        }

        let years = history.len() as f64;
        summary.peak_emissions = peak_emissions;
        summary.average_prices = price_sums
            .into_iter()
            .map(|(name, sum)| (name, sum / years))
            .collect();
        summary
    }
}
