//! Year-by-year state transition
//!
//! `step` runs decide -> clear -> invest -> demand update -> advance for one
//! year. `simulate` folds `step` over a list of years and keeps every
//! intermediate result as the run history.

use tracing::{info, warn};

use crate::decisions::decide;
use crate::error::EngineResult;
use crate::markets::clear_markets;
use crate::types::{commodity, Action, AgentState, History, HistoryEntry, WorldState};

/// Assumption parameter holding a commodity's demand for a year.
pub const DEMAND_PARAM: &str = "demand";

/// Advance the world by one year.
///
/// Every agent decides against the same `world`. Producers then grow their
/// capacity in place by what they invested, so the next call sees the new
/// capacity while this year's supply did not. The returned world has `t`
/// one higher than `world`; demand comes from the assumptions for that year
/// where a row exists and otherwise carries over.
pub fn step(
    world: &WorldState,
    agents: &mut [AgentState],
) -> EngineResult<(WorldState, Vec<Action>)> {
    let states_before = agents.to_vec();

    let actions = agents
        .iter()
        .map(|agent| decide(agent, world))
        .collect::<EngineResult<Vec<_>>>()?;

    let cleared = clear_markets(world, &actions);

    for (agent, action) in agents.iter_mut().zip(&actions) {
        if !agent.agent_type.is_producer() {
            continue;
        }
        if let Some(tech) = agent.tech.as_deref() {
            agent.capacity += action.invested(tech);
        }
    }

    let actions = actions
        .into_iter()
        .zip(states_before)
        .zip(agents.iter())
        .map(|((mut action, before), after)| {
            action.state_before = Some(before);
            action.state_after = Some(after.clone());
            action
        })
        .collect();

    let t_next = cleared.t + 1;
    let mut demand = cleared.demand.clone();
    for traded in commodity::TRADED {
        if let Some(next) = cleared.assumptions.lookup(traded, t_next, DEMAND_PARAM) {
            demand.insert(traded.to_string(), next);
        }
    }

    let advanced = WorldState {
        t: t_next,
        demand,
        ..cleared
    };
    Ok((advanced, actions))
}

/// Run one step per element of `years`.
///
/// Only the number of years matters: `world.t` starts at `world0.t` and goes
/// up by one each step whatever the listed values are. A listed year that
/// does not match the world's year is logged as a warning.
pub fn simulate(
    world0: &WorldState,
    agents0: Vec<AgentState>,
    years: &[i32],
) -> EngineResult<History> {
    let mut world = world0.clone();
    let mut agents = agents0;
    let mut history = Vec::with_capacity(years.len());

    for &year in years {
        if year != world.t {
            warn!(
                requested = year,
                simulated = world.t,
                "year list does not follow the simulated clock"
            );
        }
        let (next, actions) = step(&world, &mut agents)?;
        info!(
            year = world.t,
            emissions = next.emissions,
            electricity_price = ?next.price(commodity::ELECTRICITY),
            hydrogen_price = ?next.price(commodity::HYDROGEN),
            "year simulated"
        );
        history.push(HistoryEntry {
            world: next.clone(),
            agents: agents.clone(),
            actions,
        });
        world = next;
    }

    Ok(history)
}
