//! Automatic purchasing — ROI-ranked, one unit per invocation.
//!
//! Native-float math here is heuristic ranking only; the actual debit
//! goes through the purchase resolver in `Decimal`.

use crate::decimal::Decimal;
use crate::purchase;
use crate::registry::{self, BuildingDef};
use crate::state::GameState;
use crate::stats;
use crate::types::{Id, Millis};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub building: Id,
    pub cost: f64,
    /// Seconds of production for the next unit to pay for itself.
    pub roi_seconds: f64,
}

/// A building is visible to the planner once its predecessor is owned.
fn unlocked(state: &GameState, index: usize) -> bool {
    index == 0 || state.owned_count(registry::BUILDINGS[index - 1].id) > 0
}

/// Production gained by one more unit of `def`, at current multipliers.
fn production_delta(state: &GameState, def: &BuildingDef, now: Millis) -> f64 {
    let owned = state.owned_count(def.id);
    let rate = |count: u32| -> f64 {
        def.base_rate * count as f64 * stats::building_stack(state, def, count)
    };
    (rate(owned.saturating_add(1)) - rate(owned)) * stats::global_mult(state, now)
}

/// Pick the purchase target: among unlocked, affordable buildings with a
/// positive production delta and ROI under the configured threshold,
/// the minimum-ROI entry — ties broken by lowest cost, then by
/// registration order.
pub fn plan(state: &GameState, now: Millis) -> Option<Candidate> {
    let budget = spendable_budget(state);
    let mut best: Option<Candidate> = None;
    for (index, def) in registry::BUILDINGS.iter().enumerate() {
        if !unlocked(state, index) {
            continue;
        }
        let cost = purchase::unit_cost(state, def, state.owned_count(def.id));
        if cost > budget {
            continue;
        }
        let delta = production_delta(state, def, now);
        if delta <= 0.0 {
            continue;
        }
        let candidate = Candidate {
            building: def.id,
            cost: cost.to_f64(),
            roi_seconds: cost.to_f64() / delta,
        };
        if state.automation.roi.enabled
            && candidate.roi_seconds > state.automation.roi.threshold_seconds
        {
            continue;
        }
        let better = match &best {
            None => true,
            Some(b) => {
                candidate.roi_seconds < b.roi_seconds
                    || (candidate.roi_seconds == b.roi_seconds && candidate.cost < b.cost)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Current currency minus the configured reserve withholding.
pub fn spendable_budget(state: &GameState) -> Decimal {
    if state.automation.reserve.enabled {
        let keep_fraction = state.automation.reserve.percent / 100.0;
        state.currency.mul_f64(1.0 - keep_fraction)
    } else {
        state.currency
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoBuyReport {
    pub candidate: Candidate,
    pub achievements_unlocked: Vec<Id>,
    pub milestones_unlocked: Vec<Id>,
}

/// One planner run: buy exactly one unit of the best candidate, or do
/// nothing. Never an error on an empty field.
pub fn run(state: &mut GameState, now: Millis) -> Option<AutoBuyReport> {
    if !state.automation.auto_buy_enabled {
        return None;
    }
    let candidate = plan(state, now)?;
    match purchase::buy(state, candidate.building, 1, now) {
        purchase::PurchaseOutcome::Bought { achievements_unlocked, milestones_unlocked, .. } => {
            debug!("auto-buy: {} (roi {:.1}s)", candidate.building, candidate.roi_seconds);
            Some(AutoBuyReport { candidate, achievements_unlocked, milestones_unlocked })
        }
        // The plan pre-checked affordability against a stricter budget;
        // any refusal here is a skip, never an error.
        _ => None,
    }
}
