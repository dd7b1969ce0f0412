//! Purchase resolution — cost curves and transactional buys.
//!
//! RULE: A buy is atomic. Either the full quantity is paid for and
//! granted (then achievements are evaluated and the stats pass runs
//! exactly once), or the state is untouched and the caller gets a
//! refusal. Nothing here panics for player-reachable conditions.

use crate::decimal::Decimal;
use crate::registry::{self, AchievementPredicate, BuildingDef, Requirement, ResearchEffect, UpgradeKind};
use crate::state::GameState;
use crate::stats;
use crate::types::{Id, Millis};
use log::debug;

/// Aggregate cost-reduction multiplier from owned upgrades and research,
/// floor-clamped: discounts never push a price below 80% of nominal.
pub fn external_cost_mult(state: &GameState) -> f64 {
    let mut mult = 1.0;
    for id in &state.upgrades_owned {
        if let Some(up) = registry::find_upgrade(id) {
            if let UpgradeKind::CostReduction { factor } = up.kind {
                mult *= factor;
            }
        }
    }
    for id in &state.research_owned {
        if let Some(r) = registry::find_research(id) {
            if let ResearchEffect::CostFactor(f) = r.effect {
                mult *= f;
            }
        }
    }
    mult.max(registry::COST_MULT_FLOOR)
}

/// Cost of the next unit at the given owned count:
/// `base_cost × cost_factor^owned × external multiplier`.
pub fn unit_cost(state: &GameState, def: &BuildingDef, owned: u32) -> Decimal {
    Decimal::from_f64(def.base_cost)
        .mul(&Decimal::from_f64(def.cost_factor).powi(owned))
        .mul_f64(external_cost_mult(state))
}

/// Total cost of `quantity` units starting at `owned`: the geometric
/// series `base × f^owned × (f^q − 1) / (f − 1)`, in closed form.
pub fn bulk_cost(state: &GameState, def: &BuildingDef, owned: u32, quantity: u32) -> Decimal {
    if quantity == 0 {
        return Decimal::ZERO;
    }
    let base = Decimal::from_f64(def.base_cost);
    if def.cost_factor <= 1.0 {
        return base
            .mul_f64(quantity as f64)
            .mul_f64(external_cost_mult(state));
    }
    let factor = Decimal::from_f64(def.cost_factor);
    let numerator = factor.powi(quantity).saturating_sub(&Decimal::ONE);
    let denominator = Decimal::from_f64(def.cost_factor - 1.0);
    base.mul(&factor.powi(owned))
        .mul(&numerator.div(&denominator))
        .mul_f64(external_cost_mult(state))
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Bought {
        cost: Decimal,
        achievements_unlocked: Vec<Id>,
        milestones_unlocked: Vec<Id>,
    },
    InsufficientFunds,
    UnknownId,
    AlreadyOwned,
    RequirementNotMet,
    InvalidQuantity,
}

/// Buy `quantity` of a building, or (quantity ignored beyond 1) an
/// upgrade or research entry, by id.
pub fn buy(state: &mut GameState, id: &str, quantity: u32, now: Millis) -> PurchaseOutcome {
    if let Some(def) = registry::find_building(id) {
        return buy_building(state, def, quantity, now);
    }
    if let Some(def) = registry::find_upgrade(id) {
        return buy_upgrade(state, def, now);
    }
    if let Some(def) = registry::find_research(id) {
        return buy_research(state, def, now);
    }
    PurchaseOutcome::UnknownId
}

fn buy_building(
    state: &mut GameState,
    def: &'static BuildingDef,
    quantity: u32,
    now: Millis,
) -> PurchaseOutcome {
    if quantity == 0 {
        return PurchaseOutcome::InvalidQuantity;
    }
    let owned = state.owned_count(def.id);
    let cost = bulk_cost(state, def, owned, quantity);
    if state.currency < cost {
        return PurchaseOutcome::InsufficientFunds;
    }
    state.currency = state.currency.saturating_sub(&cost);
    let owned_entry = state.ownership.entry(def.id).or_insert(0);
    *owned_entry = owned_entry.saturating_add(quantity);
    debug!("bought {}x {} for {}", quantity, def.id, cost);
    settle(state, cost, now)
}

fn buy_upgrade(
    state: &mut GameState,
    def: &'static registry::UpgradeDef,
    now: Millis,
) -> PurchaseOutcome {
    if state.has_upgrade(def.id) {
        return PurchaseOutcome::AlreadyOwned;
    }
    match def.requires {
        Requirement::None => {}
        Requirement::Owned { building, count } => {
            if state.owned_count(building) < count {
                return PurchaseOutcome::RequirementNotMet;
            }
        }
    }
    let cost = Decimal::from_f64(def.cost).mul_f64(external_cost_mult(state));
    if state.currency < cost {
        return PurchaseOutcome::InsufficientFunds;
    }
    state.currency = state.currency.saturating_sub(&cost);
    state.upgrades_owned.insert(def.id);
    debug!("bought upgrade {} for {}", def.id, cost);
    settle(state, cost, now)
}

fn buy_research(
    state: &mut GameState,
    def: &'static registry::ResearchDef,
    now: Millis,
) -> PurchaseOutcome {
    if state.has_research(def.id) {
        return PurchaseOutcome::AlreadyOwned;
    }
    if let Some(prereq) = def.prerequisite {
        if !state.has_research(prereq) {
            return PurchaseOutcome::RequirementNotMet;
        }
    }
    let cost = Decimal::from_f64(def.cost).mul_f64(external_cost_mult(state));
    if state.currency < cost {
        return PurchaseOutcome::InsufficientFunds;
    }
    state.currency = state.currency.saturating_sub(&cost);
    state.research_owned.push(def.id);
    debug!("bought research {} for {}", def.id, cost);
    settle(state, cost, now)
}

/// Post-purchase bookkeeping: achievement evaluation, then one stats
/// pass — so a bonus unlocked by this purchase already applies to the
/// recomputed rates.
fn settle(state: &mut GameState, cost: Decimal, now: Millis) -> PurchaseOutcome {
    let achievements_unlocked = evaluate_achievements(state);
    let milestones_unlocked = stats::recalc(state, now);
    PurchaseOutcome::Bought { cost, achievements_unlocked, milestones_unlocked }
}

/// Pure predicate sweep over ownership/harvest/click totals. Only ever
/// sets flags, never clears them. Returns the newly unlocked ids.
pub fn evaluate_achievements(state: &mut GameState) -> Vec<Id> {
    let mut unlocked = Vec::new();
    for def in registry::ACHIEVEMENTS {
        if state.achievements_unlocked.contains(def.id) {
            continue;
        }
        let holds = match &def.predicate {
            AchievementPredicate::Owned { building, count } => {
                state.owned_count(building) >= *count
            }
            AchievementPredicate::TotalHarvested { amount } => {
                state.total_harvested >= Decimal::from_f64(*amount)
            }
            AchievementPredicate::Clicks { count } => state.clicks >= *count,
        };
        if holds {
            state.achievements_unlocked.insert(def.id);
            unlocked.push(def.id);
        }
    }
    unlocked
}
