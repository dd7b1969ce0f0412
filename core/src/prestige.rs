//! Prestige: soft-reset seed currency, permanent milestone bonuses, and
//! the escalating kickstart buff.
//!
//! Milestones latch: once a predicate is true the flag stays set for the
//! rest of the epoch even if the underlying condition goes false again.
//! A prestige reset starts a fresh milestone set.

use crate::decimal::Decimal;
use crate::registry::{self, MilestonePredicate};
use crate::state::{GameState, Kickstart, MetaState};
use crate::types::{Id, Millis};
use log::info;

/// `floor(coefficient × sqrt(lifetime))`.
pub fn seeds_gain(lifetime: &Decimal) -> u64 {
    lifetime
        .sqrt()
        .mul_f64(registry::PRESTIGE_COEFFICIENT)
        .floor()
        .to_u64_saturating()
}

pub fn multiplier_for(seeds_banked: u64) -> f64 {
    1.0 + registry::PRESTIGE_MULT_PER_SEED * seeds_banked as f64
}

fn predicate_holds(state: &GameState, predicate: &MilestonePredicate) -> bool {
    match predicate {
        MilestonePredicate::TotalOwnership(n) => state.total_buildings_owned() >= *n as u64,
        MilestonePredicate::Owned { building, count } => state.owned_count(building) >= *count,
        MilestonePredicate::SeedsBanked(n) => state.prestige.seeds_banked >= *n,
    }
}

/// Evaluate every milestone and latch the ones whose predicate holds.
/// Returns the ids latched by this call. Runs at the head of every
/// derived-stats pass.
pub fn latch_milestones(state: &mut GameState) -> Vec<Id> {
    let mut latched = Vec::new();
    for def in registry::MILESTONES {
        if state.prestige.milestones_unlocked.contains(def.id) {
            continue;
        }
        if predicate_holds(state, &def.predicate) {
            state.prestige.milestones_unlocked.insert(def.id);
            latched.push(def.id);
        }
    }
    latched
}

/// Product of the bonus layers of every latched milestone.
pub fn milestone_mult(state: &GameState) -> f64 {
    state
        .prestige
        .milestones_unlocked
        .iter()
        .filter_map(|id| registry::find_milestone(id))
        .map(|def| def.bonus_mult)
        .product()
}

/// Clear an expired kickstart window.
pub fn decay_kickstart(state: &mut GameState, now: Millis) {
    if let Some(k) = state.prestige.kickstart {
        if now >= k.expires_at {
            state.prestige.kickstart = None;
        }
    }
}

/// Active kickstart multiplier, 1.0 when inactive.
pub fn kickstart_mult(state: &GameState, now: Millis) -> f64 {
    match state.prestige.kickstart {
        Some(k) if now < k.expires_at => registry::kickstart_tier(k.level).0,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrestigeOutcome {
    Reset { seeds_gained: u64 },
    /// Not enough lifetime earnings for even a single seed; state unchanged.
    NothingToGain,
}

/// Soft reset. Preserves the whitelist (achievements, research, user
/// preferences, automation settings, the carried prestige block) and
/// reinitializes everything else. The highest kickstart tier armed by the
/// ending epoch's milestones becomes the post-reset active buff.
pub fn perform(state: &mut GameState, now: Millis) -> PrestigeOutcome {
    let gained = seeds_gain(&state.lifetime_currency);
    if gained == 0 {
        return PrestigeOutcome::NothingToGain;
    }

    let kickstart_level = state
        .prestige
        .milestones_unlocked
        .iter()
        .filter_map(|id| registry::find_milestone(id))
        .filter_map(|def| def.kickstart_tier)
        .max()
        .unwrap_or(0);

    let seeds_banked = state.prestige.seeds_banked + gained;
    let carried_lifetime = state.prestige.lifetime_currency;

    let preserved_achievements = std::mem::take(&mut state.achievements_unlocked);
    let preserved_research = std::mem::take(&mut state.research_owned);
    let preserved_prefs = state.prefs.clone();
    let preserved_automation = state.automation;

    *state = GameState::fresh(now);
    state.achievements_unlocked = preserved_achievements;
    state.research_owned = preserved_research;
    state.prefs = preserved_prefs;
    state.automation = preserved_automation;
    state.meta = MetaState::fresh(now);

    state.prestige.seeds_banked = seeds_banked;
    state.prestige.multiplier = multiplier_for(seeds_banked);
    state.prestige.lifetime_currency = carried_lifetime;
    state.prestige.last_reset_at = now;
    if kickstart_level > 0 {
        let (_, duration) = registry::kickstart_tier(kickstart_level);
        state.prestige.kickstart = Some(Kickstart {
            level: kickstart_level,
            expires_at: now + duration,
        });
    }

    info!(
        "prestige reset: +{gained} seeds ({} banked), kickstart tier {kickstart_level}",
        seeds_banked
    );
    PrestigeOutcome::Reset { seeds_gained: gained }
}
