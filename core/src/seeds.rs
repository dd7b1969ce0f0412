//! Seed economy — prestige-currency micro-rewards.
//!
//! Three award paths: click rolls (Bernoulli per manual action), idle
//! rolls (batched catch-up over fixed intervals), and one-time synergy
//! bonuses. Click and idle rolls share one trailing-window rate throttle;
//! every individual award appends to the gain history immediately, so an
//! award earlier in a tick counts toward throttling later rolls in the
//! same tick.

use crate::decimal::Decimal;
use crate::registry::{self, ResearchEffect};
use crate::rng::SlotRng;
use crate::state::{GameState, SeedGain, SeedSource};
use crate::types::{Id, Millis};
use log::debug;

/// Click-roll chance: base plus research bonuses, capped at the ceiling.
pub fn click_chance(state: &GameState) -> f64 {
    let mut chance = registry::SEED_CLICK_BASE_CHANCE;
    for id in &state.research_owned {
        if let Some(def) = registry::find_research(id) {
            if let ResearchEffect::SeedChanceBonus(bonus) = def.effect {
                chance += bonus;
            }
        }
    }
    chance.min(registry::SEED_CHANCE_CEILING)
}

/// Seeds earned inside the trailing throttle window.
pub fn earned_in_window(state: &GameState, now: Millis) -> u64 {
    let cutoff = now - registry::SEED_THROTTLE_WINDOW;
    state
        .meta
        .seed_gain_history
        .iter()
        .filter(|g| g.time > cutoff)
        .map(|g| g.amount)
        .sum()
}

/// At or above the tier cap, no roll occurs regardless of chance.
pub fn throttled(state: &GameState, now: Millis) -> bool {
    earned_in_window(state, now) >= registry::seed_rate_cap(&state.lifetime_currency)
}

/// Bank an award and append it to the gain history immediately.
fn award(state: &mut GameState, amount: u64, source: SeedSource, now: Millis) {
    state.prestige.seeds_banked += amount;
    state.meta.push_seed_gain(SeedGain { time: now, amount, source });
    debug!("seed award: +{amount} ({source:?})");
}

/// One manual-action roll. Returns the amount awarded, if any.
pub fn click_roll(state: &mut GameState, rng: &mut SlotRng, now: Millis) -> Option<u64> {
    if throttled(state, now) {
        return None;
    }
    if !rng.chance(click_chance(state)) {
        return None;
    }
    award(state, 1, SeedSource::Click, now);
    Some(1)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleRollOutcome {
    /// Interval indices consumed by this batch.
    pub intervals_processed: u64,
    pub seeds_awarded: u64,
}

/// Catch up on every outstanding idle interval since the last
/// interaction. Each interval index is consumed exactly once: none is
/// skipped, none double-processed, and the sub-interval remainder stays
/// pending for the next call.
pub fn process_idle_rolls(
    state: &mut GameState,
    rng: &mut SlotRng,
    now: Millis,
) -> IdleRollOutcome {
    let idle_elapsed = (now - state.meta.last_interaction_at).max(0);
    let total_intervals = (idle_elapsed / registry::SEED_IDLE_INTERVAL) as u64;
    let mut outcome = IdleRollOutcome::default();
    for _ in state.meta.idle_rolls_processed..total_intervals {
        state.meta.idle_rolls_processed += 1;
        outcome.intervals_processed += 1;
        if throttled(state, now) {
            continue;
        }
        if rng.chance(registry::SEED_IDLE_CHANCE) {
            award(state, 1, SeedSource::Idle, now);
            outcome.seeds_awarded += 1;
        }
    }
    outcome
}

/// Award from the seed world event. Bypasses chance, still appends to
/// the throttle history.
pub fn event_award(state: &mut GameState, amount: u64, now: Millis) {
    award(state, amount, SeedSource::Event, now);
}

/// Reset the idle anchor on a manual interaction.
pub fn record_interaction(state: &mut GameState, now: Millis) {
    state.meta.last_interaction_at = now;
    state.meta.idle_rolls_processed = 0;
}

/// Check every unclaimed synergy; the first tick all of one's conditions
/// hold simultaneously grants its one-time currency reward and records
/// the claim permanently. Claimed ids are never re-evaluated, even if
/// the conditions later cycle false and true again.
pub fn evaluate_synergies(state: &mut GameState) -> Vec<(Id, Decimal)> {
    let mut claimed = Vec::new();
    for def in registry::SYNERGIES {
        if state.meta.synergy_claims.contains(def.id) {
            continue;
        }
        let buildings_ok = def
            .requires_buildings
            .iter()
            .all(|(id, count)| state.owned_count(id) >= *count);
        let research_ok = def.requires_research.iter().all(|id| state.has_research(id));
        let upgrades_ok = def.requires_upgrades.iter().all(|id| state.has_upgrade(id));
        if !(buildings_ok && research_ok && upgrades_ok) {
            continue;
        }
        let reward = state
            .derived
            .production_rate
            .mul_f64(def.reward_seconds)
            .max(Decimal::from_f64(def.min_reward));
        state.earn(&reward);
        state.meta.synergy_claims.insert(def.id);
        debug!("synergy {} claimed for {reward}", def.id);
        claimed.push((def.id, reward));
    }
    claimed
}
