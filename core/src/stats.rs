//! Derived-stats recomputation — production rate and click yield.
//!
//! RULE: This pass is the only writer of `state.derived`, and it always
//! overwrites both fields. It must run after every mutation that changes
//! ownership, unlocked bonuses, or active timed buffs, and before any
//! consumer reads the derived values. Given unchanged inputs the pass is
//! idempotent.
//!
//! Pipeline: per building, `base_rate × owned × building stack` (tier
//! upgrades, research building multipliers, softcap penalty — each layer
//! exactly once), summed, then the global stack (achievements ×
//! milestones × prestige × kickstart × active abilities × frenzy ×
//! research globals). Click yield: base 1 × click stack × the same
//! global layers.

use crate::abilities;
use crate::decimal::Decimal;
use crate::prestige;
use crate::registry::{self, BuildingDef, ResearchEffect, UpgradeKind};
use crate::state::GameState;
use crate::types::{Id, Millis};

/// Milestone latching runs at the head of the pass so a bonus unlocked
/// by the triggering mutation lands in this same recomputation. Returns
/// the milestone ids latched by this pass.
pub fn recalc(state: &mut GameState, now: Millis) -> Vec<Id> {
    prestige::decay_kickstart(state, now);
    let latched = prestige::latch_milestones(state);

    let mut sum = Decimal::ZERO;
    for def in registry::BUILDINGS {
        let owned = state.owned_count(def.id);
        if owned == 0 {
            continue;
        }
        let per_unit = Decimal::from_f64(def.base_rate).mul_f64(building_stack(state, def, owned));
        sum = sum.add(&per_unit.mul_f64(owned as f64));
    }

    let (ability_prod, ability_click) = abilities::active_multipliers(state, now);
    let global = global_mult(state, now);

    state.derived.production_rate = sum.mul_f64(global * ability_prod);
    state.derived.click_yield = Decimal::ONE.mul_f64(click_stack(state) * global * ability_click);
    latched
}

/// Per-building multiplier stack: tier upgrades × research building
/// multipliers × softcap penalty. Order is irrelevant (pure product) but
/// every layer contributes exactly once.
pub fn building_stack(state: &GameState, def: &BuildingDef, owned: u32) -> f64 {
    let mut stack = 1.0;
    for id in &state.upgrades_owned {
        if let Some(up) = registry::find_upgrade(id) {
            if let UpgradeKind::BuildingTier { building, multiplier } = up.kind {
                if building == def.id {
                    stack *= multiplier;
                }
            }
        }
    }
    for id in &state.research_owned {
        if let Some(r) = registry::find_research(id) {
            if let ResearchEffect::BuildingMult { building, multiplier } = r.effect {
                if building == def.id {
                    stack *= multiplier;
                }
            }
        }
    }
    stack * softcap(owned, def.softcap_threshold)
}

/// Diminishing-returns penalty past the ownership threshold: scales the
/// stack by sqrt(threshold / count). Continuous at the threshold, never
/// reaches zero.
pub fn softcap(owned: u32, threshold: u32) -> f64 {
    if owned <= threshold || threshold == 0 {
        1.0
    } else {
        (threshold as f64 / owned as f64).sqrt()
    }
}

/// The global multiplier layers shared by production and click yield.
/// Abilities are handled separately because they split by affected stat.
pub fn global_mult(state: &GameState, now: Millis) -> f64 {
    let mut mult = 1.0;
    for id in &state.achievements_unlocked {
        if let Some(a) = registry::find_achievement(id) {
            mult *= a.reward_mult;
        }
    }
    mult *= prestige::milestone_mult(state);
    mult *= state.prestige.multiplier;
    mult *= prestige::kickstart_mult(state, now);
    for id in &state.research_owned {
        if let Some(r) = registry::find_research(id) {
            if let ResearchEffect::GlobalMult(m) = r.effect {
                mult *= m;
            }
        }
    }
    if let Some(frenzy) = &state.frenzy {
        if now < frenzy.until {
            mult *= frenzy.multiplier;
        }
    }
    mult
}

/// Click-specific layers: click upgrades × research click multipliers.
fn click_stack(state: &GameState) -> f64 {
    let mut stack = 1.0;
    for id in &state.upgrades_owned {
        if let Some(up) = registry::find_upgrade(id) {
            if let UpgradeKind::Click { multiplier } = up.kind {
                stack *= multiplier;
            }
        }
    }
    for id in &state.research_owned {
        if let Some(r) = registry::find_research(id) {
            if let ResearchEffect::ClickMult(m) = r.effect {
                stack *= m;
            }
        }
    }
    stack
}
