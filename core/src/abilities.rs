//! Ability scheduling — per-ability timed buff state.
//!
//! Phase is derived purely from the two stored timestamps, so there is
//! nothing to advance on a timer: Ready -> Active (user, only when
//! ready) -> Cooldown (automatic at `active_until`) -> Ready (automatic
//! at `ready_at`). Activating while not ready is a refusal, not an error.

use crate::registry::{self, AbilityEffect};
use crate::state::{AbilityState, GameState};
use crate::types::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityPhase {
    Ready,
    Active,
    Cooldown,
}

pub fn phase(slot: &AbilityState, now: Millis) -> AbilityPhase {
    if now < slot.active_until {
        AbilityPhase::Active
    } else if now < slot.ready_at {
        AbilityPhase::Cooldown
    } else {
        AbilityPhase::Ready
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated { active_until: Millis },
    NotReady,
    UnknownAbility,
}

/// Activate an ability at `now`. Duration and cooldown are scaled by
/// research tuning at activation time; cooldown starts when the active
/// window ends.
pub fn activate(state: &mut GameState, id: &str, now: Millis) -> ActivationOutcome {
    let Some(def) = registry::find_ability(id) else {
        return ActivationOutcome::UnknownAbility;
    };
    let slot = state.abilities.entry(def.id).or_default();
    if phase(slot, now) != AbilityPhase::Ready {
        return ActivationOutcome::NotReady;
    }
    let (duration_mult, cooldown_mult) = tuning(state);
    let duration = (def.duration as f64 * duration_mult) as Millis;
    let cooldown = (def.cooldown as f64 * cooldown_mult) as Millis;
    let slot = state.abilities.entry(def.id).or_default();
    slot.active_until = now + duration;
    slot.ready_at = slot.active_until + cooldown;
    ActivationOutcome::Activated { active_until: slot.active_until }
}

/// Research-provided (duration, cooldown) scale factors.
fn tuning(state: &GameState) -> (f64, f64) {
    let mut duration_mult = 1.0;
    let mut cooldown_mult = 1.0;
    for id in &state.research_owned {
        if let Some(def) = registry::find_research(id) {
            if let registry::ResearchEffect::AbilityTuning { duration_mult: d, cooldown_mult: c } =
                def.effect
            {
                duration_mult *= d;
                cooldown_mult *= c;
            }
        }
    }
    (duration_mult, cooldown_mult)
}

/// Product of all currently active ability multipliers, split by the
/// stat they affect: (production, click).
pub fn active_multipliers(state: &GameState, now: Millis) -> (f64, f64) {
    let mut production = 1.0;
    let mut click = 1.0;
    for def in registry::ABILITIES {
        let Some(slot) = state.abilities.get(def.id) else { continue };
        if phase(slot, now) != AbilityPhase::Active {
            continue;
        }
        match def.effect {
            AbilityEffect::ProductionMult(m) => production *= m,
            AbilityEffect::ClickMult(m) => click *= m,
        }
    }
    (production, click)
}
