//! World events — transient clickable rewards.
//!
//! The engine's event timer spawns an offer with an opaque token and a
//! short lifetime; the player clicks it (`trigger_event_click`) and the
//! reward resolves here. A frenzy re-triggered while active refreshes
//! its expiry; it never stacks multiplicatively. Tokens are drawn from
//! the event stream, so the core touches no platform RNG.

use crate::decimal::Decimal;
use crate::registry;
use crate::rng::SlotRng;
use crate::seeds;
use crate::state::{FrenzyBuff, GameState};
use crate::types::Millis;
use log::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CurrencyBurst,
    SeedGrant,
    Frenzy,
}

/// A pending clickable offer. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOffer {
    pub token: String,
    pub kind: EventKind,
    pub expires_at: Millis,
}

pub fn spawn_offer(rng: &mut SlotRng, now: Millis) -> EventOffer {
    let kind = match rng.next_u64_below(3) {
        0 => EventKind::CurrencyBurst,
        1 => EventKind::SeedGrant,
        _ => EventKind::Frenzy,
    };
    let token = Uuid::from_u64_pair(rng.next_u64(), rng.next_u64()).to_string();
    EventOffer {
        token,
        kind,
        expires_at: now + registry::EVENT_OFFER_LIFETIME,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    CurrencyGranted(Decimal),
    SeedsGranted(u64),
    FrenzyApplied { until: Millis },
}

/// Resolve a clicked event. Assumes the caller validated the token and
/// that derived stats are current.
pub fn resolve(state: &mut GameState, kind: EventKind, rng: &mut SlotRng, now: Millis) -> EventOutcome {
    match kind {
        EventKind::CurrencyBurst => {
            let rate = state.derived.production_rate;
            let reward = if !rate.is_zero() {
                rate.mul_f64(registry::BURST_SECONDS)
            } else if !state.derived.click_yield.is_zero() {
                state.derived.click_yield.mul_f64(registry::BURST_SECONDS)
            } else {
                Decimal::from_f64(registry::BURST_FLAT_MIN)
            };
            state.earn(&reward);
            debug!("currency burst: +{reward}");
            EventOutcome::CurrencyGranted(reward)
        }
        EventKind::SeedGrant => {
            let amount = 1 + rng.next_u64_below(registry::SEED_EVENT_MAX);
            seeds::event_award(state, amount, now);
            EventOutcome::SeedsGranted(amount)
        }
        EventKind::Frenzy => {
            let until = now + registry::FRENZY_DURATION;
            match &mut state.frenzy {
                // Refresh, never stack.
                Some(buff) if now < buff.until => buff.until = until,
                _ => {
                    state.frenzy =
                        Some(FrenzyBuff { multiplier: registry::FRENZY_MULT, until });
                }
            }
            EventOutcome::FrenzyApplied { until }
        }
    }
}
