//! World events: offer lifetime, reward resolution, the frenzy refresh
//! rule, and the engine's token validation.

use verdant_core::decimal::Decimal;
use verdant_core::engine::{EventClickOutcome, GameEngine};
use verdant_core::registry;
use verdant_core::rng::{RngBank, RngSlot};
use verdant_core::state::{GameState, SeedSource};
use verdant_core::world_event::{self, EventKind, EventOutcome};

#[test]
fn offers_expire_after_their_lifetime() {
    let mut rng = RngBank::new(3);
    let offer = world_event::spawn_offer(rng.slot(RngSlot::EventReward), 10_000);
    assert_eq!(offer.expires_at, 10_000 + registry::EVENT_OFFER_LIFETIME);
    assert!(!offer.token.is_empty());
}

#[test]
fn offer_tokens_come_from_the_event_stream() {
    // Same seed, same stream position: the token must reproduce exactly.
    let mut a = RngBank::new(11);
    let mut b = RngBank::new(11);
    let offer_a = world_event::spawn_offer(a.slot(RngSlot::EventReward), 0);
    let offer_b = world_event::spawn_offer(b.slot(RngSlot::EventReward), 0);
    assert_eq!(offer_a.kind, offer_b.kind);
    assert_eq!(offer_a.token, offer_b.token, "tokens must be seed-deterministic");

    let mut c = RngBank::new(12);
    let offer_c = world_event::spawn_offer(c.slot(RngSlot::EventReward), 0);
    assert_ne!(offer_a.token, offer_c.token, "a different seed must diverge");
}

#[test]
fn currency_burst_pays_production_then_clicks_then_the_flat_floor() {
    let mut rng = RngBank::new(3);

    let mut state = GameState::fresh(0);
    state.derived.production_rate = Decimal::from_f64(2.0);
    let outcome =
        world_event::resolve(&mut state, EventKind::CurrencyBurst, rng.slot(RngSlot::EventReward), 0);
    assert_eq!(outcome, EventOutcome::CurrencyGranted(Decimal::from_f64(1_800.0)));

    let mut state = GameState::fresh(0);
    state.derived.click_yield = Decimal::ONE;
    let outcome =
        world_event::resolve(&mut state, EventKind::CurrencyBurst, rng.slot(RngSlot::EventReward), 0);
    assert_eq!(outcome, EventOutcome::CurrencyGranted(Decimal::from_f64(900.0)));

    let mut state = GameState::fresh(0);
    let outcome =
        world_event::resolve(&mut state, EventKind::CurrencyBurst, rng.slot(RngSlot::EventReward), 0);
    assert_eq!(outcome, EventOutcome::CurrencyGranted(Decimal::from_f64(100.0)));
    assert_eq!(state.currency, Decimal::from_f64(100.0));
}

#[test]
fn seed_grant_lands_in_the_configured_range() {
    let mut rng = RngBank::new(99);
    for _ in 0..50 {
        let mut state = GameState::fresh(0);
        let outcome =
            world_event::resolve(&mut state, EventKind::SeedGrant, rng.slot(RngSlot::EventReward), 0);
        let EventOutcome::SeedsGranted(amount) = outcome else {
            panic!("expected a seed grant, got {outcome:?}");
        };
        assert!((1..=registry::SEED_EVENT_MAX).contains(&amount));
        assert_eq!(state.prestige.seeds_banked, amount);
        assert_eq!(state.meta.seed_gain_history.back().unwrap().source, SeedSource::Event);
    }
}

#[test]
fn frenzy_refreshes_instead_of_stacking() {
    let mut rng = RngBank::new(3);
    let mut state = GameState::fresh(0);

    world_event::resolve(&mut state, EventKind::Frenzy, rng.slot(RngSlot::EventReward), 0);
    let buff = state.frenzy.expect("frenzy active");
    assert_eq!(buff.multiplier, registry::FRENZY_MULT);
    assert_eq!(buff.until, registry::FRENZY_DURATION);

    // Re-triggered mid-buff: the window moves, the multiplier does not.
    world_event::resolve(&mut state, EventKind::Frenzy, rng.slot(RngSlot::EventReward), 10_000);
    let buff = state.frenzy.expect("still active");
    assert_eq!(buff.multiplier, registry::FRENZY_MULT, "never 7 x 7");
    assert_eq!(buff.until, 10_000 + registry::FRENZY_DURATION);
}

#[test]
fn engine_validates_the_offer_token() {
    let mut engine = GameEngine::fresh(5, 0);
    assert_eq!(
        engine.trigger_event_click("anything", 1_000),
        EventClickOutcome::NoPendingEvent
    );

    // The spawn timer fires on the first tick past its interval.
    engine.tick(registry::EVENT_SPAWN_INTERVAL).unwrap();
    let offer = engine.pending_event().expect("offer spawned").clone();

    let wrong = engine.trigger_event_click("bogus-token", registry::EVENT_SPAWN_INTERVAL + 1_000);
    assert_eq!(wrong, EventClickOutcome::TokenMismatch);
    assert!(engine.pending_event().is_some(), "a mismatch does not consume the offer");

    let late = engine.trigger_event_click(&offer.token, offer.expires_at);
    assert_eq!(late, EventClickOutcome::Expired);
    assert!(engine.pending_event().is_none(), "expiry clears the offer");
}

#[test]
fn engine_resolves_a_valid_click_once() {
    let mut engine = GameEngine::fresh(5, 0);
    engine.tick(registry::EVENT_SPAWN_INTERVAL).unwrap();
    let offer = engine.pending_event().expect("offer spawned").clone();

    let when = registry::EVENT_SPAWN_INTERVAL + 5_000;
    let first = engine.trigger_event_click(&offer.token, when);
    assert!(matches!(first, EventClickOutcome::Rewarded(_)));
    assert_eq!(
        engine.trigger_event_click(&offer.token, when + 1_000),
        EventClickOutcome::NoPendingEvent,
        "an offer resolves at most once"
    );
}
