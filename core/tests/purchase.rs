//! Purchase resolution: cost curves, requirement gating, atomicity, and
//! the post-purchase bonus pass.

use verdant_core::decimal::Decimal;
use verdant_core::purchase::{self, PurchaseOutcome};
use verdant_core::registry;
use verdant_core::state::GameState;

fn state_with_currency(amount: f64) -> GameState {
    let mut state = GameState::fresh(0);
    state.currency = Decimal::from_f64(amount);
    state
}

#[test]
fn first_building_unit_costs_the_base_price() {
    let state = GameState::fresh(0);
    let def = registry::find_building("sprout_patch").unwrap();
    let cost = purchase::unit_cost(&state, def, 0);
    assert_eq!(cost, Decimal::from_f64(25.0));
}

#[test]
fn second_unit_scales_by_the_cost_factor() {
    let state = GameState::fresh(0);
    let def = registry::find_building("sprout_patch").unwrap();
    let cost = purchase::unit_cost(&state, def, 1).to_f64();
    assert!(
        (cost - 29.5).abs() < 1e-9,
        "25 x 1.18 should price the second unit at 29.5, got {cost}"
    );
}

#[test]
fn bulk_cost_matches_the_unit_sum() {
    let state = GameState::fresh(0);
    let def = registry::find_building("sprout_patch").unwrap();
    let bulk = purchase::bulk_cost(&state, def, 0, 3).to_f64();
    let summed: f64 = (0..3)
        .map(|owned| purchase::unit_cost(&state, def, owned).to_f64())
        .sum();
    assert!(
        (bulk - summed).abs() / summed < 1e-9,
        "closed-form bulk ({bulk}) must equal the unit sum ({summed})"
    );
    assert_eq!(purchase::bulk_cost(&state, def, 0, 0), Decimal::ZERO);
}

#[test]
fn ownership_saturates_at_the_counter_ceiling() {
    let mut state = GameState::fresh(0);
    state.ownership.insert("sprout_patch", u32::MAX - 2);
    // Absurd but affordable: the cost curve tops out near e3.1e8.
    state.currency = Decimal::new(1.0, 320_000_000);

    let outcome = purchase::buy(&mut state, "sprout_patch", 5, 0);
    assert!(matches!(outcome, PurchaseOutcome::Bought { .. }));
    assert_eq!(
        state.owned_count("sprout_patch"),
        u32::MAX,
        "a bulk buy past the ceiling must clamp, not wrap"
    );
}

#[test]
fn insufficient_funds_leaves_the_state_untouched() {
    let mut state = state_with_currency(24.0);
    let before = state.currency;
    let outcome = purchase::buy(&mut state, "sprout_patch", 1, 0);
    assert_eq!(outcome, PurchaseOutcome::InsufficientFunds);
    assert_eq!(state.currency, before);
    assert_eq!(state.owned_count("sprout_patch"), 0);
    assert!(state.achievements_unlocked.is_empty());
}

#[test]
fn successful_buy_debits_and_grants_atomically() {
    let mut state = state_with_currency(25.0);
    let outcome = purchase::buy(&mut state, "sprout_patch", 1, 0);
    match outcome {
        PurchaseOutcome::Bought { cost, achievements_unlocked, .. } => {
            assert_eq!(cost, Decimal::from_f64(25.0));
            assert!(
                achievements_unlocked.contains(&"first_sprout"),
                "owning the first patch unlocks its achievement in the same buy"
            );
        }
        other => panic!("expected Bought, got {other:?}"),
    }
    assert_eq!(state.currency, Decimal::ZERO);
    assert_eq!(state.owned_count("sprout_patch"), 1);
}

#[test]
fn bonus_unlocked_by_a_buy_applies_to_the_same_recompute() {
    let mut state = state_with_currency(25.0);
    purchase::buy(&mut state, "sprout_patch", 1, 0);
    // 0.5 base rate x 1.01 first_sprout reward, in one settle pass.
    let rate = state.derived.production_rate.to_f64();
    assert!(
        (rate - 0.505).abs() < 1e-12,
        "achievement bonus must land in the post-buy rate, got {rate}"
    );
}

#[test]
fn upgrade_requires_its_building_count() {
    let mut state = state_with_currency(1.0e6);
    let outcome = purchase::buy(&mut state, "sturdy_trowel", 1, 0);
    assert_eq!(outcome, PurchaseOutcome::RequirementNotMet);

    state.ownership.insert("sprout_patch", 10);
    let outcome = purchase::buy(&mut state, "sturdy_trowel", 1, 0);
    assert!(matches!(outcome, PurchaseOutcome::Bought { .. }));
    assert!(state.has_upgrade("sturdy_trowel"));

    let outcome = purchase::buy(&mut state, "sturdy_trowel", 1, 0);
    assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);
}

#[test]
fn research_enforces_its_prerequisite_chain() {
    let mut state = state_with_currency(1.0e8);
    assert_eq!(
        purchase::buy(&mut state, "botany_2", 1, 0),
        PurchaseOutcome::RequirementNotMet
    );
    assert!(matches!(
        purchase::buy(&mut state, "botany_1", 1, 0),
        PurchaseOutcome::Bought { .. }
    ));
    assert!(matches!(
        purchase::buy(&mut state, "botany_2", 1, 0),
        PurchaseOutcome::Bought { .. }
    ));
    assert_eq!(state.research_owned, vec!["botany_1", "botany_2"]);
}

#[test]
fn refusal_variants_for_bad_input() {
    let mut state = state_with_currency(1.0e9);
    assert_eq!(
        purchase::buy(&mut state, "moon_garden", 1, 0),
        PurchaseOutcome::UnknownId
    );
    assert_eq!(
        purchase::buy(&mut state, "sprout_patch", 0, 0),
        PurchaseOutcome::InvalidQuantity
    );
}

#[test]
fn cost_reductions_multiply_and_stay_floored() {
    let mut state = GameState::fresh(0);
    state.upgrades_owned.insert("bulk_seed_contract");
    state.upgrades_owned.insert("cooperative_buying");
    state.research_owned.push("logistics");
    let mult = purchase::external_cost_mult(&state);
    assert!(
        (mult - 0.97 * 0.95 * 0.95).abs() < 1e-12,
        "discounts compose multiplicatively, got {mult}"
    );
    assert!(mult >= registry::COST_MULT_FLOOR);
}

#[test]
fn achievement_sweep_latches_and_never_clears() {
    let mut state = GameState::fresh(0);
    state.clicks = 100;
    let unlocked = purchase::evaluate_achievements(&mut state);
    assert_eq!(unlocked, vec!["busy_hands"]);

    // The predicate input regressing does not clear the flag.
    state.clicks = 0;
    let again = purchase::evaluate_achievements(&mut state);
    assert!(again.is_empty());
    assert!(state.achievements_unlocked.contains("busy_hands"));
}
