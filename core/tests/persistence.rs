//! Save blob round-trips, the generation migration chain, and the
//! export/import wrapping.

use verdant_core::decimal::Decimal;
use verdant_core::registry;
use verdant_core::rng::{RngBank, RngSlot};
use verdant_core::save::{self, CURRENT_SAVE_VERSION};
use verdant_core::seeds;
use verdant_core::state::{FrenzyBuff, GameState, Kickstart, SeedGain, SeedSource};
use verdant_core::store::{SaveStore, AUTOSAVE_SLOT};
use verdant_core::types::{MS_PER_HOUR, MS_PER_SEC};
use verdant_core::engine::GameEngine;

/// A state touching every persisted section.
fn populated_state() -> GameState {
    let mut state = GameState::fresh(1_000);
    state.currency = Decimal::new(4.2, 12);
    state.lifetime_currency = Decimal::new(9.9, 14);
    state.total_harvested = Decimal::new(1.0, 15);
    state.clicks = 4_321;
    state.ownership.insert("sprout_patch", 42);
    state.ownership.insert("beehive", 7);
    state.upgrades_owned.insert("firm_grip");
    state.research_owned.push("botany_1");
    state.achievements_unlocked.insert("first_sprout");
    state.prestige.seeds_banked = 12;
    state.prestige.multiplier = 1.6;
    state.prestige.lifetime_currency = Decimal::new(3.0, 16);
    state.prestige.milestones_unlocked.insert("green_thumb");
    state.prestige.kickstart = Some(Kickstart { level: 2, expires_at: 90_000 });
    state.abilities.insert(
        "overdrive",
        verdant_core::state::AbilityState { active_until: 5_000, ready_at: 65_000 },
    );
    state.automation.auto_buy_enabled = true;
    state.automation.reserve.enabled = true;
    state.automation.reserve.percent = 15.0;
    state.meta.last_seen_at = 2_000;
    state.meta.last_production_rate_at_save = Decimal::new(7.5, 3);
    state.meta.push_seed_gain(SeedGain { time: 500, amount: 1, source: SeedSource::Click });
    state.meta.synergy_claims.insert("bees_and_blossoms");
    state.frenzy = Some(FrenzyBuff { multiplier: 7.0, until: 10_000 });
    state.prefs.locale = "de".to_string();
    state.prefs.audio_volume = 0.3;
    state
}

#[test]
fn encode_decode_round_trip_is_lossless() {
    let save = save::to_save(&populated_state());
    let json = save::encode(&save).expect("encode");
    let back = save::decode(&json).expect("decode");
    assert_eq!(back, save, "decode(encode(s)) must reproduce s field for field");
}

#[test]
fn export_import_round_trip_is_lossless() {
    let save = save::to_save(&populated_state());
    let text = save::export(&save).expect("export");
    assert!(!text.contains('{'), "export must not be raw JSON");
    let back = save::import(&text).expect("import");
    assert_eq!(back, save);
}

#[test]
fn import_rejects_garbage_recoverably() {
    assert!(save::import("not base64 at all!!!").is_err());
    // Valid wrapping over a non-save payload is still a refusal.
    use base64::Engine;
    let wrapped = base64::engine::general_purpose::STANDARD.encode("{\"hello\":1}");
    assert!(save::import(&wrapped).is_err());
}

#[test]
fn state_reconstruction_drops_unknown_content_ids() {
    let mut save = save::to_save(&populated_state());
    save.ownership.insert("moon_garden".to_string(), 99);
    save.upgrades_owned.push("laser_trowel".to_string());
    save.achievements_unlocked.push("time_traveler".to_string());
    save.prestige.milestones_unlocked.push("imaginary".to_string());

    let state = save::from_save(save, 10_000);
    assert_eq!(state.owned_count("moon_garden"), 0);
    assert_eq!(state.owned_count("sprout_patch"), 42, "known ids survive");
    assert!(!state.has_upgrade("laser_trowel"));
    assert!(!state.achievements_unlocked.contains("time_traveler"));
    assert!(!state.prestige.milestones_unlocked.contains("imaginary"));
}

#[test]
fn reconstruction_clamps_out_of_range_numerics() {
    let mut save = save::to_save(&GameState::fresh(0));
    save.automation.roi_threshold_seconds = 1.0e9;
    save.automation.reserve_percent = f64::NAN;
    save.prestige.multiplier = 0.2;
    save.prefs.audio_volume = 4.0;

    let state = save::from_save(save, 0);
    assert_eq!(state.automation.roi.threshold_seconds, 86_400.0);
    assert_eq!(state.automation.reserve.percent, 0.0, "non-finite resets to default");
    assert!(state.prestige.multiplier >= 1.0);
    assert_eq!(state.prefs.audio_volume, 1.0);
}

#[test]
fn generation_one_blob_migrates_to_current() {
    let json = r#"{
        "save_version": 1,
        "currency": "150",
        "lifetime_currency": "1e3",
        "total_harvested": "1e3",
        "clicks": 5,
        "ownership": { "sprout_patch": 3 }
    }"#;
    let save = save::load_any_generation(json).expect("v1 blob must load");
    assert_eq!(save.save_version, CURRENT_SAVE_VERSION);
    assert_eq!(save.currency, Decimal::from_f64(150.0));
    assert_eq!(save.ownership.get("sprout_patch"), Some(&3));
    assert_eq!(save.prestige.seeds_banked, 0);
    assert_eq!(save.prestige.multiplier, 1.0);
    assert!(save.abilities.is_empty());
    assert_eq!(save.meta.idle_rolls_processed, 0);
}

#[test]
fn stale_idle_anchors_are_pulled_up_to_the_offline_horizon() {
    // A generation-one blob carries no idle anchor at all; resuming a
    // month later must not owe a month of interval rolls.
    let json = r#"{
        "save_version": 1,
        "currency": "10",
        "lifetime_currency": "10",
        "total_harvested": "10"
    }"#;
    let blob = save::load_any_generation(json).expect("v1 blob must load");
    let now = 30 * 24 * MS_PER_HOUR;
    let mut state = save::from_save(blob, now);
    assert_eq!(state.meta.last_interaction_at, now - registry::OFFLINE_CAP_BASE);
    assert_eq!(state.meta.idle_rolls_processed, 0);

    let mut rng = RngBank::new(1);
    let outcome = seeds::process_idle_rolls(&mut state, rng.slot(RngSlot::IdleRoll), now);
    assert_eq!(
        outcome.intervals_processed,
        (registry::OFFLINE_CAP_BASE / registry::SEED_IDLE_INTERVAL) as u64,
        "the backlog must span the offline cap, not the blob's whole absence"
    );
}

#[test]
fn recent_idle_anchors_survive_reconstruction_unchanged() {
    let mut state = GameState::fresh(0);
    let now = 5_000 * MS_PER_SEC;
    state.meta.last_interaction_at = now - 90 * MS_PER_SEC;
    state.meta.idle_rolls_processed = 1;
    let blob = save::to_save(&state);

    let back = save::from_save(blob, now);
    assert_eq!(back.meta.last_interaction_at, now - 90 * MS_PER_SEC);
    assert_eq!(back.meta.idle_rolls_processed, 1);
}

#[test]
fn legacy_surge_key_becomes_overdrive() {
    let json = r#"{
        "save_version": 3,
        "currency": "0",
        "lifetime_currency": "0",
        "total_harvested": "0",
        "abilities": {
            "surge": { "active_until": 1000, "ready_at": 2000 }
        },
        "last_seen_at": 1500
    }"#;
    let save = save::load_any_generation(json).expect("v3 blob must load");
    assert!(!save.abilities.contains_key("surge"));
    let slot = save.abilities.get("overdrive").expect("renamed key present");
    assert_eq!(slot.active_until, 1000);
    assert_eq!(slot.ready_at, 2000);
}

#[test]
fn generation_five_automation_is_clamped_during_migration() {
    let json = r#"{
        "save_version": 5,
        "currency": "10",
        "lifetime_currency": "10",
        "total_harvested": "10",
        "automation": {
            "auto_buy_enabled": true,
            "roi_enabled": true,
            "roi_threshold_seconds": 1000000.0,
            "reserve_enabled": true,
            "reserve_percent": 95.0
        }
    }"#;
    let save = save::load_any_generation(json).expect("v5 blob must load");
    assert_eq!(save.automation.roi_threshold_seconds, 86_400.0);
    assert_eq!(save.automation.reserve_percent, 30.0);
    assert!(save.automation.auto_buy_enabled);
}

#[test]
fn unreadable_legacy_decimals_sanitize_to_zero() {
    let json = r#"{
        "save_version": 6,
        "currency": "nan",
        "lifetime_currency": "-5",
        "total_harvested": "2e6"
    }"#;
    let save = save::load_any_generation(json).expect("v6 blob must load");
    assert_eq!(save.currency, Decimal::ZERO);
    assert_eq!(save.lifetime_currency, Decimal::ZERO);
    assert_eq!(save.total_harvested, Decimal::new(2.0, 6));
}

#[test]
fn unrecognized_or_missing_version_is_discarded() {
    assert!(save::load_any_generation(r#"{"save_version": 42}"#).is_none());
    assert!(save::load_any_generation(r#"{"currency": "5"}"#).is_none());
    assert!(save::load_any_generation(r#"{"save_version": "seven"}"#).is_none());
    assert!(save::load_any_generation("not json").is_none());
}

#[test]
fn migrating_a_current_blob_changes_nothing() {
    let save = save::to_save(&populated_state());
    let json = save::encode(&save).unwrap();
    let migrated = save::load_any_generation(&json).expect("current blob must load");
    assert_eq!(migrated, save, "the chain must be a no-op at the current generation");
}

#[test]
fn store_upserts_and_reads_back_the_slot() {
    let store = SaveStore::in_memory().expect("in-memory store");
    assert!(store.read_save(AUTOSAVE_SLOT).unwrap().is_none());

    store.write_save(AUTOSAVE_SLOT, 100, "blob-a").unwrap();
    store.write_save(AUTOSAVE_SLOT, 200, "blob-b").unwrap();
    let (saved_at, blob) = store.read_save(AUTOSAVE_SLOT).unwrap().expect("row present");
    assert_eq!(saved_at, 200, "second write must overwrite the slot");
    assert_eq!(blob, "blob-b");

    store.delete_save(AUTOSAVE_SLOT).unwrap();
    assert!(store.read_save(AUTOSAVE_SLOT).unwrap().is_none());
}

#[test]
fn engine_resumes_a_legacy_blob_from_the_store() {
    let store = SaveStore::in_memory().unwrap();
    let legacy = r#"{
        "save_version": 2,
        "currency": "5e2",
        "lifetime_currency": "5e2",
        "total_harvested": "5e2",
        "clicks": 10,
        "ownership": { "sprout_patch": 2 },
        "upgrades_owned": ["firm_grip"],
        "achievements_unlocked": ["first_sprout"]
    }"#;
    store.write_save(AUTOSAVE_SLOT, 0, legacy).unwrap();

    let engine = GameEngine::load(1, 1_000_000, store).expect("load");
    let state = engine.state();
    assert_eq!(state.currency, Decimal::new(5.0, 2));
    assert_eq!(state.owned_count("sprout_patch"), 2);
    assert!(state.has_upgrade("firm_grip"));
    assert!(state.achievements_unlocked.contains("first_sprout"));
}

#[test]
fn engine_starts_fresh_on_an_unreadable_blob() {
    let store = SaveStore::in_memory().unwrap();
    store.write_save(AUTOSAVE_SLOT, 0, "corrupted garbage").unwrap();
    let engine = GameEngine::load(1, 5_000, store).expect("load must not fail");
    assert_eq!(engine.state().currency, Decimal::ZERO);
    assert_eq!(engine.state().clicks, 0);
}
