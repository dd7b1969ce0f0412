//! Save blob — current-generation serde structs, encode/decode, and the
//! export text wrapping.
//!
//! The save format is self-contained: dedicated serde structs decoupled
//! from the live `GameState` (ids as owned strings, currency as
//! round-trippable decimal strings). Older generations and the
//! migration chain live in `migrate.rs`.

use crate::decimal::Decimal;
use crate::error::{GameError, GameResult};
use crate::migrate;
use crate::offline;
use crate::registry;
use crate::state::{
    AbilityState, AutomationConfig, FrenzyBuff, GameState, Kickstart, MetaState, PrestigeState,
    Preferences, ReserveConfig, RoiConfig, SeedGain, SeedSource,
};
use crate::types::{Millis, SaveVersion};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub const CURRENT_SAVE_VERSION: SaveVersion = 7;

// ── Current-generation blob ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveV7 {
    pub save_version: SaveVersion,
    pub currency: Decimal,
    pub lifetime_currency: Decimal,
    pub total_harvested: Decimal,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades_owned: Vec<String>,
    #[serde(default)]
    pub research_owned: Vec<String>,
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    pub prestige: SavePrestige,
    #[serde(default)]
    pub abilities: BTreeMap<String, SaveAbility>,
    pub automation: SaveAutomation,
    pub meta: SaveMeta,
    #[serde(default)]
    pub frenzy: Option<SaveFrenzy>,
    #[serde(default)]
    pub prefs: SavePrefs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePrestige {
    pub seeds_banked: u64,
    pub multiplier: f64,
    pub lifetime_currency: Decimal,
    pub last_reset_at: Millis,
    #[serde(default)]
    pub milestones_unlocked: Vec<String>,
    #[serde(default)]
    pub kickstart: Option<SaveKickstart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveKickstart {
    pub level: u8,
    pub expires_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SaveAbility {
    pub active_until: Millis,
    pub ready_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveAutomation {
    pub auto_buy_enabled: bool,
    pub roi_enabled: bool,
    pub roi_threshold_seconds: f64,
    pub reserve_enabled: bool,
    pub reserve_percent: f64,
}

impl Default for SaveAutomation {
    fn default() -> Self {
        let defaults = AutomationConfig::default();
        Self {
            auto_buy_enabled: defaults.auto_buy_enabled,
            roi_enabled: defaults.roi.enabled,
            roi_threshold_seconds: defaults.roi.threshold_seconds,
            reserve_enabled: defaults.reserve.enabled,
            reserve_percent: defaults.reserve.percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMeta {
    pub last_seen_at: Millis,
    #[serde(default)]
    pub last_production_rate_at_save: Decimal,
    #[serde(default)]
    pub seed_gain_history: Vec<SaveSeedGain>,
    #[serde(default)]
    pub synergy_claims: Vec<String>,
    #[serde(default)]
    pub last_interaction_at: Millis,
    #[serde(default)]
    pub idle_rolls_processed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSeedGain {
    pub time: Millis,
    pub amount: u64,
    pub source: SeedSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveFrenzy {
    pub multiplier: f64,
    pub until: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePrefs {
    pub locale: String,
    pub audio_volume: f64,
}

impl Default for SavePrefs {
    fn default() -> Self {
        let defaults = Preferences::default();
        Self { locale: defaults.locale, audio_volume: defaults.audio_volume }
    }
}

// ── GameState ⇄ SaveV7 ─────────────────────────────────────────────

pub fn to_save(state: &GameState) -> SaveV7 {
    SaveV7 {
        save_version: CURRENT_SAVE_VERSION,
        currency: state.currency,
        lifetime_currency: state.lifetime_currency,
        total_harvested: state.total_harvested,
        clicks: state.clicks,
        ownership: state
            .ownership
            .iter()
            .map(|(id, count)| (id.to_string(), *count))
            .collect(),
        upgrades_owned: state.upgrades_owned.iter().map(|id| id.to_string()).collect(),
        research_owned: state.research_owned.iter().map(|id| id.to_string()).collect(),
        achievements_unlocked: state
            .achievements_unlocked
            .iter()
            .map(|id| id.to_string())
            .collect(),
        prestige: SavePrestige {
            seeds_banked: state.prestige.seeds_banked,
            multiplier: state.prestige.multiplier,
            lifetime_currency: state.prestige.lifetime_currency,
            last_reset_at: state.prestige.last_reset_at,
            milestones_unlocked: state
                .prestige
                .milestones_unlocked
                .iter()
                .map(|id| id.to_string())
                .collect(),
            kickstart: state.prestige.kickstart.map(|k| SaveKickstart {
                level: k.level,
                expires_at: k.expires_at,
            }),
        },
        abilities: state
            .abilities
            .iter()
            .map(|(id, slot)| {
                (
                    id.to_string(),
                    SaveAbility { active_until: slot.active_until, ready_at: slot.ready_at },
                )
            })
            .collect(),
        automation: SaveAutomation {
            auto_buy_enabled: state.automation.auto_buy_enabled,
            roi_enabled: state.automation.roi.enabled,
            roi_threshold_seconds: state.automation.roi.threshold_seconds,
            reserve_enabled: state.automation.reserve.enabled,
            reserve_percent: state.automation.reserve.percent,
        },
        meta: SaveMeta {
            last_seen_at: state.meta.last_seen_at,
            last_production_rate_at_save: state.meta.last_production_rate_at_save,
            seed_gain_history: state
                .meta
                .seed_gain_history
                .iter()
                .map(|g| SaveSeedGain { time: g.time, amount: g.amount, source: g.source })
                .collect(),
            synergy_claims: state.meta.synergy_claims.iter().map(|id| id.to_string()).collect(),
            last_interaction_at: state.meta.last_interaction_at,
            idle_rolls_processed: state.meta.idle_rolls_processed,
        },
        frenzy: state
            .frenzy
            .map(|f| SaveFrenzy { multiplier: f.multiplier, until: f.until }),
        prefs: SavePrefs {
            locale: state.prefs.locale.clone(),
            audio_volume: state.prefs.audio_volume,
        },
    }
}

/// Rebuild live state from a current-generation blob. Stale content ids
/// are dropped with a warning; out-of-range numerics are clamped. The
/// caller is expected to run offline catch-up and a stats pass after.
pub fn from_save(save: SaveV7, now: Millis) -> GameState {
    let mut state = GameState::fresh(now);
    state.currency = save.currency;
    state.lifetime_currency = save.lifetime_currency;
    state.total_harvested = save.total_harvested;
    state.clicks = save.clicks;

    for (id, count) in &save.ownership {
        match registry::find_building(id) {
            Some(def) => {
                state.ownership.insert(def.id, *count);
            }
            None => warn!("dropping unknown building id '{id}' from save"),
        }
    }
    for id in &save.upgrades_owned {
        match registry::find_upgrade(id) {
            Some(def) => {
                state.upgrades_owned.insert(def.id);
            }
            None => warn!("dropping unknown upgrade id '{id}' from save"),
        }
    }
    for id in &save.research_owned {
        match registry::find_research(id) {
            Some(def) => {
                if !state.has_research(def.id) {
                    state.research_owned.push(def.id);
                }
            }
            None => warn!("dropping unknown research id '{id}' from save"),
        }
    }
    for id in &save.achievements_unlocked {
        match registry::find_achievement(id) {
            Some(def) => {
                state.achievements_unlocked.insert(def.id);
            }
            None => warn!("dropping unknown achievement id '{id}' from save"),
        }
    }

    state.prestige = PrestigeState {
        seeds_banked: save.prestige.seeds_banked,
        multiplier: sane_f64(save.prestige.multiplier, 1.0).max(1.0),
        lifetime_currency: save.prestige.lifetime_currency,
        last_reset_at: save.prestige.last_reset_at,
        milestones_unlocked: save
            .prestige
            .milestones_unlocked
            .iter()
            .filter_map(|id| match registry::find_milestone(id) {
                Some(def) => Some(def.id),
                None => {
                    warn!("dropping unknown milestone id '{id}' from save");
                    None
                }
            })
            .collect(),
        kickstart: save
            .prestige
            .kickstart
            .map(|k| Kickstart { level: k.level.min(3), expires_at: k.expires_at }),
    };

    for (key, slot) in &save.abilities {
        match registry::canonical_ability_id(key) {
            Some(id) => {
                state.abilities.insert(
                    id,
                    AbilityState { active_until: slot.active_until, ready_at: slot.ready_at },
                );
            }
            None => warn!("dropping unknown ability key '{key}' from save"),
        }
    }

    state.automation = AutomationConfig {
        auto_buy_enabled: save.automation.auto_buy_enabled,
        roi: RoiConfig {
            enabled: save.automation.roi_enabled,
            threshold_seconds: sane_f64(
                save.automation.roi_threshold_seconds,
                registry::ROI_THRESHOLD_DEFAULT,
            )
            .clamp(registry::ROI_THRESHOLD_MIN, registry::ROI_THRESHOLD_MAX),
        },
        reserve: ReserveConfig {
            enabled: save.automation.reserve_enabled,
            percent: sane_f64(save.automation.reserve_percent, 0.0)
                .clamp(0.0, registry::RESERVE_PERCENT_MAX),
        },
    };

    let mut meta = MetaState::fresh(now);
    meta.last_seen_at = save.meta.last_seen_at;
    meta.last_production_rate_at_save = save.meta.last_production_rate_at_save;
    meta.seed_gain_history = save
        .meta
        .seed_gain_history
        .iter()
        .map(|g| SeedGain { time: g.time, amount: g.amount, source: g.source })
        .collect::<VecDeque<_>>();
    while meta.seed_gain_history.len() > registry::SEED_HISTORY_CAP {
        meta.seed_gain_history.pop_front();
    }
    meta.synergy_claims = save
        .meta
        .synergy_claims
        .iter()
        .filter_map(|id| match registry::find_synergy(id) {
            Some(def) => Some(def.id),
            None => {
                warn!("dropping unknown synergy id '{id}' from save");
                None
            }
        })
        .collect();
    meta.last_interaction_at = save.meta.last_interaction_at;
    meta.idle_rolls_processed = save.meta.idle_rolls_processed;
    // Legacy blobs carry a zero idle anchor; replaying every interval
    // since then would be an unbounded backlog. Rein the anchor in to
    // the offline horizon and restart the interval count from there.
    let idle_horizon = now - offline::offline_cap(&state);
    if meta.last_interaction_at < idle_horizon {
        meta.last_interaction_at = idle_horizon;
        meta.idle_rolls_processed = 0;
    }
    state.meta = meta;

    state.frenzy = save.frenzy.and_then(|f| {
        if f.multiplier.is_finite() && f.multiplier > 1.0 {
            Some(FrenzyBuff { multiplier: f.multiplier, until: f.until })
        } else {
            None
        }
    });

    state.prefs = Preferences {
        locale: save.prefs.locale,
        audio_volume: sane_f64(save.prefs.audio_volume, 0.8).clamp(0.0, 1.0),
    };

    state
}

fn sane_f64(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

// ── Encode / decode / export ───────────────────────────────────────

/// Current-generation state to JSON.
pub fn encode(save: &SaveV7) -> GameResult<String> {
    Ok(serde_json::to_string(save)?)
}

/// Strict current-generation decode, no migration. Round-trip law:
/// `decode(encode(s)) == s` for any valid current-generation `s`.
pub fn decode(json: &str) -> GameResult<SaveV7> {
    Ok(serde_json::from_str(json)?)
}

/// Lenient load path: any known generation, migrated to current.
/// `None` means unreadable (missing/bad version tag, malformed JSON) —
/// the caller falls back to a fresh default state.
pub fn load_any_generation(json: &str) -> Option<SaveV7> {
    let parsed = migrate::parse_versioned(json)?;
    Some(migrate::migrate_to_current(parsed))
}

/// Reversible text wrapping for export: base64 over the JSON blob.
pub fn export(save: &SaveV7) -> GameResult<String> {
    Ok(BASE64.encode(encode(save)?))
}

/// Decode an exported string. Malformed input is a recoverable
/// invalid-save error, never a crash.
pub fn import(text: &str) -> GameResult<SaveV7> {
    let bytes = BASE64
        .decode(text.trim())
        .map_err(|e| GameError::InvalidSave(format!("bad text encoding: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|_| GameError::InvalidSave("blob is not valid utf-8".into()))?;
    load_any_generation(&json)
        .ok_or_else(|| GameError::InvalidSave("unrecognized or unversioned blob".into()))
}
