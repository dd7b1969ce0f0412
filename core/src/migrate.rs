//! Save-schema migration — one tagged variant per generation, one pure
//! transform per step.
//!
//! RULES:
//!   - Migration always walks every intermediate generation in order;
//!     it never jumps straight to the latest.
//!   - Each step fills newly introduced fields with documented defaults,
//!     renames legacy identifiers, and clamps out-of-range numerics.
//!   - A blob with a missing, non-numeric, or unrecognized version tag
//!     is unreadable; callers fall back to a fresh default state.
//!   - Unknown content ids survive the chain untouched; dropping them
//!     against the registry happens at state reconstruction.

use crate::decimal::Decimal;
use crate::registry;
use crate::save::{
    SaveAbility, SaveAutomation, SaveKickstart, SaveMeta, SavePrefs, SavePrestige, SaveSeedGain,
    SaveV7, CURRENT_SAVE_VERSION,
};
use crate::types::{Millis, SaveVersion};
use log::warn;
use serde::Deserialize;
use std::collections::BTreeMap;

fn zero_decimal() -> String {
    "0".to_string()
}

fn one_f64() -> f64 {
    1.0
}

// ── Older generations ──────────────────────────────────────────────

/// Generation 1: bare currency totals and building counts.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveV1 {
    pub save_version: SaveVersion,
    #[serde(default = "zero_decimal")]
    pub currency: String,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default = "zero_decimal")]
    pub total_harvested: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
}

/// Generation 2: + upgrade and achievement flags.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveV2 {
    pub save_version: SaveVersion,
    #[serde(default = "zero_decimal")]
    pub currency: String,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default = "zero_decimal")]
    pub total_harvested: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades_owned: Vec<String>,
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
}

/// Generation 3: + research, ability timers, last-seen timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveV3 {
    pub save_version: SaveVersion,
    #[serde(default = "zero_decimal")]
    pub currency: String,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default = "zero_decimal")]
    pub total_harvested: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades_owned: Vec<String>,
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    #[serde(default)]
    pub research_owned: Vec<String>,
    #[serde(default)]
    pub abilities: BTreeMap<String, SaveAbility>,
    #[serde(default)]
    pub last_seen_at: Millis,
}

/// Prestige block as persisted by generations 4 and 5.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPrestige {
    #[serde(default)]
    pub seeds_banked: u64,
    #[serde(default = "one_f64")]
    pub multiplier: f64,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default)]
    pub last_reset_at: Millis,
}

impl Default for LegacyPrestige {
    fn default() -> Self {
        Self {
            seeds_banked: 0,
            multiplier: 1.0,
            lifetime_currency: zero_decimal(),
            last_reset_at: 0,
        }
    }
}

/// Generation 4: + prestige block; the `surge` ability key becomes
/// `overdrive` at this step.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveV4 {
    pub save_version: SaveVersion,
    #[serde(default = "zero_decimal")]
    pub currency: String,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default = "zero_decimal")]
    pub total_harvested: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades_owned: Vec<String>,
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    #[serde(default)]
    pub research_owned: Vec<String>,
    #[serde(default)]
    pub abilities: BTreeMap<String, SaveAbility>,
    #[serde(default)]
    pub last_seen_at: Millis,
    #[serde(default)]
    pub prestige: LegacyPrestige,
}

/// Generation 5: + automation config (clamped on the way out).
#[derive(Debug, Clone, Deserialize)]
pub struct SaveV5 {
    pub save_version: SaveVersion,
    #[serde(default = "zero_decimal")]
    pub currency: String,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default = "zero_decimal")]
    pub total_harvested: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades_owned: Vec<String>,
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    #[serde(default)]
    pub research_owned: Vec<String>,
    #[serde(default)]
    pub abilities: BTreeMap<String, SaveAbility>,
    #[serde(default)]
    pub last_seen_at: Millis,
    #[serde(default)]
    pub prestige: LegacyPrestige,
    #[serde(default)]
    pub automation: SaveAutomation,
}

/// Prestige block as persisted by generation 6.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LegacyPrestigeV6 {
    #[serde(default)]
    pub seeds_banked: u64,
    #[serde(default = "one_f64")]
    pub multiplier: f64,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default)]
    pub last_reset_at: Millis,
    #[serde(default)]
    pub milestones_unlocked: Vec<String>,
    #[serde(default)]
    pub kickstart: Option<SaveKickstart>,
}

/// Generation 6: + milestones/kickstart, seed-gain history, synergy
/// claims, interaction anchor.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveV6 {
    pub save_version: SaveVersion,
    #[serde(default = "zero_decimal")]
    pub currency: String,
    #[serde(default = "zero_decimal")]
    pub lifetime_currency: String,
    #[serde(default = "zero_decimal")]
    pub total_harvested: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub ownership: BTreeMap<String, u32>,
    #[serde(default)]
    pub upgrades_owned: Vec<String>,
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    #[serde(default)]
    pub research_owned: Vec<String>,
    #[serde(default)]
    pub abilities: BTreeMap<String, SaveAbility>,
    #[serde(default)]
    pub last_seen_at: Millis,
    #[serde(default)]
    pub prestige: LegacyPrestigeV6,
    #[serde(default)]
    pub automation: SaveAutomation,
    #[serde(default)]
    pub seed_gain_history: Vec<SaveSeedGain>,
    #[serde(default)]
    pub synergy_claims: Vec<String>,
    #[serde(default)]
    pub last_interaction_at: Millis,
}

// ── The tagged sum and the chain ───────────────────────────────────

#[derive(Debug, Clone)]
pub enum AnySave {
    V1(SaveV1),
    V2(SaveV2),
    V3(SaveV3),
    V4(SaveV4),
    V5(SaveV5),
    V6(SaveV6),
    V7(SaveV7),
}

/// Read the version tag and decode the matching generation. `None` for
/// malformed JSON, a missing or non-numeric tag, an unrecognized
/// generation, or a blob that fails its generation's decode.
pub fn parse_versioned(json: &str) -> Option<AnySave> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let version = value.get("save_version")?.as_u64()?;
    match version {
        1 => serde_json::from_value(value).ok().map(AnySave::V1),
        2 => serde_json::from_value(value).ok().map(AnySave::V2),
        3 => serde_json::from_value(value).ok().map(AnySave::V3),
        4 => serde_json::from_value(value).ok().map(AnySave::V4),
        5 => serde_json::from_value(value).ok().map(AnySave::V5),
        6 => serde_json::from_value(value).ok().map(AnySave::V6),
        7 => serde_json::from_value(value).ok().map(AnySave::V7),
        other => {
            warn!("unrecognized save generation {other}, discarding blob");
            None
        }
    }
}

/// Walk the chain one generation at a time until current.
pub fn migrate_to_current(mut save: AnySave) -> SaveV7 {
    loop {
        save = match save {
            AnySave::V1(s) => AnySave::V2(v1_to_v2(s)),
            AnySave::V2(s) => AnySave::V3(v2_to_v3(s)),
            AnySave::V3(s) => AnySave::V4(v3_to_v4(s)),
            AnySave::V4(s) => AnySave::V5(v4_to_v5(s)),
            AnySave::V5(s) => AnySave::V6(v5_to_v6(s)),
            AnySave::V6(s) => AnySave::V7(v6_to_v7(s)),
            AnySave::V7(s) => return s,
        };
    }
}

fn v1_to_v2(s: SaveV1) -> SaveV2 {
    SaveV2 {
        save_version: 2,
        currency: s.currency,
        lifetime_currency: s.lifetime_currency,
        total_harvested: s.total_harvested,
        clicks: s.clicks,
        ownership: s.ownership,
        upgrades_owned: Vec::new(),
        achievements_unlocked: Vec::new(),
    }
}

fn v2_to_v3(s: SaveV2) -> SaveV3 {
    SaveV3 {
        save_version: 3,
        currency: s.currency,
        lifetime_currency: s.lifetime_currency,
        total_harvested: s.total_harvested,
        clicks: s.clicks,
        ownership: s.ownership,
        upgrades_owned: s.upgrades_owned,
        achievements_unlocked: s.achievements_unlocked,
        research_owned: Vec::new(),
        abilities: BTreeMap::new(),
        last_seen_at: 0,
    }
}

fn v3_to_v4(s: SaveV3) -> SaveV4 {
    // The generation-3 ability key "surge" lives on as "overdrive".
    let abilities = s
        .abilities
        .into_iter()
        .map(|(key, slot)| {
            if key == "surge" {
                ("overdrive".to_string(), slot)
            } else {
                (key, slot)
            }
        })
        .collect();
    SaveV4 {
        save_version: 4,
        currency: s.currency,
        lifetime_currency: s.lifetime_currency,
        total_harvested: s.total_harvested,
        clicks: s.clicks,
        ownership: s.ownership,
        upgrades_owned: s.upgrades_owned,
        achievements_unlocked: s.achievements_unlocked,
        research_owned: s.research_owned,
        abilities,
        last_seen_at: s.last_seen_at,
        prestige: LegacyPrestige::default(),
    }
}

fn v4_to_v5(s: SaveV4) -> SaveV5 {
    SaveV5 {
        save_version: 5,
        currency: s.currency,
        lifetime_currency: s.lifetime_currency,
        total_harvested: s.total_harvested,
        clicks: s.clicks,
        ownership: s.ownership,
        upgrades_owned: s.upgrades_owned,
        achievements_unlocked: s.achievements_unlocked,
        research_owned: s.research_owned,
        abilities: s.abilities,
        last_seen_at: s.last_seen_at,
        prestige: s.prestige,
        automation: SaveAutomation::default(),
    }
}

fn v5_to_v6(s: SaveV5) -> SaveV6 {
    SaveV6 {
        save_version: 6,
        currency: s.currency,
        lifetime_currency: s.lifetime_currency,
        total_harvested: s.total_harvested,
        clicks: s.clicks,
        ownership: s.ownership,
        upgrades_owned: s.upgrades_owned,
        achievements_unlocked: s.achievements_unlocked,
        research_owned: s.research_owned,
        abilities: s.abilities,
        last_seen_at: s.last_seen_at,
        prestige: LegacyPrestigeV6 {
            seeds_banked: s.prestige.seeds_banked,
            multiplier: s.prestige.multiplier,
            lifetime_currency: s.prestige.lifetime_currency,
            last_reset_at: s.prestige.last_reset_at,
            milestones_unlocked: Vec::new(),
            kickstart: None,
        },
        automation: clamp_automation(s.automation),
        seed_gain_history: Vec::new(),
        synergy_claims: Vec::new(),
        last_interaction_at: s.last_seen_at,
    }
}

fn v6_to_v7(s: SaveV6) -> SaveV7 {
    SaveV7 {
        save_version: CURRENT_SAVE_VERSION,
        currency: lenient_decimal(&s.currency),
        lifetime_currency: lenient_decimal(&s.lifetime_currency),
        total_harvested: lenient_decimal(&s.total_harvested),
        clicks: s.clicks,
        ownership: s.ownership,
        upgrades_owned: s.upgrades_owned,
        research_owned: s.research_owned,
        achievements_unlocked: s.achievements_unlocked,
        prestige: SavePrestige {
            seeds_banked: s.prestige.seeds_banked,
            multiplier: if s.prestige.multiplier.is_finite() {
                s.prestige.multiplier.max(1.0)
            } else {
                1.0
            },
            lifetime_currency: lenient_decimal(&s.prestige.lifetime_currency),
            last_reset_at: s.prestige.last_reset_at,
            milestones_unlocked: s.prestige.milestones_unlocked,
            kickstart: s.prestige.kickstart,
        },
        abilities: s.abilities,
        automation: clamp_automation(s.automation),
        meta: SaveMeta {
            last_seen_at: s.last_seen_at,
            last_production_rate_at_save: Decimal::ZERO,
            seed_gain_history: s.seed_gain_history,
            synergy_claims: s.synergy_claims,
            last_interaction_at: s.last_interaction_at,
            idle_rolls_processed: 0,
        },
        frenzy: None,
        prefs: SavePrefs::default(),
    }
}

/// Parse a legacy decimal string, sanitizing anything unreadable to zero.
fn lenient_decimal(s: &str) -> Decimal {
    match s.parse() {
        Ok(d) => d,
        Err(_) => {
            warn!("sanitizing unreadable decimal '{s}' to zero");
            Decimal::ZERO
        }
    }
}

fn clamp_automation(mut automation: SaveAutomation) -> SaveAutomation {
    automation.roi_threshold_seconds = if automation.roi_threshold_seconds.is_finite() {
        automation
            .roi_threshold_seconds
            .clamp(registry::ROI_THRESHOLD_MIN, registry::ROI_THRESHOLD_MAX)
    } else {
        registry::ROI_THRESHOLD_DEFAULT
    };
    automation.reserve_percent = if automation.reserve_percent.is_finite() {
        automation.reserve_percent.clamp(0.0, registry::RESERVE_PERCENT_MAX)
    } else {
        0.0
    };
    automation
}
