//! The root game state aggregate.
//!
//! RULE: One mutable `GameState` per engine, mutated only through the
//! engine's named command entry points. Anything under `derived` is a
//! cache fully overwritten by the stats pass — never persisted, never
//! patched incrementally.

use crate::decimal::Decimal;
use crate::registry;
use crate::types::{Id, Millis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Clone)]
pub struct GameState {
    pub currency: Decimal,
    /// Total earned this prestige epoch. Never decreased except by reset.
    pub lifetime_currency: Decimal,
    pub total_harvested: Decimal,
    pub clicks: u64,
    pub ownership: BTreeMap<Id, u32>,
    pub upgrades_owned: BTreeSet<Id>,
    /// Insertion order is unlock order.
    pub research_owned: Vec<Id>,
    /// Persist across prestige resets.
    pub achievements_unlocked: BTreeSet<Id>,
    pub prestige: PrestigeState,
    pub abilities: BTreeMap<Id, AbilityState>,
    pub automation: AutomationConfig,
    pub meta: MetaState,
    pub frenzy: Option<FrenzyBuff>,
    pub prefs: Preferences,
    /// Cache: recomputed by every stats pass.
    pub derived: Derived,
}

#[derive(Debug, Clone)]
pub struct PrestigeState {
    pub seeds_banked: u64,
    /// `1 + 0.05 × seeds_banked`, fixed at reset time.
    pub multiplier: f64,
    /// Accumulates across every epoch; feeds seed gain on reset.
    pub lifetime_currency: Decimal,
    pub last_reset_at: Millis,
    /// Latched within an epoch; cleared by a prestige reset.
    pub milestones_unlocked: BTreeSet<Id>,
    pub kickstart: Option<Kickstart>,
}

impl PrestigeState {
    pub fn fresh(now: Millis) -> Self {
        Self {
            seeds_banked: 0,
            multiplier: 1.0,
            lifetime_currency: Decimal::ZERO,
            last_reset_at: now,
            milestones_unlocked: BTreeSet::new(),
            kickstart: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kickstart {
    pub level: u8,
    pub expires_at: Millis,
}

/// Ability timing. Phase is derived from the two timestamps; cooldown
/// always starts at or after `active_until`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbilityState {
    pub active_until: Millis,
    pub ready_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationConfig {
    pub auto_buy_enabled: bool,
    pub roi: RoiConfig,
    pub reserve: ReserveConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiConfig {
    pub enabled: bool,
    pub threshold_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveConfig {
    pub enabled: bool,
    /// Fraction of current currency withheld, in [0, 30].
    pub percent: f64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            auto_buy_enabled: false,
            roi: RoiConfig { enabled: true, threshold_seconds: registry::ROI_THRESHOLD_DEFAULT },
            reserve: ReserveConfig { enabled: false, percent: 10.0 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetaState {
    pub last_seen_at: Millis,
    /// Production rate snapshotted at the last save; offline catch-up
    /// uses this, never a freshly recalculated rate.
    pub last_production_rate_at_save: Decimal,
    /// Trailing seed awards, newest at the back. Bounded.
    pub seed_gain_history: VecDeque<SeedGain>,
    /// One-time synergy claims, never revoked within an epoch.
    pub synergy_claims: BTreeSet<Id>,
    pub last_interaction_at: Millis,
    /// Idle intervals already consumed since `last_interaction_at`.
    pub idle_rolls_processed: u64,
}

impl MetaState {
    pub fn fresh(now: Millis) -> Self {
        Self {
            last_seen_at: now,
            last_production_rate_at_save: Decimal::ZERO,
            seed_gain_history: VecDeque::new(),
            synergy_claims: BTreeSet::new(),
            last_interaction_at: now,
            idle_rolls_processed: 0,
        }
    }

    pub fn push_seed_gain(&mut self, gain: SeedGain) {
        self.seed_gain_history.push_back(gain);
        while self.seed_gain_history.len() > registry::SEED_HISTORY_CAP {
            self.seed_gain_history.pop_front();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedGain {
    pub time: Millis,
    pub amount: u64,
    pub source: SeedSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    Click,
    Idle,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenzyBuff {
    pub multiplier: f64,
    pub until: Millis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub locale: String,
    pub audio_volume: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { locale: "en".to_string(), audio_volume: 0.8 }
    }
}

/// Derived per-pass cache. Always fully overwritten, never read across a
/// mutation without recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Derived {
    pub production_rate: Decimal,
    pub click_yield: Decimal,
}

impl GameState {
    pub fn fresh(now: Millis) -> Self {
        Self {
            currency: Decimal::ZERO,
            lifetime_currency: Decimal::ZERO,
            total_harvested: Decimal::ZERO,
            clicks: 0,
            ownership: BTreeMap::new(),
            upgrades_owned: BTreeSet::new(),
            research_owned: Vec::new(),
            achievements_unlocked: BTreeSet::new(),
            prestige: PrestigeState::fresh(now),
            abilities: BTreeMap::new(),
            automation: AutomationConfig::default(),
            meta: MetaState::fresh(now),
            frenzy: None,
            prefs: Preferences::default(),
            derived: Derived::default(),
        }
    }

    pub fn owned_count(&self, building: &str) -> u32 {
        self.ownership.get(building).copied().unwrap_or(0)
    }

    pub fn total_buildings_owned(&self) -> u64 {
        self.ownership.values().map(|&count| count as u64).sum()
    }

    pub fn has_upgrade(&self, id: &str) -> bool {
        self.upgrades_owned.contains(id)
    }

    pub fn has_research(&self, id: &str) -> bool {
        self.research_owned.iter().any(|r| *r == id)
    }

    /// Credit earned currency: cash, epoch lifetime, harvest total, and
    /// the cross-epoch prestige lifetime all move together.
    pub fn earn(&mut self, amount: &Decimal) {
        if amount.is_zero() {
            return;
        }
        self.currency = self.currency.add(amount);
        self.lifetime_currency = self.lifetime_currency.add(amount);
        self.total_harvested = self.total_harvested.add(amount);
        self.prestige.lifetime_currency = self.prestige.lifetime_currency.add(amount);
    }
}
