//! Compiled-in content registry: buildings, upgrades, research,
//! achievements, milestones, abilities, synergies, and tuning constants.
//!
//! RULE: The registry is the single source of truth for content ids.
//! Persisted data referencing an id that is not here is stale and gets
//! dropped during state reconstruction. Core code referencing an id that
//! is not here is a programmer error.

use crate::types::{Id, Millis, MS_PER_HOUR, MS_PER_MIN, MS_PER_SEC};
use crate::decimal::Decimal;

// ── Buildings ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct BuildingDef {
    pub id: Id,
    pub label: &'static str,
    pub base_cost: f64,
    pub cost_factor: f64,
    /// Currency per second per owned unit, before multipliers.
    pub base_rate: f64,
    /// Ownership count past which the softcap penalty applies.
    pub softcap_threshold: u32,
}

pub static BUILDINGS: &[BuildingDef] = &[
    BuildingDef { id: "sprout_patch",  label: "Sprout Patch",  base_cost: 25.0,    cost_factor: 1.18, base_rate: 0.5,       softcap_threshold: 100 },
    BuildingDef { id: "herb_garden",   label: "Herb Garden",   base_cost: 150.0,   cost_factor: 1.16, base_rate: 3.0,       softcap_threshold: 100 },
    BuildingDef { id: "beehive",       label: "Beehive",       base_cost: 1.1e3,   cost_factor: 1.15, base_rate: 14.0,      softcap_threshold: 100 },
    BuildingDef { id: "mushroom_log",  label: "Mushroom Log",  base_cost: 1.2e4,   cost_factor: 1.14, base_rate: 60.0,      softcap_threshold: 100 },
    BuildingDef { id: "orchard",       label: "Orchard",       base_cost: 1.3e5,   cost_factor: 1.13, base_rate: 290.0,     softcap_threshold: 100 },
    BuildingDef { id: "greenhouse",    label: "Greenhouse",    base_cost: 1.4e6,   cost_factor: 1.12, base_rate: 1.5e3,     softcap_threshold: 150 },
    BuildingDef { id: "terrace_farm",  label: "Terrace Farm",  base_cost: 2.0e7,   cost_factor: 1.12, base_rate: 9.0e3,     softcap_threshold: 150 },
    BuildingDef { id: "arboretum",     label: "Arboretum",     base_cost: 3.3e8,   cost_factor: 1.11, base_rate: 5.5e4,     softcap_threshold: 150 },
    BuildingDef { id: "spirit_grove",  label: "Spirit Grove",  base_cost: 5.1e9,   cost_factor: 1.10, base_rate: 3.4e5,     softcap_threshold: 200 },
    BuildingDef { id: "world_tree",    label: "World Tree",    base_cost: 7.5e10,  cost_factor: 1.10, base_rate: 2.2e6,     softcap_threshold: 200 },
];

pub fn find_building(id: &str) -> Option<&'static BuildingDef> {
    BUILDINGS.iter().find(|b| b.id == id)
}

pub fn building_index(id: &str) -> Option<usize> {
    BUILDINGS.iter().position(|b| b.id == id)
}

// ── Upgrades ───────────────────────────────────────────────────────

#[derive(Debug)]
pub enum UpgradeKind {
    /// Multiplies one building's per-unit rate.
    BuildingTier { building: Id, multiplier: f64 },
    /// Multiplies click yield.
    Click { multiplier: f64 },
    /// Contributes to the external cost multiplier (product, floored).
    CostReduction { factor: f64 },
}

#[derive(Debug)]
pub enum Requirement {
    None,
    Owned { building: Id, count: u32 },
}

#[derive(Debug)]
pub struct UpgradeDef {
    pub id: Id,
    pub label: &'static str,
    pub cost: f64,
    pub kind: UpgradeKind,
    pub requires: Requirement,
}

pub static UPGRADES: &[UpgradeDef] = &[
    UpgradeDef { id: "sturdy_trowel",      label: "Sturdy Trowel",      cost: 5.0e2,  kind: UpgradeKind::BuildingTier { building: "sprout_patch", multiplier: 2.0 }, requires: Requirement::Owned { building: "sprout_patch", count: 10 } },
    UpgradeDef { id: "drip_irrigation",    label: "Drip Irrigation",    cost: 5.5e3,  kind: UpgradeKind::BuildingTier { building: "sprout_patch", multiplier: 2.0 }, requires: Requirement::Owned { building: "sprout_patch", count: 25 } },
    UpgradeDef { id: "herbal_almanac",     label: "Herbal Almanac",     cost: 6.0e3,  kind: UpgradeKind::BuildingTier { building: "herb_garden", multiplier: 2.0 },  requires: Requirement::Owned { building: "herb_garden", count: 10 } },
    UpgradeDef { id: "smoker_bellows",     label: "Smoker Bellows",     cost: 4.4e4,  kind: UpgradeKind::BuildingTier { building: "beehive", multiplier: 2.0 },      requires: Requirement::Owned { building: "beehive", count: 10 } },
    UpgradeDef { id: "spore_press",        label: "Spore Press",        cost: 4.8e5,  kind: UpgradeKind::BuildingTier { building: "mushroom_log", multiplier: 2.0 }, requires: Requirement::Owned { building: "mushroom_log", count: 10 } },
    UpgradeDef { id: "grafted_stock",      label: "Grafted Stock",      cost: 5.2e6,  kind: UpgradeKind::BuildingTier { building: "orchard", multiplier: 2.0 },      requires: Requirement::Owned { building: "orchard", count: 10 } },
    UpgradeDef { id: "climate_control",    label: "Climate Control",    cost: 5.6e7,  kind: UpgradeKind::BuildingTier { building: "greenhouse", multiplier: 2.0 },   requires: Requirement::Owned { building: "greenhouse", count: 10 } },
    UpgradeDef { id: "canopy_lifts",       label: "Canopy Lifts",       cost: 1.3e10, kind: UpgradeKind::BuildingTier { building: "arboretum", multiplier: 2.0 },    requires: Requirement::Owned { building: "arboretum", count: 10 } },
    UpgradeDef { id: "firm_grip",          label: "Firm Grip",          cost: 1.0e2,  kind: UpgradeKind::Click { multiplier: 2.0 }, requires: Requirement::None },
    UpgradeDef { id: "calloused_thumb",    label: "Calloused Thumb",    cost: 1.0e4,  kind: UpgradeKind::Click { multiplier: 2.0 }, requires: Requirement::None },
    UpgradeDef { id: "golden_thumb",       label: "Golden Thumb",       cost: 1.0e6,  kind: UpgradeKind::Click { multiplier: 3.0 }, requires: Requirement::None },
    UpgradeDef { id: "bulk_seed_contract", label: "Bulk Seed Contract", cost: 7.5e4,  kind: UpgradeKind::CostReduction { factor: 0.97 }, requires: Requirement::None },
    UpgradeDef { id: "cooperative_buying", label: "Cooperative Buying", cost: 9.0e6,  kind: UpgradeKind::CostReduction { factor: 0.95 }, requires: Requirement::None },
];

pub fn find_upgrade(id: &str) -> Option<&'static UpgradeDef> {
    UPGRADES.iter().find(|u| u.id == id)
}

// ── Research ───────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ResearchEffect {
    GlobalMult(f64),
    BuildingMult { building: Id, multiplier: f64 },
    ClickMult(f64),
    /// Contributes to the external cost multiplier.
    CostFactor(f64),
    /// Extends the offline catch-up cap.
    OfflineCapBonus(Millis),
    /// Scales ability duration and cooldown at activation time.
    AbilityTuning { duration_mult: f64, cooldown_mult: f64 },
    /// Raises the seed click-roll chance (subject to the ceiling).
    SeedChanceBonus(f64),
}

#[derive(Debug)]
pub struct ResearchDef {
    pub id: Id,
    pub label: &'static str,
    pub cost: f64,
    pub effect: ResearchEffect,
    pub prerequisite: Option<Id>,
}

pub static RESEARCH: &[ResearchDef] = &[
    ResearchDef { id: "botany_1",       label: "Botany I",           cost: 5.0e4, effect: ResearchEffect::GlobalMult(1.10), prerequisite: None },
    ResearchDef { id: "botany_2",       label: "Botany II",          cost: 5.0e6, effect: ResearchEffect::GlobalMult(1.25), prerequisite: Some("botany_1") },
    ResearchDef { id: "pollination",    label: "Pollination Routes", cost: 2.0e5, effect: ResearchEffect::BuildingMult { building: "beehive", multiplier: 3.0 }, prerequisite: Some("botany_1") },
    ResearchDef { id: "mycology",       label: "Mycology",           cost: 8.0e5, effect: ResearchEffect::BuildingMult { building: "mushroom_log", multiplier: 3.0 }, prerequisite: Some("botany_1") },
    ResearchDef { id: "ergonomics",     label: "Ergonomics",         cost: 3.0e5, effect: ResearchEffect::ClickMult(2.0), prerequisite: None },
    ResearchDef { id: "logistics",      label: "Logistics",          cost: 1.2e6, effect: ResearchEffect::CostFactor(0.95), prerequisite: None },
    ResearchDef { id: "chronobiology",  label: "Chronobiology",      cost: 2.5e6, effect: ResearchEffect::OfflineCapBonus(4 * MS_PER_HOUR), prerequisite: Some("botany_1") },
    ResearchDef { id: "stimulants",     label: "Growth Stimulants",  cost: 6.0e6, effect: ResearchEffect::AbilityTuning { duration_mult: 1.25, cooldown_mult: 0.9 }, prerequisite: Some("botany_2") },
    ResearchDef { id: "seed_selection", label: "Seed Selection",     cost: 4.0e6, effect: ResearchEffect::SeedChanceBonus(0.01), prerequisite: Some("botany_2") },
];

pub fn find_research(id: &str) -> Option<&'static ResearchDef> {
    RESEARCH.iter().find(|r| r.id == id)
}

// ── Achievements ───────────────────────────────────────────────────

#[derive(Debug)]
pub enum AchievementPredicate {
    Owned { building: Id, count: u32 },
    TotalHarvested { amount: f64 },
    Clicks { count: u64 },
}

#[derive(Debug)]
pub struct AchievementDef {
    pub id: Id,
    pub label: &'static str,
    pub predicate: AchievementPredicate,
    /// Global production/click multiplier granted while unlocked.
    pub reward_mult: f64,
}

pub static ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef { id: "first_sprout",    label: "First Sprout",    predicate: AchievementPredicate::Owned { building: "sprout_patch", count: 1 },   reward_mult: 1.01 },
    AchievementDef { id: "green_acre",      label: "Green Acre",      predicate: AchievementPredicate::Owned { building: "sprout_patch", count: 50 },  reward_mult: 1.02 },
    AchievementDef { id: "hive_mind",       label: "Hive Mind",       predicate: AchievementPredicate::Owned { building: "beehive", count: 25 },       reward_mult: 1.02 },
    AchievementDef { id: "deep_roots",      label: "Deep Roots",      predicate: AchievementPredicate::Owned { building: "world_tree", count: 1 },     reward_mult: 1.05 },
    AchievementDef { id: "hundredfold",     label: "Hundredfold",     predicate: AchievementPredicate::TotalHarvested { amount: 1.0e2 },  reward_mult: 1.01 },
    AchievementDef { id: "millionaire",     label: "Millionaire",     predicate: AchievementPredicate::TotalHarvested { amount: 1.0e6 },  reward_mult: 1.02 },
    AchievementDef { id: "billionaire",     label: "Billionaire",     predicate: AchievementPredicate::TotalHarvested { amount: 1.0e9 },  reward_mult: 1.03 },
    AchievementDef { id: "beyond_counting", label: "Beyond Counting", predicate: AchievementPredicate::TotalHarvested { amount: 1.0e15 }, reward_mult: 1.05 },
    AchievementDef { id: "busy_hands",      label: "Busy Hands",      predicate: AchievementPredicate::Clicks { count: 100 },   reward_mult: 1.01 },
    AchievementDef { id: "tireless",        label: "Tireless",        predicate: AchievementPredicate::Clicks { count: 10_000 }, reward_mult: 1.03 },
];

pub fn find_achievement(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

// ── Milestones ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum MilestonePredicate {
    /// Sum of all building counts reaches the threshold.
    TotalOwnership(u32),
    Owned { building: Id, count: u32 },
    SeedsBanked(u64),
}

#[derive(Debug)]
pub struct MilestoneDef {
    pub id: Id,
    pub label: &'static str,
    pub predicate: MilestonePredicate,
    pub bonus_mult: f64,
    /// Kickstart tier this milestone arms for the next prestige, if any.
    pub kickstart_tier: Option<u8>,
}

pub static MILESTONES: &[MilestoneDef] = &[
    MilestoneDef { id: "green_thumb",       label: "Green Thumb",       predicate: MilestonePredicate::TotalOwnership(50),  bonus_mult: 1.05, kickstart_tier: None },
    MilestoneDef { id: "flourishing",       label: "Flourishing",       predicate: MilestonePredicate::TotalOwnership(150), bonus_mult: 1.05, kickstart_tier: None },
    MilestoneDef { id: "verdant_empire",    label: "Verdant Empire",    predicate: MilestonePredicate::TotalOwnership(400), bonus_mult: 1.10, kickstart_tier: Some(1) },
    MilestoneDef { id: "seed_hoarder",      label: "Seed Hoarder",      predicate: MilestonePredicate::SeedsBanked(10),     bonus_mult: 1.05, kickstart_tier: None },
    MilestoneDef { id: "world_tree_keeper", label: "World Tree Keeper", predicate: MilestonePredicate::Owned { building: "world_tree", count: 10 }, bonus_mult: 1.10, kickstart_tier: Some(2) },
    MilestoneDef { id: "gaia_touched",      label: "Gaia Touched",      predicate: MilestonePredicate::SeedsBanked(100),    bonus_mult: 1.15, kickstart_tier: Some(3) },
];

pub fn find_milestone(id: &str) -> Option<&'static MilestoneDef> {
    MILESTONES.iter().find(|m| m.id == id)
}

/// Kickstart tier table: (production multiplier, active window).
pub fn kickstart_tier(level: u8) -> (f64, Millis) {
    match level {
        0 => (1.0, 0),
        1 => (3.0, 10 * MS_PER_MIN),
        2 => (5.0, 15 * MS_PER_MIN),
        _ => (8.0, 20 * MS_PER_MIN),
    }
}

// ── Abilities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum AbilityEffect {
    ProductionMult(f64),
    ClickMult(f64),
}

#[derive(Debug)]
pub struct AbilityDef {
    pub id: Id,
    pub label: &'static str,
    /// Save key this ability was stored under in old schema generations.
    pub legacy_alias: Option<&'static str>,
    pub duration: Millis,
    pub cooldown: Millis,
    pub effect: AbilityEffect,
}

pub static ABILITIES: &[AbilityDef] = &[
    AbilityDef { id: "overdrive",    label: "Overdrive",    legacy_alias: Some("surge"), duration: 30 * MS_PER_SEC,  cooldown: 10 * MS_PER_MIN, effect: AbilityEffect::ProductionMult(7.0) },
    AbilityDef { id: "golden_hands", label: "Golden Hands", legacy_alias: None,          duration: 30 * MS_PER_SEC,  cooldown: 5 * MS_PER_MIN,  effect: AbilityEffect::ClickMult(10.0) },
    AbilityDef { id: "bloom",        label: "Bloom",        legacy_alias: None,          duration: 120 * MS_PER_SEC, cooldown: 15 * MS_PER_MIN, effect: AbilityEffect::ProductionMult(3.0) },
];

pub fn find_ability(id: &str) -> Option<&'static AbilityDef> {
    ABILITIES.iter().find(|a| a.id == id)
}

/// Resolve a persisted ability key, following legacy aliases.
pub fn canonical_ability_id(key: &str) -> Option<Id> {
    ABILITIES
        .iter()
        .find(|a| a.id == key || a.legacy_alias == Some(key))
        .map(|a| a.id)
}

// ── Synergies ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SynergyDef {
    pub id: Id,
    pub label: &'static str,
    pub requires_buildings: &'static [(Id, u32)],
    pub requires_research: &'static [Id],
    pub requires_upgrades: &'static [Id],
    /// Reward is this many seconds of current production, floored at `min_reward`.
    pub reward_seconds: f64,
    pub min_reward: f64,
}

pub static SYNERGIES: &[SynergyDef] = &[
    SynergyDef {
        id: "bees_and_blossoms",
        label: "Bees and Blossoms",
        requires_buildings: &[("beehive", 25), ("orchard", 10)],
        requires_research: &[],
        requires_upgrades: &[],
        reward_seconds: 300.0,
        min_reward: 1.0e3,
    },
    SynergyDef {
        id: "fungal_network",
        label: "Fungal Network",
        requires_buildings: &[("mushroom_log", 25)],
        requires_research: &["mycology"],
        requires_upgrades: &[],
        reward_seconds: 600.0,
        min_reward: 5.0e3,
    },
    SynergyDef {
        id: "closed_loop",
        label: "Closed Loop",
        requires_buildings: &[("greenhouse", 10)],
        requires_research: &["logistics"],
        requires_upgrades: &["bulk_seed_contract"],
        reward_seconds: 900.0,
        min_reward: 2.0e5,
    },
];

pub fn find_synergy(id: &str) -> Option<&'static SynergyDef> {
    SYNERGIES.iter().find(|s| s.id == id)
}

// ── Tuning constants ───────────────────────────────────────────────

pub const OFFLINE_CAP_BASE: Millis = 8 * MS_PER_HOUR;
pub const OFFLINE_GAIN_RATIO: f64 = 0.5;

pub const SEED_CLICK_BASE_CHANCE: f64 = 0.01;
/// Ceiling on base chance + research bonuses.
pub const SEED_CHANCE_CEILING: f64 = 0.06;
pub const SEED_IDLE_INTERVAL: Millis = 60 * MS_PER_SEC;
pub const SEED_IDLE_CHANCE: f64 = 0.05;
pub const SEED_THROTTLE_WINDOW: Millis = 60 * MS_PER_MIN;
pub const SEED_HISTORY_CAP: usize = 200;

/// Hourly seed cap, stepped by lifetime-currency magnitude.
pub fn seed_rate_cap(lifetime: &Decimal) -> u64 {
    if *lifetime < Decimal::from_f64(1.0e6) {
        5
    } else if *lifetime < Decimal::from_f64(1.0e9) {
        10
    } else if *lifetime < Decimal::from_f64(1.0e12) {
        20
    } else {
        40
    }
}

pub const PRESTIGE_COEFFICIENT: f64 = 0.001;
pub const PRESTIGE_MULT_PER_SEED: f64 = 0.05;

/// External cost multiplier never drops below this fraction of nominal.
pub const COST_MULT_FLOOR: f64 = 0.80;

pub const BURST_SECONDS: f64 = 900.0;
pub const BURST_FLAT_MIN: f64 = 100.0;
pub const SEED_EVENT_MAX: u64 = 5;
pub const FRENZY_MULT: f64 = 7.0;
pub const FRENZY_DURATION: Millis = 77 * MS_PER_SEC;
pub const EVENT_OFFER_LIFETIME: Millis = 30 * MS_PER_SEC;

pub const AUTOSAVE_INTERVAL: Millis = 60 * MS_PER_SEC;
pub const AUTOBUY_INTERVAL: Millis = 10 * MS_PER_SEC;
pub const EVENT_SPAWN_INTERVAL: Millis = 5 * MS_PER_MIN;

pub const ROI_THRESHOLD_MIN: f64 = 1.0;
pub const ROI_THRESHOLD_MAX: f64 = 86_400.0;
pub const ROI_THRESHOLD_DEFAULT: f64 = 3_600.0;
pub const RESERVE_PERCENT_MAX: f64 = 30.0;
