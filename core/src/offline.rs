//! Offline catch-up — computed once, at load time.
//!
//! Reward uses the production rate snapshotted at the last save, never a
//! freshly recalculated one: bonuses acquired after the snapshot must
//! not retroactively inflate offline gains.

use crate::decimal::Decimal;
use crate::registry::{self, ResearchEffect};
use crate::state::GameState;
use crate::types::{Millis, MS_PER_SEC};
use log::info;

/// Offline cap: the configured base plus any research extension.
pub fn offline_cap(state: &GameState) -> Millis {
    let mut cap = registry::OFFLINE_CAP_BASE;
    for id in &state.research_owned {
        if let Some(def) = registry::find_research(id) {
            if let ResearchEffect::OfflineCapBonus(bonus) = def.effect {
                cap += bonus;
            }
        }
    }
    cap
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReward {
    pub amount: Decimal,
    /// Elapsed time actually credited, after the cap.
    pub elapsed: Millis,
}

/// Compute and apply the offline reward for the gap between
/// `meta.last_seen_at` and `now`. Returns `None` when the reward floors
/// to zero — in that case no one-shot flag is raised.
pub fn apply(state: &mut GameState, now: Millis) -> Option<OfflineReward> {
    let elapsed = (now - state.meta.last_seen_at).clamp(0, offline_cap(state));
    if elapsed == 0 {
        return None;
    }
    let elapsed_seconds = elapsed as f64 / MS_PER_SEC as f64;
    let reward = state
        .meta
        .last_production_rate_at_save
        .mul_f64(elapsed_seconds * registry::OFFLINE_GAIN_RATIO)
        .floor();
    if reward.is_zero() {
        return None;
    }
    state.earn(&reward);
    info!("offline catch-up: {reward} over {elapsed}ms");
    Some(OfflineReward { amount: reward, elapsed })
}
