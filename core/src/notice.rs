//! One-shot outbound notifications.
//!
//! RULE: The core never renders anything. Anything the UI must react to
//! exactly once — offline gains, a seed award, a synergy claim — is
//! queued here and drained by the collaborator.

use crate::decimal::Decimal;
use crate::state::SeedSource;
use crate::types::{Id, Millis};

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    OfflineGains { amount: Decimal, elapsed: Millis },
    SeedAwarded { amount: u64, source: SeedSource },
    SynergyClaimed { id: Id, reward: Decimal },
    AchievementUnlocked { id: Id },
    MilestoneUnlocked { id: Id },
    AbilityActivated { id: Id, active_until: Millis },
    EventRewarded { description: String },
    PrestigeCompleted { seeds_gained: u64 },
}

/// FIFO queue of pending notices. Owned by the engine, drained by the host.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: Vec<Notice>,
}

impl NoticeQueue {
    pub fn push(&mut self, notice: Notice) {
        self.pending.push(notice);
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
