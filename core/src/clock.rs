//! Game clock — owns the core's notion of "now".
//!
//! The host feeds wall-clock milliseconds into the engine; components
//! never read platform time themselves. Backwards jumps (clock skew,
//! suspend/resume weirdness) clamp to zero elapsed time.

use crate::types::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    now: Millis,
}

impl GameClock {
    pub fn new(now: Millis) -> Self {
        Self { now }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Move the clock forward to `now`. Returns the elapsed millis,
    /// clamped at zero — the clock never runs backwards.
    pub fn advance_to(&mut self, now: Millis) -> Millis {
        let elapsed = (now - self.now).max(0);
        if elapsed > 0 {
            self.now = now;
        }
        elapsed
    }
}
