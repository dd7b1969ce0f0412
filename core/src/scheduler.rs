//! Interval timers — explicit, ownable, stoppable.
//!
//! No hidden module-level timer state: the engine constructs its
//! scheduler bundle, starts it, polls it from the tick driver, and can
//! stop it on teardown so nothing fires against a torn-down state.

use crate::registry;
use crate::types::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    period: Millis,
    next_at: Option<Millis>,
}

impl IntervalTimer {
    pub fn new(period: Millis) -> Self {
        Self { period, next_at: None }
    }

    pub fn start(&mut self, now: Millis) {
        self.next_at = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_at = None;
    }

    pub fn running(&self) -> bool {
        self.next_at.is_some()
    }

    /// Fire at most once per poll; a long gap does not replay missed
    /// firings (offline catch-up has its own path).
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.next_at {
            Some(at) if now >= at => {
                self.next_at = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

/// The engine's timer bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedulers {
    pub autosave: IntervalTimer,
    pub autobuy: IntervalTimer,
    pub event_spawn: IntervalTimer,
}

impl Schedulers {
    pub fn new() -> Self {
        Self {
            autosave: IntervalTimer::new(registry::AUTOSAVE_INTERVAL),
            autobuy: IntervalTimer::new(registry::AUTOBUY_INTERVAL),
            event_spawn: IntervalTimer::new(registry::EVENT_SPAWN_INTERVAL),
        }
    }

    pub fn start_all(&mut self, now: Millis) {
        self.autosave.start(now);
        self.autobuy.start(now);
        self.event_spawn.start(now);
    }

    pub fn stop_all(&mut self) {
        self.autosave.stop();
        self.autobuy.stop();
        self.event_spawn.stop();
    }
}

impl Default for Schedulers {
    fn default() -> Self {
        Self::new()
    }
}
