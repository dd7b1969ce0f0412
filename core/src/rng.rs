//! Deterministic random number generation.
//!
//! RULE: Nothing in the core may call any platform RNG. All randomness
//! flows through the per-slot streams held by the RngBank, derived from
//! the single master seed carried by the engine.
//!
//! Each random consumer gets its own stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new slot never changes existing slots' streams.
//!   - Each slot's stream is fully reproducible in isolation.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream for a single consumer.
pub struct SlotRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SlotRng {
    /// Create a slot RNG from the master seed and a stable slot index.
    /// The index must never change once assigned.
    fn new(master_seed: u64, slot_index: u64, name: &'static str) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self { name, inner: Pcg64Mcg::seed_from_u64(derived_seed) }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a raw u64.
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Stable slot indices. Never renumber an existing slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngSlot {
    ClickRoll = 1,
    IdleRoll = 2,
    EventReward = 3,
}

/// All random streams for one engine instance. Streams persist across
/// ticks so draws advance instead of repeating.
pub struct RngBank {
    click_roll: SlotRng,
    idle_roll: SlotRng,
    event_reward: SlotRng,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self {
            click_roll: SlotRng::new(master_seed, RngSlot::ClickRoll as u64, "click_roll"),
            idle_roll: SlotRng::new(master_seed, RngSlot::IdleRoll as u64, "idle_roll"),
            event_reward: SlotRng::new(master_seed, RngSlot::EventReward as u64, "event_reward"),
        }
    }

    pub fn slot(&mut self, slot: RngSlot) -> &mut SlotRng {
        match slot {
            RngSlot::ClickRoll => &mut self.click_roll,
            RngSlot::IdleRoll => &mut self.idle_roll,
            RngSlot::EventReward => &mut self.event_reward,
        }
    }
}
