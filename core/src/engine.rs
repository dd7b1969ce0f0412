//! The game engine — the single owner of GameState.
//!
//! RULES:
//!   - All mutation flows through the named command entry points here
//!     (manual_action, purchase, activate_ability, trigger_event_click,
//!     perform_prestige, set_automation_config, tick). No collaborator
//!     reaches into nested state directly.
//!   - Any mutation that changes production-affecting state is followed
//!     by a derived-stats pass before the next read of the derived
//!     values. Every command upholds this before returning.
//!   - All randomness flows through the RngBank.
//!   - Execution is single-threaded; every handler runs to completion,
//!     leaving the state internally consistent before yielding.

use crate::abilities::{self, ActivationOutcome};
use crate::autobuy;
use crate::clock::GameClock;
use crate::decimal::Decimal;
use crate::error::GameResult;
use crate::notice::{Notice, NoticeQueue};
use crate::offline;
use crate::prestige::{self, PrestigeOutcome};
use crate::purchase::{self, PurchaseOutcome};
use crate::registry;
use crate::rng::{RngBank, RngSlot};
use crate::save;
use crate::scheduler::Schedulers;
use crate::seeds;
use crate::state::GameState;
use crate::stats;
use crate::store::{SaveStore, AUTOSAVE_SLOT};
use crate::types::{Millis, MS_PER_SEC};
use crate::world_event::{self, EventOffer, EventOutcome};
use log::{debug, info};

pub struct GameEngine {
    state: GameState,
    clock: GameClock,
    rng: RngBank,
    schedulers: Schedulers,
    notices: NoticeQueue,
    store: Option<SaveStore>,
    pending_event: Option<EventOffer>,
    seed: u64,
}

impl GameEngine {
    /// Fresh first-run engine, no persistence.
    pub fn fresh(seed: u64, now: Millis) -> Self {
        let mut engine = Self {
            state: GameState::fresh(now),
            clock: GameClock::new(now),
            rng: RngBank::new(seed),
            schedulers: Schedulers::new(),
            notices: NoticeQueue::default(),
            store: None,
            pending_event: None,
            seed,
        };
        engine.schedulers.start_all(now);
        stats::recalc(&mut engine.state, now);
        engine
    }

    /// Build against a store: resume from the autosave slot if one
    /// decodes (migrating older generations), otherwise start fresh.
    /// Offline catch-up runs here, against the snapshotted rate.
    pub fn load(seed: u64, now: Millis, store: SaveStore) -> GameResult<Self> {
        let blob = store.read_save(AUTOSAVE_SLOT)?;
        let mut engine = Self::fresh(seed, now);
        engine.store = Some(store);
        if let Some((_, json)) = blob {
            engine.adopt_blob(&json, now);
        }
        Ok(engine)
    }

    /// Swap in state decoded from `json`, falling back to fresh state
    /// when the blob is unreadable. Never surfaces an error to the host.
    fn adopt_blob(&mut self, json: &str, now: Millis) {
        match save::load_any_generation(json) {
            Some(blob) => {
                let mut state = save::from_save(blob, now);
                if let Some(reward) = offline::apply(&mut state, now) {
                    self.notices.push(Notice::OfflineGains {
                        amount: reward.amount,
                        elapsed: reward.elapsed,
                    });
                }
                stats::recalc(&mut state, now);
                self.state = state;
                info!("resumed save (version {})", save::CURRENT_SAVE_VERSION);
            }
            None => {
                info!("save blob unreadable, starting fresh");
                self.state = GameState::fresh(now);
                stats::recalc(&mut self.state, now);
            }
        }
    }

    // ── Command surface ────────────────────────────────────────────

    /// The click. Settles outstanding idle intervals, earns the click
    /// yield, rolls for a seed, and resets the idle anchor.
    pub fn manual_action(&mut self, now: Millis) {
        self.clock.advance_to(now);
        let now = self.clock.now();
        // Timed buffs may have lapsed since the last pass; refresh
        // before reading the yield.
        self.refresh(now);

        self.state.clicks += 1;
        let yield_now = self.state.derived.click_yield;
        self.state.earn(&yield_now);

        // Intervals that fully elapsed before this click are still owed
        // their rolls; the anchor reset below must not discard them.
        let idle = seeds::process_idle_rolls(
            &mut self.state,
            self.rng.slot(RngSlot::IdleRoll),
            now,
        );
        if idle.seeds_awarded > 0 {
            self.notices.push(Notice::SeedAwarded {
                amount: idle.seeds_awarded,
                source: crate::state::SeedSource::Idle,
            });
        }
        seeds::record_interaction(&mut self.state, now);

        if let Some(amount) =
            seeds::click_roll(&mut self.state, self.rng.slot(RngSlot::ClickRoll), now)
        {
            self.notices.push(Notice::SeedAwarded {
                amount,
                source: crate::state::SeedSource::Click,
            });
        }

        self.after_mutation(now);
    }

    /// Buy a building (by quantity), upgrade, or research entry.
    pub fn purchase(&mut self, id: &str, quantity: u32, now: Millis) -> PurchaseOutcome {
        self.clock.advance_to(now);
        let now = self.clock.now();
        let outcome = purchase::buy(&mut self.state, id, quantity, now);
        if let PurchaseOutcome::Bought { achievements_unlocked, milestones_unlocked, .. } =
            &outcome
        {
            for &id in achievements_unlocked {
                self.notices.push(Notice::AchievementUnlocked { id });
            }
            for &id in milestones_unlocked {
                self.notices.push(Notice::MilestoneUnlocked { id });
            }
        }
        outcome
    }

    /// Stats pass with milestone notices.
    fn refresh(&mut self, now: Millis) {
        for id in stats::recalc(&mut self.state, now) {
            self.notices.push(Notice::MilestoneUnlocked { id });
        }
    }

    pub fn activate_ability(&mut self, id: &str, now: Millis) -> ActivationOutcome {
        self.clock.advance_to(now);
        let now = self.clock.now();
        let outcome = abilities::activate(&mut self.state, id, now);
        if let ActivationOutcome::Activated { active_until } = outcome {
            if let Some(def) = registry::find_ability(id) {
                self.notices.push(Notice::AbilityActivated { id: def.id, active_until });
            }
            self.after_mutation(now);
        }
        outcome
    }

    /// Resolve a clicked world-event offer by token.
    pub fn trigger_event_click(&mut self, token: &str, now: Millis) -> EventClickOutcome {
        self.clock.advance_to(now);
        let now = self.clock.now();
        let Some(offer) = self.pending_event.clone() else {
            return EventClickOutcome::NoPendingEvent;
        };
        if offer.token != token {
            return EventClickOutcome::TokenMismatch;
        }
        if now >= offer.expires_at {
            self.pending_event = None;
            return EventClickOutcome::Expired;
        }
        self.pending_event = None;
        // Burst rewards read the derived rate; make sure it is current.
        self.refresh(now);
        let outcome = world_event::resolve(
            &mut self.state,
            offer.kind,
            self.rng.slot(RngSlot::EventReward),
            now,
        );
        self.notices.push(Notice::EventRewarded { description: describe_event(&outcome) });
        if let EventOutcome::SeedsGranted(amount) = outcome {
            self.notices.push(Notice::SeedAwarded {
                amount,
                source: crate::state::SeedSource::Event,
            });
        }
        self.after_mutation(now);
        EventClickOutcome::Rewarded(outcome)
    }

    pub fn perform_prestige(&mut self, now: Millis) -> PrestigeOutcome {
        self.clock.advance_to(now);
        let now = self.clock.now();
        let outcome = prestige::perform(&mut self.state, now);
        if let PrestigeOutcome::Reset { seeds_gained } = outcome {
            self.notices.push(Notice::PrestigeCompleted { seeds_gained });
            self.after_mutation(now);
        }
        outcome
    }

    /// Partial automation update; unset fields keep their value.
    /// Numeric fields are clamped into their valid intervals.
    pub fn set_automation_config(&mut self, patch: AutomationPatch) {
        let automation = &mut self.state.automation;
        if let Some(enabled) = patch.auto_buy_enabled {
            automation.auto_buy_enabled = enabled;
        }
        if let Some(enabled) = patch.roi_enabled {
            automation.roi.enabled = enabled;
        }
        if let Some(threshold) = patch.roi_threshold_seconds {
            if threshold.is_finite() {
                automation.roi.threshold_seconds =
                    threshold.clamp(registry::ROI_THRESHOLD_MIN, registry::ROI_THRESHOLD_MAX);
            }
        }
        if let Some(enabled) = patch.reserve_enabled {
            automation.reserve.enabled = enabled;
        }
        if let Some(percent) = patch.reserve_percent {
            if percent.is_finite() {
                automation.reserve.percent =
                    percent.clamp(0.0, registry::RESERVE_PERCENT_MAX);
            }
        }
    }

    /// Advance real time: accumulate production over the elapsed span at
    /// the rate that was current when the span began, then drive the
    /// timed sub-economies and interval timers.
    pub fn tick(&mut self, now: Millis) -> GameResult<()> {
        let elapsed = self.clock.advance_to(now);
        let now = self.clock.now();

        if elapsed > 0 {
            let earned = self
                .state
                .derived
                .production_rate
                .mul_f64(elapsed as f64 / MS_PER_SEC as f64);
            self.state.earn(&earned);
        }

        let idle = seeds::process_idle_rolls(
            &mut self.state,
            self.rng.slot(RngSlot::IdleRoll),
            now,
        );
        if idle.seeds_awarded > 0 {
            self.notices.push(Notice::SeedAwarded {
                amount: idle.seeds_awarded,
                source: crate::state::SeedSource::Idle,
            });
        }

        // Earnings and idle awards above may have crossed achievement
        // thresholds; settle them so the synergy pass reads the fresh rate.
        self.after_mutation(now);

        for (id, reward) in seeds::evaluate_synergies(&mut self.state) {
            self.notices.push(Notice::SynergyClaimed { id, reward });
        }

        self.after_mutation(now);

        if self.schedulers.event_spawn.poll(now) {
            let offer = world_event::spawn_offer(self.rng.slot(RngSlot::EventReward), now);
            debug!("event offer spawned: {:?} ({})", offer.kind, offer.token);
            self.pending_event = Some(offer);
        }
        if let Some(offer) = &self.pending_event {
            if now >= offer.expires_at {
                self.pending_event = None;
            }
        }

        if self.schedulers.autobuy.poll(now) {
            if let Some(report) = autobuy::run(&mut self.state, now) {
                for &id in &report.achievements_unlocked {
                    self.notices.push(Notice::AchievementUnlocked { id });
                }
                for &id in &report.milestones_unlocked {
                    self.notices.push(Notice::MilestoneUnlocked { id });
                }
            }
        }

        if self.schedulers.autosave.poll(now) {
            self.save_now()?;
        }
        Ok(())
    }

    /// Achievement sweep plus the mandatory stats pass, with notices for
    /// anything newly latched.
    fn after_mutation(&mut self, now: Millis) {
        for id in purchase::evaluate_achievements(&mut self.state) {
            self.notices.push(Notice::AchievementUnlocked { id });
        }
        self.refresh(now);
    }

    // ── Persistence ────────────────────────────────────────────────

    /// Encode the current state, snapshotting the production rate and
    /// last-seen timestamp that offline catch-up will read on next load.
    pub fn save_blob(&mut self) -> GameResult<String> {
        let now = self.clock.now();
        self.state.meta.last_seen_at = now;
        self.state.meta.last_production_rate_at_save = self.state.derived.production_rate;
        save::encode(&save::to_save(&self.state))
    }

    pub fn save_now(&mut self) -> GameResult<()> {
        let blob = self.save_blob()?;
        if let Some(store) = &self.store {
            store.write_save(AUTOSAVE_SLOT, self.clock.now(), &blob)?;
            debug!("autosaved at {}", self.clock.now());
        }
        Ok(())
    }

    /// Export: the save blob in its reversible text wrapping.
    pub fn export_save(&mut self) -> GameResult<String> {
        let now = self.clock.now();
        self.state.meta.last_seen_at = now;
        self.state.meta.last_production_rate_at_save = self.state.derived.production_rate;
        save::export(&save::to_save(&self.state))
    }

    /// Import an exported string, replacing the current state. Malformed
    /// input errors recoverably and leaves the state untouched.
    pub fn import_save(&mut self, text: &str, now: Millis) -> GameResult<()> {
        let blob = save::import(text)?;
        self.clock.advance_to(now);
        let now = self.clock.now();
        let mut state = save::from_save(blob, now);
        if let Some(reward) = offline::apply(&mut state, now) {
            self.notices.push(Notice::OfflineGains {
                amount: reward.amount,
                elapsed: reward.elapsed,
            });
        }
        stats::recalc(&mut state, now);
        self.state = state;
        Ok(())
    }

    /// Teardown: final save, then stop every timer so nothing fires
    /// against a dead engine.
    pub fn shutdown(&mut self) -> GameResult<()> {
        self.save_now()?;
        self.schedulers.stop_all();
        Ok(())
    }

    // ── Read surface ───────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn production_rate(&self) -> Decimal {
        self.state.derived.production_rate
    }

    pub fn click_yield(&self) -> Decimal {
        self.state.derived.click_yield
    }

    pub fn pending_event(&self) -> Option<&EventOffer> {
        self.pending_event.as_ref()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventClickOutcome {
    Rewarded(EventOutcome),
    NoPendingEvent,
    TokenMismatch,
    Expired,
}

/// Optional-field automation patch; `None` leaves a field alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutomationPatch {
    pub auto_buy_enabled: Option<bool>,
    pub roi_enabled: Option<bool>,
    pub roi_threshold_seconds: Option<f64>,
    pub reserve_enabled: Option<bool>,
    pub reserve_percent: Option<f64>,
}

fn describe_event(outcome: &EventOutcome) -> String {
    match outcome {
        EventOutcome::CurrencyGranted(amount) => format!("currency burst: +{amount}"),
        EventOutcome::SeedsGranted(amount) => format!("seed grant: +{amount}"),
        EventOutcome::FrenzyApplied { .. } => "frenzy".to_string(),
    }
}
