//! verdant-runner: headless scripted session for the Verdant core.
//!
//! Usage:
//!   verdant-runner --seed 12345 --minutes 30 --db run.db
//!
//! Drives the engine one second at a time with a simple player script:
//! click hard early, turn automation on once the garden sustains itself,
//! and always click a pending event offer. Useful for eyeballing balance
//! and for reproducing a run from a seed.

use anyhow::Result;
use verdant_core::engine::{AutomationPatch, GameEngine};
use verdant_core::notice::Notice;
use verdant_core::registry;
use verdant_core::store::SaveStore;
use verdant_core::types::MS_PER_SEC;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let minutes = parse_arg(&args, "--minutes", 30u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");

    println!("Verdant — runner");
    println!("  seed:    {seed}");
    println!("  minutes: {minutes}");
    println!("  db:      {db}");
    println!();

    let store = if db == ":memory:" {
        SaveStore::in_memory()?
    } else {
        SaveStore::open(db)?
    };

    let start = chrono::Utc::now().timestamp_millis();
    let mut engine = GameEngine::load(seed, start, store)?;

    let mut tally = NoticeTally::default();
    let total_seconds = minutes * 60;
    for second in 1..=total_seconds {
        let now = start + second as i64 * MS_PER_SEC;

        // Click phase: four clicks a second for the first two minutes,
        // then hand over to automation.
        if second <= 120 {
            for _ in 0..4 {
                engine.manual_action(now);
            }
        } else if second == 121 {
            engine.set_automation_config(AutomationPatch {
                auto_buy_enabled: Some(true),
                ..AutomationPatch::default()
            });
        }

        // A visible event offer is always worth clicking.
        if let Some(offer) = engine.pending_event() {
            let token = offer.token.clone();
            engine.trigger_event_click(&token, now);
        }

        // Early buildings are bought by hand before automation kicks in.
        if second <= 120 && second % 5 == 0 {
            for def in registry::BUILDINGS {
                engine.purchase(def.id, 1, now);
            }
        }

        engine.tick(now)?;
        tally.absorb(engine.drain_notices());
    }

    engine.shutdown()?;
    print_summary(&engine, &tally, total_seconds);
    Ok(())
}

#[derive(Default)]
struct NoticeTally {
    seeds_awarded: u64,
    achievements: usize,
    milestones: usize,
    synergies: usize,
    events: usize,
}

impl NoticeTally {
    fn absorb(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::SeedAwarded { amount, .. } => self.seeds_awarded += amount,
                Notice::AchievementUnlocked { .. } => self.achievements += 1,
                Notice::MilestoneUnlocked { .. } => self.milestones += 1,
                Notice::SynergyClaimed { .. } => self.synergies += 1,
                Notice::EventRewarded { .. } => self.events += 1,
                _ => {}
            }
        }
    }
}

fn print_summary(engine: &GameEngine, tally: &NoticeTally, seconds: u64) {
    let state = engine.state();
    println!("=== RUN SUMMARY ===");
    println!("  seconds run:    {seconds}");
    println!("  clicks:         {}", state.clicks);
    println!("  currency:       {}", state.currency);
    println!("  lifetime:       {}", state.lifetime_currency);
    println!("  production/s:   {}", engine.production_rate());
    println!("  click yield:    {}", engine.click_yield());
    println!("  seeds banked:   {}", state.prestige.seeds_banked);
    println!("  seeds awarded:  {}", tally.seeds_awarded);
    println!("  achievements:   {}", tally.achievements);
    println!("  milestones:     {}", tally.milestones);
    println!("  synergies:      {}", tally.synergies);
    println!("  events clicked: {}", tally.events);
    println!();
    println!("=== OWNERSHIP ===");
    for def in registry::BUILDINGS {
        let owned = state.owned_count(def.id);
        if owned > 0 {
            println!("  {:<18} x{owned}", def.id);
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
