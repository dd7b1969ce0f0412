//! Verdant core — the deterministic progression engine behind the garden.
//!
//! Everything here is headless and clock-agnostic: the host hands in a
//! monotonically advancing timestamp and drains notices back out. Given
//! the same seed and the same command script, two runs produce
//! byte-identical save blobs.

pub mod abilities;
pub mod autobuy;
pub mod clock;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod migrate;
pub mod notice;
pub mod offline;
pub mod prestige;
pub mod purchase;
pub mod registry;
pub mod rng;
pub mod save;
pub mod scheduler;
pub mod seeds;
pub mod state;
pub mod stats;
pub mod store;
pub mod types;
pub mod world_event;

pub use engine::GameEngine;
pub use error::{GameError, GameResult};
