//! Shared primitive types used across the entire core.

/// Epoch milliseconds. All timestamps and durations in the core are i64 ms;
/// wall-clock time enters only at the host boundary.
pub type Millis = i64;

/// A stable identifier for compiled-in content (buildings, upgrades,
/// research, achievements, milestones, abilities, synergies).
pub type Id = &'static str;

/// Save schema generation number.
pub type SaveVersion = u32;

pub const MS_PER_SEC: Millis = 1_000;
pub const MS_PER_MIN: Millis = 60 * MS_PER_SEC;
pub const MS_PER_HOUR: Millis = 60 * MS_PER_MIN;
