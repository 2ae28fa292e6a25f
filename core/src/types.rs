//! Shared primitive types used across the engine.

/// Position on a ladder, 1-based.
pub type Rank = u32;

/// Ladder score (and the other per-entry counters).
pub type Score = u64;

/// Invasion identifier, `YYYYMMDD-<settlement code>`.
pub type InvasionId = String;

/// A member's canonical name as stored on the roster.
pub type MemberName = String;
