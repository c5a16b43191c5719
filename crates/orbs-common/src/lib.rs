//! # Orbs Common
//!
//! Shared types, settings, and errors for the Skill Orbs overlay engine.
//!
//! ## Core Types
//!
//! - [`ExperienceTable`]: level → cumulative experience thresholds (1-100)
//! - [`SkillObservation`]: one `(skill id, level, total xp)` sample from the game feed
//! - [`SkillKey`]: stable per-skill identity (display name or numeric id)
//! - [`SkillNames`]: numeric id → display name lookup
//! - [`OrbSettings`]: user-facing configuration snapshot and change classification

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{FeedError, OrbsError, Result, TableError};
pub use types::{
    observation::{SkillKey, SkillNames, SkillObservation},
    settings::{OrbSettings, RateSource, RowAlignment, SettingsChange, StatRows},
    xp_table::{ExperienceTable, LevelProgress},
};

/// Orbs version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Highest level in the experience table
pub const MAX_LEVEL: i32 = 100;

/// EMA time constant in seconds
pub const EMA_TAU_SECONDS: f64 = 30.0;

/// Minimum spacing between two EMA samples
pub const MIN_SAMPLE_INTERVAL_MS: i64 = 250;

/// Trailing sample window retention (5 minutes)
pub const SAMPLE_RETENTION_MS: i64 = 5 * 60 * 1000;

/// Milliseconds per hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Duration of the opacity transition while an orb fades
pub const FADE_TRANSITION_MS: i64 = 220;

/// Hard removal deadline after a fade begins
pub const REMOVAL_GRACE_MS: i64 = 260;

/// Period of the stats refresh (EMA decay + re-render)
pub const STATS_REFRESH_MS: i64 = 1000;

/// Placeholder rendered for undefined numbers
pub const NAN_MARKER: &str = "NaN";
