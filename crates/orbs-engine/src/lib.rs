//! # Orbs Engine
//!
//! Per-skill experience-rate tracking and orb lifecycle for the Skill Orbs
//! overlay.
//!
//! Every game tick the host hands the engine the player's skill observations.
//! The engine diffs them against the previous tick, feeds each gain to the
//! skill's rate estimator, and keeps one transient "orb" per recently active
//! skill. Orbs fade out after a configurable idle period unless the pointer is
//! resting on them.
//!
//! ## Key Concepts
//!
//! - **Rate estimation**: time-adaptive EMA of xp/hour with a session-average
//!   fallback and a 5-minute trailing window
//! - **Lifecycle**: `Active → Fading → Removed`, driven by a deterministic
//!   cancellable [`TimerQueue`]
//! - **Hover**: coalesced per-frame hit-testing that pauses the countdown
//! - **Projection**: read-only [`OrbProjection`] snapshots for any renderer
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     OrbRegistry                       │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐    │
//! │  │ observe /   │  │  advance    │  │ animation   │    │
//! │  │ refresh     │  │  (timers)   │  │ frame/hover │    │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘    │
//! │         │                │                │           │
//! │  ┌──────┴──────┐  ┌──────┴──────┐  ┌──────┴──────┐    │
//! │  │SkillRate    │  │OrbLifecycle │  │HoverTracker │    │
//! │  │State        │  │+ TimerQueue │  │+ layout     │    │
//! │  └─────────────┘  └─────────────┘  └─────────────┘    │
//! └───────────────────────────┬───────────────────────────┘
//!                             │
//!                     OrbProjection (render)
//! ```
//!
//! Time is always passed in as Unix milliseconds; nothing in this crate reads
//! a clock on its own.

pub mod clock;
pub mod feed;
pub mod hover;
pub mod lifecycle;
pub mod presentation;
pub mod rate;
pub mod registry;

// Re-export core types
pub use clock::{Clock, ManualClock, SystemClock};
pub use feed::{normalize_skills_bag, player_observations, PlayerSnapshot, SkillSource};
pub use hover::{HoverTracker, HoverTransition};
pub use lifecycle::{LifecycleState, OrbLifecycle, OrbTimer, TimerHandle, TimerKind, TimerQueue};
pub use presentation::{OrbProjection, OrbVisual, Point, Rect, RowVisibility};
pub use rate::{EmaUpdate, SkillRateState};
pub use registry::{LifecycleEvent, OrbRecord, OrbRegistry, TickReport};
