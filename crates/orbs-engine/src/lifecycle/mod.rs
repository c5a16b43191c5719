//! Orb lifecycle module
//!
//! - TimerQueue: deterministic cancellable timers ordered by deadline
//! - OrbLifecycle: Active → Fading → Removed state machine with hover pause

pub mod machine;
pub mod timer;

pub use machine::{LifecycleState, OrbLifecycle, OrbTimer, TimerKind};
pub use timer::{TimerHandle, TimerQueue};
