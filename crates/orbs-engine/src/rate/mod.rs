//! Rate estimation module
//!
//! Provides per-skill experience-per-hour estimates:
//! - SkillRateState: time-adaptive EMA with session-average fallback
//! - SampleWindow: trailing 5-minute sample window and its windowed rate

pub mod estimator;
pub mod window;

pub use estimator::{EmaUpdate, SkillRateState};
pub use window::{Sample, SampleWindow};
