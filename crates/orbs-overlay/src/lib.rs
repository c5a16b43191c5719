//! # Orbs Overlay
//!
//! Headless host for the Skill Orbs engine. It replays a recorded session
//! trace (game ticks, pointer activity, settings changes) through an
//! [`orbs_engine::OrbRegistry`] and emits orb projections as JSON lines, either
//! on a virtual clock or in real time on tokio.

pub mod config;
pub mod replay;
pub mod trace;

pub use config::{LoggingSettings, OverlayConfig, ReplayMode, ReplaySettings};
pub use replay::{
    apply_event, replay_realtime, replay_virtual, write_frame, Frame, FrameReason, ReplaySummary,
    SharedRegistry, TokioClock,
};
pub use trace::{parse_trace, TraceEvent, TraceRecord};
