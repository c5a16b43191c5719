//! Presentation module
//!
//! Turns engine state into renderer-ready values:
//! - format: tooltip number/time formatting
//! - projection: per-orb read-only view
//! - layout: row geometry used for drawing and hover hit-testing

pub mod format;
pub mod layout;
pub mod projection;

pub use layout::{orb_boxes, Point, Rect};
pub use projection::{OrbProjection, OrbVisual, RowVisibility};
