//! Read-only orb projections handed to a renderer

use crate::lifecycle::{LifecycleState, OrbLifecycle};
use crate::presentation::format::{abbreviate, format_hms, format_xp, skill_glyph, title_case};
use crate::rate::SkillRateState;
use orbs_common::{OrbSettings, StatRows, NAN_MARKER};
use serde::{Deserialize, Serialize};

/// Inner core diameter as a fraction of the orb
pub const INNER_CORE_SCALE: f64 = 0.70;
/// Ring thickness as a fraction of the radius
pub const RING_THICKNESS: f64 = 0.04;
/// Native size of a sprite icon cell (px)
pub const ICON_BASE_CELL_PX: f64 = 24.0;
/// Orb size the sprite scales are calibrated for (px)
pub const REFERENCE_ORB_SIZE: f64 = 56.0;

/// Which tooltip rows render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowVisibility {
    pub current_xp: bool,
    pub xp_to_level: bool,
    pub time_to_level: bool,
    pub xp_hr: bool,
}

impl RowVisibility {
    /// Rows for a skill; to-next rows are always hidden once maxed
    pub fn derive(rows: &StatRows, maxed: bool) -> Self {
        Self {
            current_xp: rows.show_current_xp,
            xp_to_level: rows.show_xp_to_level && !maxed,
            time_to_level: rows.show_time_to_level && !maxed,
            xp_hr: rows.show_xp_hr,
        }
    }
}

/// Size-derived visual parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbVisual {
    /// Orb diameter (px)
    pub size_px: f64,
    /// Scale relative to the reference orb size
    pub orb_scale: f64,
    pub inner_core_scale: f64,
    pub ring_thickness: f64,
    /// Sprite scale so the icon fills the configured share of the core
    pub icon_scale: f64,
}

impl OrbVisual {
    pub fn derive(settings: &OrbSettings) -> Self {
        let size = settings.orb_size;
        let inner_px = (size * INNER_CORE_SCALE).floor();
        let target_px = (inner_px * settings.icon_scaling_percent / 100.0).floor();

        Self {
            size_px: size,
            orb_scale: size / REFERENCE_ORB_SIZE,
            inner_core_scale: INNER_CORE_SCALE,
            ring_thickness: RING_THICKNESS,
            icon_scale: target_px / ICON_BASE_CELL_PX,
        }
    }
}

/// Everything a renderer needs to draw one orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbProjection {
    pub skill_key: String,
    pub title: String,
    pub glyph: Option<String>,
    pub level: i32,
    /// Ring fill in [0, 1]; 1 when maxed
    pub progress_fraction: f64,
    /// `(12.3% to Next)` or `Maxed`
    pub progress_label: String,
    pub total_xp_display: String,
    /// Empty when maxed
    pub xp_to_next_display: String,
    pub rate_per_hour_display: String,
    pub time_to_level_display: String,
    /// Ring hue: 0 (red) at empty through 120 (green) at full
    pub ring_hue: u32,
    pub rows: RowVisibility,
    pub lifecycle: LifecycleState,
    pub hovered: bool,
    pub opacity: f64,
    pub visual: OrbVisual,
}

impl OrbProjection {
    /// Project one orb at `now_ms`
    pub fn build(
        rate: &SkillRateState,
        lifecycle: &OrbLifecycle,
        settings: &OrbSettings,
        now_ms: i64,
    ) -> Self {
        let maxed = rate.maxed;
        let progress = if maxed {
            1.0
        } else {
            rate.progress_fraction.clamp(0.0, 1.0)
        };

        let xp_hr = rate.rate(settings.rate_source, now_ms);
        let rate_display = if xp_hr.is_finite() && xp_hr > 0.0 {
            abbreviate(xp_hr.floor())
        } else {
            NAN_MARKER.to_string()
        };

        let key = rate.skill_key.as_str();

        Self {
            skill_key: key.to_string(),
            title: title_case(key),
            glyph: skill_glyph(key).map(str::to_string),
            level: rate.current_level,
            progress_fraction: progress,
            progress_label: if maxed {
                "Maxed".to_string()
            } else {
                format!("({:.1}% to Next)", progress * 100.0)
            },
            total_xp_display: format_xp(rate.total_xp),
            xp_to_next_display: if maxed {
                String::new()
            } else {
                format_xp(rate.xp_to_next_level)
            },
            rate_per_hour_display: rate_display,
            time_to_level_display: format_hms(rate.time_to_level_seconds(xp_hr)),
            ring_hue: (120.0 * progress).round() as u32,
            rows: RowVisibility::derive(&settings.rows, maxed),
            lifecycle: lifecycle.state(),
            hovered: lifecycle.is_hovered(),
            opacity: lifecycle.opacity(now_ms),
            visual: OrbVisual::derive(settings),
        }
    }
}
