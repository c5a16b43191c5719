//! OrbSettings - user-facing configuration snapshot
//!
//! Settings are plain data. A change is applied by comparing the previous and
//! next snapshots with [`OrbSettings::diff`] and re-deriving only what the
//! resulting [`SettingsChange`] names.

use serde::{Deserialize, Serialize};

/// Default fade countdown
pub const DEFAULT_FADE_SECONDS: f64 = 5.0;
/// Shortest allowed fade countdown
pub const MIN_FADE_SECONDS: f64 = 1.0;
/// Longest allowed fade countdown
pub const MAX_FADE_SECONDS: f64 = 600.0;

/// Default orb diameter (px)
pub const DEFAULT_ORB_SIZE: f64 = 56.0;
/// Smallest orb diameter (px)
pub const MIN_ORB_SIZE: f64 = 36.0;
/// Largest orb diameter (px)
pub const MAX_ORB_SIZE: f64 = 96.0;

/// Default icon scaling (% of the inner core)
pub const DEFAULT_ICON_SCALE_PCT: f64 = 80.0;
/// Smallest icon scaling accepted
pub const MIN_ICON_SCALE_PCT: f64 = 50.0;
/// Largest icon scaling accepted
pub const MAX_ICON_SCALE_PCT: f64 = 90.0;

/// Horizontal anchoring of the orb row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAlignment {
    /// Centered on the whole game canvas
    #[default]
    WholeWindow,
    /// Centered on the canvas area left of the compass
    UpToCompass,
}

/// Which estimate feeds the XP/hr and time-to-level figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Time-adaptive EMA with session-average fallback
    #[default]
    Smoothed,
    /// Net gain across the trailing 5-minute sample window
    Window,
}

/// Tooltip rows that can be toggled independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatRows {
    pub show_current_xp: bool,
    pub show_xp_to_level: bool,
    pub show_time_to_level: bool,
    pub show_xp_hr: bool,
}

impl Default for StatRows {
    fn default() -> Self {
        Self {
            show_current_xp: true,
            show_xp_to_level: true,
            show_time_to_level: true,
            show_xp_hr: true,
        }
    }
}

/// Overlay settings snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbSettings {
    /// Master switch; disabling drops every orb
    pub enabled: bool,
    /// Idle seconds before an orb starts fading (1-600)
    pub fade_seconds: f64,
    /// Orb diameter in px (36-96)
    pub orb_size: f64,
    /// Icon size as a percentage of the inner core (50-90)
    pub icon_scaling_percent: f64,
    /// Tooltip row toggles
    pub rows: StatRows,
    /// Row anchoring
    pub alignment: RowAlignment,
    /// Rate estimate used for display
    pub rate_source: RateSource,
}

impl Default for OrbSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fade_seconds: DEFAULT_FADE_SECONDS,
            orb_size: DEFAULT_ORB_SIZE,
            icon_scaling_percent: DEFAULT_ICON_SCALE_PCT,
            rows: StatRows::default(),
            alignment: RowAlignment::default(),
            rate_source: RateSource::default(),
        }
    }
}

/// What a settings update touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsChange {
    /// `Some(new)` when the master switch flipped
    pub enabled: Option<bool>,
    /// Row visibility must be re-derived
    pub rows: bool,
    /// Orb scale must be recomputed
    pub size: bool,
    /// Icon scale must be recomputed
    pub icon: bool,
    /// Fade countdowns must be re-armed
    pub fade: bool,
    /// Row anchor moved
    pub alignment: bool,
    /// Rate source switched
    pub rate_source: bool,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl OrbSettings {
    /// Bring out-of-range values back into their allowed ranges
    ///
    /// Fade and size are clamped. Icon scaling outside its range is refused and
    /// the value from `previous` is kept. Non-finite numbers fall back to
    /// `previous` as well.
    pub fn sanitized(mut self, previous: &OrbSettings) -> Self {
        self.fade_seconds = if self.fade_seconds.is_finite() {
            self.fade_seconds.clamp(MIN_FADE_SECONDS, MAX_FADE_SECONDS)
        } else {
            previous.fade_seconds
        };

        self.orb_size = if self.orb_size.is_finite() {
            self.orb_size.clamp(MIN_ORB_SIZE, MAX_ORB_SIZE)
        } else {
            previous.orb_size
        };

        if !(MIN_ICON_SCALE_PCT..=MAX_ICON_SCALE_PCT).contains(&self.icon_scaling_percent) {
            self.icon_scaling_percent = previous.icon_scaling_percent;
        }

        self
    }

    /// Fade countdown in milliseconds
    #[inline]
    pub fn fade_ms(&self) -> i64 {
        (self.fade_seconds * 1000.0).round() as i64
    }

    /// Classify the difference between `self` and `next`
    pub fn diff(&self, next: &OrbSettings) -> SettingsChange {
        SettingsChange {
            enabled: (self.enabled != next.enabled).then_some(next.enabled),
            rows: self.rows != next.rows,
            size: self.orb_size != next.orb_size,
            icon: self.icon_scaling_percent != next.icon_scaling_percent
                || self.orb_size != next.orb_size,
            fade: self.fade_seconds != next.fade_seconds,
            alignment: self.alignment != next.alignment,
            rate_source: self.rate_source != next.rate_source,
        }
    }
}
