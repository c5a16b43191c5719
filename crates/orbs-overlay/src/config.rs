//! Overlay host configuration
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `ORBS_` environment variables, nested with `__`
//!    (e.g. `ORBS_SETTINGS__FADE_SECONDS=12`, `ORBS_REPLAY__CANVAS_WIDTH=1920`)
//!
//! A `.env` file in the working directory is loaded first.

use orbs_common::{OrbSettings, OrbsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Overlay host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Initial widget settings
    pub settings: OrbSettings,
    /// Trace replay settings
    pub replay: ReplaySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl OverlayConfig {
    /// Load configuration from `.env`, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "Reading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("ORBS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| OrbsError::Config(e.to_string()))?;

        Ok(cfg.validated())
    }

    /// Clamp settings into range and reject unusable replay intervals
    pub fn validated(mut self) -> Self {
        self.settings = self.settings.sanitized(&OrbSettings::default());
        self.replay.refresh_interval_ms = self.replay.refresh_interval_ms.max(1);
        self.replay.frame_interval_ms = self.replay.frame_interval_ms.max(1);
        if !self.replay.canvas_width.is_finite() || self.replay.canvas_width < 0.0 {
            self.replay.canvas_width = ReplaySettings::default().canvas_width;
        }
        self
    }
}

/// How trace time maps onto the host clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayMode {
    /// Jump straight from one event to the next
    #[default]
    Virtual,
    /// Wait out the gaps between events on the tokio clock
    Realtime,
}

/// Trace replay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    pub mode: ReplayMode,
    /// Period of the stats refresh
    pub refresh_interval_ms: u64,
    /// Period of the timer/hover pump in realtime mode
    pub frame_interval_ms: u64,
    /// Canvas width used for layout and hit-testing
    pub canvas_width: f64,
    /// Keep running after the last event until every orb is gone
    pub drain: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            mode: ReplayMode::default(),
            refresh_interval_ms: orbs_common::STATS_REFRESH_MS as u64,
            frame_interval_ms: 16,
            canvas_width: 1280.0,
            drain: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Colored output
    pub ansi: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}
