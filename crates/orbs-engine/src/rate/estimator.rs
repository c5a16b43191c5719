//! Per-skill experience rate estimation
//!
//! ## Smoothing
//!
//! ```text
//! dt    = now - last_sample_time          (skip when dt < 250 ms)
//! inst  = (xp - last_sample_xp) / (dt / 3_600_000)
//! alpha = clamp(dt / (τ × 1000), 0, 1)    (τ = 30 s)
//! ema   = alpha × inst + (1 - alpha) × ema
//! ```
//!
//! A long gap pushes alpha to 1 so the estimate snaps to the fresh
//! instantaneous rate; rapid successive gains blend gently.
//!
//! ## Display rate
//!
//! The EMA when it is finite and positive, otherwise the whole-session
//! average, otherwise NaN.

use crate::rate::window::SampleWindow;
use orbs_common::{
    ExperienceTable, RateSource, SkillKey, EMA_TAU_SECONDS, MIN_SAMPLE_INTERVAL_MS, MS_PER_HOUR,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Outcome of one EMA update attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaUpdate {
    /// No sample anchor yet; the current values became the anchor
    Seeded,
    /// Less than the minimum interval since the last sample; nothing changed
    TooSoon,
    /// The sample anchor advanced but the instantaneous rate was not finite
    Advanced,
    /// The EMA absorbed a new instantaneous rate
    Updated,
}

/// Rate and progress state for one skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRateState {
    /// Stable identity
    pub skill_key: SkillKey,
    /// Latest total experience
    pub total_xp: f64,
    /// Latest level
    pub current_level: i32,
    /// Fraction of the current level completed, in [0, 1]
    pub progress_fraction: f64,
    /// Experience still needed for the next level
    pub xp_to_next_level: f64,
    /// Whether the skill is at the level cap
    pub maxed: bool,

    session_start_xp: Option<f64>,
    session_start_time_ms: Option<i64>,
    ema_xp_per_hour: Option<f64>,
    last_sample_xp: Option<f64>,
    last_sample_time_ms: Option<i64>,
    recent_samples: SampleWindow,
}

impl SkillRateState {
    /// Fresh state with no session yet
    pub fn new(skill_key: SkillKey) -> Self {
        Self {
            skill_key,
            total_xp: 0.0,
            current_level: 1,
            progress_fraction: 0.0,
            xp_to_next_level: 0.0,
            maxed: false,
            session_start_xp: None,
            session_start_time_ms: None,
            ema_xp_per_hour: None,
            last_sample_xp: None,
            last_sample_time_ms: None,
            recent_samples: SampleWindow::default(),
        }
    }

    /// Refresh level, progress and xp-to-next from the table
    pub fn apply_level(&mut self, table: &ExperienceTable, level: i32, total_xp: f64) {
        let progress = table.progress(level, total_xp);
        self.current_level = level;
        self.total_xp = total_xp;
        self.progress_fraction = progress.fraction;
        self.xp_to_next_level = progress.to_next;
        self.maxed = progress.maxed;
    }

    /// Record a strictly positive experience gain
    ///
    /// The first gain anchors the session at the value *before* the gain and
    /// seeds the sample anchor; the EMA stays undefined until a second sample
    /// arrives. Later gains feed [`Self::update_ema`].
    pub fn on_gain_observed(&mut self, observed_total_xp: f64, gain: f64, now_ms: i64) -> EmaUpdate {
        self.total_xp = observed_total_xp;

        let outcome = if self.session_start_time_ms.is_none() {
            self.session_start_time_ms = Some(now_ms);
            self.session_start_xp = Some(observed_total_xp - gain.max(0.0));
            self.last_sample_time_ms = Some(now_ms);
            self.last_sample_xp = Some(observed_total_xp);
            trace!(skill = %self.skill_key, "Session started");
            EmaUpdate::Seeded
        } else {
            self.update_ema(now_ms)
        };

        self.recent_samples.push(observed_total_xp, now_ms);
        outcome
    }

    /// Blend the current total into the EMA
    ///
    /// Called on every gain and by the periodic refresh. The minimum-interval
    /// guard makes near-simultaneous calls harmless.
    pub fn update_ema(&mut self, now_ms: i64) -> EmaUpdate {
        let (Some(last_ts), Some(last_xp)) = (self.last_sample_time_ms, self.last_sample_xp) else {
            self.last_sample_time_ms = Some(now_ms);
            self.last_sample_xp = Some(self.total_xp);
            return EmaUpdate::Seeded;
        };

        let dt_ms = now_ms - last_ts;
        if dt_ms < MIN_SAMPLE_INTERVAL_MS {
            return EmaUpdate::TooSoon;
        }

        let dxp = self.total_xp - last_xp;
        let hours = dt_ms as f64 / MS_PER_HOUR;
        let inst = if hours > 0.0 { dxp / hours } else { f64::NAN };
        let alpha = (dt_ms as f64 / (EMA_TAU_SECONDS * 1000.0)).clamp(0.0, 1.0);

        let outcome = if inst.is_finite() {
            self.ema_xp_per_hour = Some(match self.ema_xp_per_hour {
                Some(prev) => alpha * inst + (1.0 - alpha) * prev,
                None => inst,
            });
            EmaUpdate::Updated
        } else {
            EmaUpdate::Advanced
        };

        self.last_sample_time_ms = Some(now_ms);
        self.last_sample_xp = Some(self.total_xp);
        outcome
    }

    /// Display rate: EMA, then session average, then NaN
    pub fn effective_rate(&self, now_ms: i64) -> f64 {
        if let Some(ema) = self.ema_xp_per_hour {
            if ema.is_finite() && ema > 0.0 {
                return ema;
            }
        }
        self.session_average(now_ms)
    }

    /// Net gain since the session started, per hour (NaN when undefined)
    pub fn session_average(&self, now_ms: i64) -> f64 {
        let (Some(start_ts), Some(start_xp)) = (self.session_start_time_ms, self.session_start_xp)
        else {
            return f64::NAN;
        };

        let hours = (now_ms - start_ts) as f64 / MS_PER_HOUR;
        if hours <= 0.0 {
            return f64::NAN;
        }

        let gained = self.total_xp - start_xp;
        if gained <= 0.0 {
            return f64::NAN;
        }

        gained / hours
    }

    /// Net gain across the trailing sample window, per hour
    pub fn windowed_rate(&self, now_ms: i64) -> f64 {
        self.recent_samples.rate(now_ms)
    }

    /// Rate according to the configured source
    pub fn rate(&self, source: RateSource, now_ms: i64) -> f64 {
        match source {
            RateSource::Smoothed => self.effective_rate(now_ms),
            RateSource::Window => self.windowed_rate(now_ms),
        }
    }

    /// Seconds until the next level at `rate` xp/hour (NaN when unknown)
    pub fn time_to_level_seconds(&self, rate: f64) -> f64 {
        if self.maxed || !rate.is_finite() || rate <= 0.0 {
            return f64::NAN;
        }
        let to_next = self.xp_to_next_level.max(0.0);
        if to_next == 0.0 {
            return 0.0;
        }
        to_next * 3600.0 / rate
    }

    pub fn ema_xp_per_hour(&self) -> Option<f64> {
        self.ema_xp_per_hour
    }

    pub fn session_start_xp(&self) -> Option<f64> {
        self.session_start_xp
    }

    pub fn session_start_time_ms(&self) -> Option<i64> {
        self.session_start_time_ms
    }

    pub fn last_sample(&self) -> Option<(f64, i64)> {
        self.last_sample_xp.zip(self.last_sample_time_ms)
    }

    pub fn recent_samples(&self) -> &SampleWindow {
        &self.recent_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    fn state() -> SkillRateState {
        SkillRateState::new(SkillKey::new("mining"))
    }

    #[test]
    fn test_first_gain_seeds_without_rate() {
        let mut s = state();
        let outcome = s.on_gain_observed(150.0, 50.0, 1_000);

        assert_eq!(outcome, EmaUpdate::Seeded);
        assert_eq!(s.session_start_time_ms(), Some(1_000));
        assert_eq!(s.session_start_xp(), Some(100.0));
        assert_eq!(s.last_sample(), Some((150.0, 1_000)));
        assert!(s.ema_xp_per_hour().is_none());
        assert!(s.effective_rate(1_000).is_nan());
    }

    #[test]
    fn test_one_hour_thousand_xp() {
        let mut s = state();
        s.on_gain_observed(0.0, 0.0, 0);
        s.on_gain_observed(1000.0, 1000.0, HOUR_MS);

        let rate = s.effective_rate(HOUR_MS);
        assert!(rate.is_finite());
        assert!((rate - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_gains_inside_min_interval_are_ignored() {
        let mut s = state();
        s.on_gain_observed(100.0, 10.0, 0);
        s.on_gain_observed(200.0, 100.0, 10_000);
        let ema = s.ema_xp_per_hour();
        assert!(ema.is_some());

        let outcome = s.on_gain_observed(300.0, 100.0, 10_100);
        assert_eq!(outcome, EmaUpdate::TooSoon);
        assert_eq!(s.ema_xp_per_hour(), ema);
        // the anchor did not move either
        assert_eq!(s.last_sample(), Some((200.0, 10_000)));
    }

    #[test]
    fn test_alpha_blends_short_intervals() {
        let mut s = state();
        s.on_gain_observed(0.0, 0.0, 0);
        // 10 xp in 60 s -> 600 xp/h, alpha = 1
        s.on_gain_observed(10.0, 10.0, 60_000);
        assert!((s.ema_xp_per_hour().unwrap() - 600.0).abs() < 1e-9);

        // 0 xp over 3 s -> inst 0, alpha = 0.1
        s.total_xp = 10.0;
        assert_eq!(s.update_ema(63_000), EmaUpdate::Updated);
        assert!((s.ema_xp_per_hour().unwrap() - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_refresh_falls_back_to_session_average() {
        let mut s = state();
        s.on_gain_observed(100.0, 100.0, 0);
        // refresh with no new xp drives the EMA to zero
        s.update_ema(60_000);
        assert_eq!(s.ema_xp_per_hour(), Some(0.0));

        // 100 xp since start over 1 minute
        let rate = s.effective_rate(60_000);
        assert!((rate - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn test_session_average_degenerate() {
        let s = state();
        assert!(s.session_average(10).is_nan());

        let mut s = state();
        s.on_gain_observed(10.0, 0.0, 500);
        // zero net gain
        assert!(s.session_average(10_000).is_nan());
        // zero elapsed time
        let mut s = state();
        s.on_gain_observed(10.0, 5.0, 500);
        assert!(s.session_average(500).is_nan());
    }

    #[test]
    fn test_session_anchor_set_once() {
        let mut s = state();
        s.on_gain_observed(50.0, 50.0, 0);
        s.on_gain_observed(80.0, 30.0, 5_000);
        s.on_gain_observed(90.0, 10.0, 9_000);
        assert_eq!(s.session_start_time_ms(), Some(0));
        assert_eq!(s.session_start_xp(), Some(0.0));
    }

    #[test]
    fn test_time_to_level() {
        let table = ExperienceTable::standard();
        let mut s = state();
        s.apply_level(&table, 1, 49.0);
        assert_eq!(s.xp_to_next_level, 50.0);

        // 50 xp at 100 xp/h -> 30 minutes
        assert!((s.time_to_level_seconds(100.0) - 1800.0).abs() < 1e-9);
        assert!(s.time_to_level_seconds(f64::NAN).is_nan());
        assert!(s.time_to_level_seconds(0.0).is_nan());

        s.apply_level(&table, 100, 30_000_000.0);
        assert!(s.time_to_level_seconds(100.0).is_nan());
    }

    #[test]
    fn test_rate_source_selection() {
        let mut s = state();
        s.on_gain_observed(0.0, 0.0, 0);
        s.on_gain_observed(100.0, 100.0, 60_000);

        assert!((s.rate(RateSource::Window, 60_000) - 6000.0).abs() < 1e-6);
        assert!((s.rate(RateSource::Smoothed, 60_000) - 6000.0).abs() < 1e-6);
    }
}
