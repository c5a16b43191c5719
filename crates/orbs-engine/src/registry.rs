//! Orb registry and tick orchestration
//!
//! The registry exclusively owns every per-skill record. Records are created
//! on the first observed gain for a skill and destroyed when their fade
//! completes. Display order is creation order.

use crate::feed::SkillSource;
use crate::hover::{HoverTracker, HoverTransition};
use crate::lifecycle::{LifecycleState, OrbLifecycle, OrbTimer, TimerKind, TimerQueue};
use crate::presentation::layout::{orb_boxes, Point, Rect};
use crate::presentation::OrbProjection;
use crate::rate::{EmaUpdate, SkillRateState};
use orbs_common::{
    ExperienceTable, OrbSettings, SettingsChange, SkillKey, SkillNames, SkillObservation,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace};

/// One skill's rate state and lifecycle
#[derive(Debug, Clone)]
pub struct OrbRecord {
    pub rate: SkillRateState,
    pub lifecycle: OrbLifecycle,
}

/// Lifecycle milestones reported to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "skill", rename_all = "snake_case")]
pub enum LifecycleEvent {
    FadeStarted(SkillKey),
    Removed(SkillKey),
}

/// Result of processing one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Skills that gained experience, in feed order
    pub gains: Vec<SkillKey>,
    /// Skills whose orb was created by this tick
    pub created: Vec<SkillKey>,
}

/// Owner of all orb state
#[derive(Debug)]
pub struct OrbRegistry {
    table: ExperienceTable,
    names: SkillNames,
    settings: OrbSettings,
    orbs: HashMap<SkillKey, OrbRecord>,
    order: Vec<SkillKey>,
    prev_xp: HashMap<SkillKey, f64>,
    timers: TimerQueue<OrbTimer>,
    hover: HoverTracker,
    canvas_width: f64,
}

impl Default for OrbRegistry {
    fn default() -> Self {
        Self::new(OrbSettings::default())
    }
}

impl OrbRegistry {
    /// Create a registry with the standard experience table
    pub fn new(settings: OrbSettings) -> Self {
        let settings = settings.sanitized(&OrbSettings::default());
        Self {
            table: ExperienceTable::standard(),
            names: SkillNames::new(),
            settings,
            orbs: HashMap::new(),
            order: Vec::new(),
            prev_xp: HashMap::new(),
            timers: TimerQueue::new(),
            hover: HoverTracker::new(),
            canvas_width: 0.0,
        }
    }

    /// Use a custom experience table
    pub fn with_table(mut self, table: ExperienceTable) -> Self {
        self.table = table;
        self
    }

    /// Use a skill-name lookup
    pub fn with_names(mut self, names: SkillNames) -> Self {
        self.names = names;
        self
    }

    pub fn set_names(&mut self, names: SkillNames) {
        self.names = names;
    }

    /// Canvas width used for row layout and hover hit-testing
    pub fn set_canvas_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 {
            self.canvas_width = width;
        }
    }

    /// Process one game tick from any skill source
    pub fn process_tick<S: SkillSource + ?Sized>(&mut self, source: &S, now_ms: i64) -> TickReport {
        let observations = source.observations();
        self.observe(&observations, now_ms)
    }

    /// Diff observations against the previous tick and feed every gain
    ///
    /// The first value seen for a skill only primes its previous value.
    /// Non-positive deltas are ignored without touching any state, and
    /// non-finite totals are skipped outright.
    #[instrument(skip(self, observations), fields(count = observations.len()))]
    pub fn observe(&mut self, observations: &[SkillObservation], now_ms: i64) -> TickReport {
        let mut report = TickReport::default();
        if !self.settings.enabled {
            return report;
        }

        let fade_ms = self.settings.fade_ms();

        for obs in observations {
            if !obs.total_xp.is_finite() {
                continue;
            }
            let key = self.names.key_for(obs.skill_id);
            let previous = self
                .prev_xp
                .insert(key.clone(), obs.total_xp)
                .unwrap_or(obs.total_xp);

            let delta = obs.total_xp - previous;
            if delta <= 0.0 {
                continue;
            }

            if !self.orbs.contains_key(&key) {
                self.orbs.insert(
                    key.clone(),
                    OrbRecord {
                        rate: SkillRateState::new(key.clone()),
                        lifecycle: OrbLifecycle::new(now_ms),
                    },
                );
                self.order.push(key.clone());
                debug!(skill = %key, "Orb created");
                report.created.push(key.clone());
            }

            if let Some(record) = self.orbs.get_mut(&key) {
                record.rate.apply_level(&self.table, obs.level, obs.total_xp);
                record.rate.on_gain_observed(obs.total_xp, delta, now_ms);
                record.lifecycle.reset(&key, &mut self.timers, fade_ms, now_ms);
                trace!(skill = %key, delta, level = obs.level, "Gain observed");
            }

            report.gains.push(key);
        }

        report
    }

    /// Periodic refresh: decay every EMA toward the current totals
    pub fn refresh(&mut self, now_ms: i64) -> usize {
        self.orbs
            .values_mut()
            .map(|record| record.rate.update_ema(now_ms))
            .filter(|outcome| *outcome == EmaUpdate::Updated)
            .count()
    }

    /// Fire every timer due at `now_ms`
    ///
    /// Each timer runs at its own deadline, so a removal armed by a fade that
    /// fires here is itself due within the same call when `now_ms` is late
    /// enough.
    pub fn advance(&mut self, now_ms: i64) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();

        while let Some((handle, deadline, timer)) = self.timers.pop_due(now_ms) {
            match timer.kind {
                TimerKind::FadeBegin => {
                    let Some(record) = self.orbs.get_mut(&timer.key) else {
                        trace!(skill = %timer.key, "Fade timer for missing orb");
                        continue;
                    };
                    if record
                        .lifecycle
                        .begin_fade(&timer.key, &mut self.timers, handle, deadline)
                    {
                        debug!(skill = %timer.key, "Orb fading");
                        events.push(LifecycleEvent::FadeStarted(timer.key));
                    }
                }
                TimerKind::Remove => {
                    let still_fading = self
                        .orbs
                        .get(&timer.key)
                        .is_some_and(|record| record.lifecycle.should_remove(handle));
                    if still_fading {
                        self.remove(&timer.key);
                        debug!(skill = %timer.key, "Orb removed");
                        events.push(LifecycleEvent::Removed(timer.key));
                    } else {
                        trace!(skill = %timer.key, "Stale removal timer ignored");
                    }
                }
            }
        }

        events
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<i64> {
        self.timers.next_deadline()
    }

    /// Record a pointer move; evaluated on the next animation frame
    pub fn pointer_moved(&mut self, p: Point) {
        self.hover.pointer_moved(p);
    }

    /// Evaluate the coalesced pointer position against the orb boxes
    pub fn animation_frame(&mut self, now_ms: i64) -> Option<HoverTransition> {
        let boxes = orb_boxes(self.order.len(), &self.settings, self.canvas_width);
        let transition = self.hover.resolve(self.order.iter().zip(boxes))?;

        let fade_ms = self.settings.fade_ms();
        if let Some(left) = &transition.left {
            if let Some(record) = self.orbs.get_mut(left) {
                record.lifecycle.hover_leave(left, &mut self.timers, fade_ms, now_ms);
            }
        }
        if let Some(entered) = &transition.entered {
            if let Some(record) = self.orbs.get_mut(entered) {
                record.lifecycle.hover_enter(&mut self.timers, now_ms);
            }
        }

        Some(transition)
    }

    /// Pointer left the game window
    pub fn pointer_left_window(&mut self, now_ms: i64) {
        let Some(prev) = self.hover.pointer_left() else {
            return;
        };
        let fade_ms = self.settings.fade_ms();
        if let Some(record) = self.orbs.get_mut(&prev) {
            record.lifecycle.hover_leave(&prev, &mut self.timers, fade_ms, now_ms);
        }
    }

    /// Apply a new settings snapshot
    ///
    /// Only what changed is re-applied: a fade change re-arms every countdown,
    /// disabling drops all state. Row visibility, size and alignment are
    /// derived from the live settings at projection and layout time.
    #[instrument(skip(self, next))]
    pub fn apply_settings(&mut self, next: OrbSettings, now_ms: i64) -> SettingsChange {
        let next = next.sanitized(&self.settings);
        let change = self.settings.diff(&next);
        if change.is_empty() {
            return change;
        }
        self.settings = next;

        match change.enabled {
            Some(false) => self.stop(),
            Some(true) => info!("Skill orbs enabled"),
            None => {}
        }

        if change.fade {
            self.reset_all_fades(now_ms);
        }

        debug!(
            rows = change.rows,
            size = change.size,
            icon = change.icon,
            fade = change.fade,
            alignment = change.alignment,
            rate_source = change.rate_source,
            "Settings applied"
        );
        change
    }

    /// Re-arm every orb's countdown with the current fade duration
    pub fn reset_all_fades(&mut self, now_ms: i64) {
        let fade_ms = self.settings.fade_ms();
        for key in &self.order {
            if let Some(record) = self.orbs.get_mut(key) {
                record.lifecycle.reset(key, &mut self.timers, fade_ms, now_ms);
            }
        }
    }

    /// Remove every orb; previous xp values are kept so nothing re-triggers
    pub fn clear_all(&mut self) -> usize {
        let keys = std::mem::take(&mut self.order);
        let count = keys.len();
        for key in &keys {
            self.remove(key);
        }
        self.hover.clear();
        info!(count, "Cleared all orbs");
        count
    }

    /// Drop all orbs and forget every previous xp value
    pub fn stop(&mut self) {
        self.clear_all();
        self.prev_xp.clear();
        self.timers.clear();
        info!("Skill orbs stopped");
    }

    fn remove(&mut self, key: &SkillKey) {
        if let Some(mut record) = self.orbs.remove(key) {
            record.lifecycle.mark_removed(&mut self.timers);
        }
        self.order.retain(|k| k != key);
        self.hover.forget(key);
    }

    /// Projections for every orb in display order
    pub fn projections(&self, now_ms: i64) -> Vec<OrbProjection> {
        self.order
            .iter()
            .filter_map(|key| self.projection(key.as_str(), now_ms))
            .collect()
    }

    pub fn projection(&self, key: &str, now_ms: i64) -> Option<OrbProjection> {
        self.orbs
            .get(key)
            .map(|record| OrbProjection::build(&record.rate, &record.lifecycle, &self.settings, now_ms))
    }

    /// Screen boxes for every orb in display order
    pub fn boxes(&self) -> Vec<(SkillKey, Rect)> {
        let boxes = orb_boxes(self.order.len(), &self.settings, self.canvas_width);
        self.order.iter().cloned().zip(boxes).collect()
    }

    pub fn get(&self, key: &str) -> Option<&OrbRecord> {
        self.orbs.get(key)
    }

    /// Lifecycle state; absent orbs report `Removed`
    pub fn state_of(&self, key: &str) -> LifecycleState {
        self.orbs
            .get(key)
            .map(|record| record.lifecycle.state())
            .unwrap_or(LifecycleState::Removed)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SkillKey> {
        self.order.iter()
    }

    pub fn hovered(&self) -> Option<&SkillKey> {
        self.hover.hovered()
    }

    pub fn previous_xp(&self, key: &str) -> Option<f64> {
        self.prev_xp.get(key).copied()
    }

    pub fn settings(&self) -> &OrbSettings {
        &self.settings
    }

    pub fn table(&self) -> &ExperienceTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.orbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbs.is_empty()
    }
}
