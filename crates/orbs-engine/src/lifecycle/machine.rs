//! Orb fade lifecycle
//!
//! ```text
//!            activity (gain / hover-enter / hover-leave)
//!        ┌──────────────────────────────────────────────┐
//!        ▼                                              │
//!   ┌─────────┐  countdown expires   ┌─────────┐  removal deadline  ┌─────────┐
//!   │ Active  │ ───────────────────▶ │ Fading  │ ─────────────────▶ │ Removed │
//!   └─────────┘   (not hovered)      └─────────┘                    └─────────┘
//! ```
//!
//! While hovered no timer is armed. Hover-leave re-arms a full countdown.

use crate::lifecycle::timer::{TimerHandle, TimerQueue};
use orbs_common::{SkillKey, FADE_TRANSITION_MS, REMOVAL_GRACE_MS};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Lifecycle state of an orb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Visible; a fade countdown runs unless hovered
    Active,
    /// Fading out; removal deadline armed
    Fading,
    /// Discarded from the registry
    Removed,
}

/// Which lifecycle timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    FadeBegin,
    Remove,
}

/// Timer event addressed to one orb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbTimer {
    pub kind: TimerKind,
    pub key: SkillKey,
}

/// Per-orb lifecycle
#[derive(Debug, Clone)]
pub struct OrbLifecycle {
    state: LifecycleState,
    hovered: bool,
    fade_handle: Option<TimerHandle>,
    remove_handle: Option<TimerHandle>,
    last_activity_ms: i64,
    fade_started_ms: Option<i64>,
}

impl OrbLifecycle {
    /// New orb, Active with no countdown armed yet
    pub fn new(now_ms: i64) -> Self {
        Self {
            state: LifecycleState::Active,
            hovered: false,
            fade_handle: None,
            remove_handle: None,
            last_activity_ms: now_ms,
            fade_started_ms: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_fading(&self) -> bool {
        self.state == LifecycleState::Fading
    }

    pub fn last_activity_ms(&self) -> i64 {
        self.last_activity_ms
    }

    pub fn fade_handle(&self) -> Option<TimerHandle> {
        self.fade_handle
    }

    pub fn remove_handle(&self) -> Option<TimerHandle> {
        self.remove_handle
    }

    /// Activity: cancel pending timers, return to Active, re-arm the countdown
    ///
    /// The countdown is not armed while the pointer is over the orb.
    pub fn reset(
        &mut self,
        key: &SkillKey,
        timers: &mut TimerQueue<OrbTimer>,
        fade_ms: i64,
        now_ms: i64,
    ) {
        self.last_activity_ms = now_ms;
        self.cancel_timers(timers);
        self.stop_fading();

        if !self.hovered {
            self.fade_handle = Some(timers.schedule(
                now_ms,
                fade_ms,
                OrbTimer {
                    kind: TimerKind::FadeBegin,
                    key: key.clone(),
                },
            ));
        }
    }

    /// Pointer entered: suspend the countdown and any fade in progress
    pub fn hover_enter(&mut self, timers: &mut TimerQueue<OrbTimer>, now_ms: i64) {
        self.hovered = true;
        self.last_activity_ms = now_ms;
        self.cancel_timers(timers);
        self.stop_fading();
    }

    /// Pointer left: full countdown reset
    pub fn hover_leave(
        &mut self,
        key: &SkillKey,
        timers: &mut TimerQueue<OrbTimer>,
        fade_ms: i64,
        now_ms: i64,
    ) {
        self.hovered = false;
        self.reset(key, timers, fade_ms, now_ms);
    }

    /// Countdown expired; start fading if `handle` is still the live countdown
    pub fn begin_fade(
        &mut self,
        key: &SkillKey,
        timers: &mut TimerQueue<OrbTimer>,
        handle: TimerHandle,
        now_ms: i64,
    ) -> bool {
        if self.fade_handle != Some(handle) || self.hovered || self.state != LifecycleState::Active
        {
            trace!(skill = %key, "Stale fade timer ignored");
            return false;
        }

        self.fade_handle = None;
        self.state = LifecycleState::Fading;
        self.fade_started_ms = Some(now_ms);
        self.remove_handle = Some(timers.schedule(
            now_ms,
            REMOVAL_GRACE_MS,
            OrbTimer {
                kind: TimerKind::Remove,
                key: key.clone(),
            },
        ));
        true
    }

    /// Whether a fired removal timer may delete this orb
    ///
    /// The orb must still be fading and `handle` must be its current removal
    /// timer; a cancelled-but-queued callback fails this check.
    pub fn should_remove(&self, handle: TimerHandle) -> bool {
        self.state == LifecycleState::Fading && self.remove_handle == Some(handle)
    }

    /// Terminal transition; cancels anything still pending
    pub fn mark_removed(&mut self, timers: &mut TimerQueue<OrbTimer>) {
        self.cancel_timers(timers);
        self.state = LifecycleState::Removed;
        self.fade_started_ms = None;
    }

    /// Opacity of the orb at `now_ms` (1 while Active, ramps to 0 while Fading)
    pub fn opacity(&self, now_ms: i64) -> f64 {
        match (self.state, self.fade_started_ms) {
            (LifecycleState::Fading, Some(started)) => {
                let elapsed = (now_ms - started).max(0) as f64;
                (1.0 - elapsed / FADE_TRANSITION_MS as f64).clamp(0.0, 1.0)
            }
            (LifecycleState::Removed, _) => 0.0,
            _ => 1.0,
        }
    }

    fn cancel_timers(&mut self, timers: &mut TimerQueue<OrbTimer>) {
        if let Some(h) = self.fade_handle.take() {
            timers.cancel(h);
        }
        if let Some(h) = self.remove_handle.take() {
            timers.cancel(h);
        }
    }

    fn stop_fading(&mut self) {
        if self.state == LifecycleState::Fading {
            self.state = LifecycleState::Active;
            self.fade_started_ms = None;
        }
    }
}
