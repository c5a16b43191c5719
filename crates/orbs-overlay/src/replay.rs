//! Trace replay drivers
//!
//! Both drivers feed trace events into an [`OrbRegistry`] and emit a
//! [`Frame`] whenever the visible state may have changed. The virtual driver
//! jumps between events and timer deadlines; the realtime driver runs the
//! feed, the 1-second refresh and the timer/hover pump on the tokio clock.

use crate::config::ReplaySettings;
use crate::trace::{TraceEvent, TraceRecord};
use orbs_common::{OrbsError, Result, SkillNames};
use orbs_engine::{
    Clock, LifecycleEvent, ManualClock, OrbProjection, OrbRegistry, PlayerSnapshot, Point,
    TickReport,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Registry shared between the realtime tasks
pub type SharedRegistry = Arc<Mutex<OrbRegistry>>;

/// What produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameReason {
    Event,
    Refresh,
    Timer,
    Hover,
}

/// Snapshot of every orb at one instant
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub at_ms: i64,
    pub reason: FrameReason,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<LifecycleEvent>,
    pub orbs: Vec<OrbProjection>,
}

impl Frame {
    fn capture(
        registry: &OrbRegistry,
        at_ms: i64,
        reason: FrameReason,
        events: Vec<LifecycleEvent>,
    ) -> Self {
        Self {
            at_ms,
            reason,
            events,
            orbs: registry.projections(at_ms),
        }
    }
}

/// Totals for a finished replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub records: usize,
    pub gains: usize,
    pub created: usize,
    pub faded: usize,
    pub removed: usize,
    pub frames: usize,
    pub end_ms: i64,
}

impl ReplaySummary {
    fn record(&mut self, report: &TickReport) {
        self.records += 1;
        self.gains += report.gains.len();
        self.created += report.created.len();
    }

    fn tally(&mut self, events: &[LifecycleEvent]) {
        for event in events {
            match event {
                LifecycleEvent::FadeStarted(_) => self.faded += 1,
                LifecycleEvent::Removed(_) => self.removed += 1,
            }
        }
    }
}

/// Dispatch one trace event to the registry
pub fn apply_event(registry: &mut OrbRegistry, event: &TraceEvent, now_ms: i64) -> TickReport {
    match event {
        TraceEvent::Tick { player } => {
            return registry.process_tick(&PlayerSnapshot::new(player), now_ms)
        }
        TraceEvent::Names { lookup } => {
            let names = SkillNames::from_lookup(lookup);
            debug!(count = names.len(), "Skill names updated");
            registry.set_names(names);
        }
        TraceEvent::PointerMove { x, y } => registry.pointer_moved(Point::new(*x, *y)),
        TraceEvent::PointerLeave => registry.pointer_left_window(now_ms),
        TraceEvent::Resize { width } => registry.set_canvas_width(*width),
        TraceEvent::Settings(settings) => {
            registry.apply_settings(settings.clone(), now_ms);
        }
        TraceEvent::ClearAll => {
            registry.clear_all();
        }
    }
    TickReport::default()
}

/// Write one frame as a JSON line
pub fn write_frame<W: Write + ?Sized>(out: &mut W, frame: &Frame) -> Result<()> {
    serde_json::to_writer(&mut *out, frame)?;
    out.write_all(b"\n")?;
    Ok(())
}

struct VirtualDriver<'r, F> {
    registry: &'r mut OrbRegistry,
    clock: ManualClock,
    refresh_ms: i64,
    next_refresh: i64,
    summary: ReplaySummary,
    emit: F,
}

impl<F> VirtualDriver<'_, F>
where
    F: FnMut(Frame) -> Result<()>,
{
    fn push(&mut self, frame: Frame) -> Result<()> {
        self.summary.frames += 1;
        (self.emit)(frame)
    }

    /// Run refreshes and timers up to and including `target_ms`
    fn run_until(&mut self, target_ms: i64) -> Result<()> {
        loop {
            let (at, is_timer) = match self.registry.next_deadline() {
                Some(deadline) if deadline <= self.next_refresh => (deadline, true),
                _ => (self.next_refresh, false),
            };
            if at > target_ms {
                return Ok(());
            }

            self.clock.set(at);
            let now = self.clock.now_ms();

            if is_timer {
                let events = self.registry.advance(now);
                self.summary.tally(&events);
                if !events.is_empty() {
                    let frame = Frame::capture(self.registry, now, FrameReason::Timer, events);
                    self.push(frame)?;
                }
            } else {
                self.registry.refresh(now);
                self.next_refresh += self.refresh_ms;
                if !self.registry.is_empty() {
                    let frame = Frame::capture(self.registry, now, FrameReason::Refresh, Vec::new());
                    self.push(frame)?;
                }
            }
        }
    }

    fn apply(&mut self, record: &TraceRecord) -> Result<()> {
        self.run_until(record.at_ms)?;
        self.clock.set(record.at_ms);
        let now = self.clock.now_ms();

        let report = apply_event(self.registry, &record.event, now);
        self.summary.record(&report);

        let reason = match self.registry.animation_frame(now) {
            Some(_) => FrameReason::Hover,
            None => FrameReason::Event,
        };
        let frame = Frame::capture(self.registry, now, reason, Vec::new());
        self.push(frame)
    }
}

/// Replay `records` on a virtual clock, calling `emit` for every frame
#[instrument(skip_all, fields(records = records.len()))]
pub fn replay_virtual<F>(
    registry: &mut OrbRegistry,
    records: &[TraceRecord],
    opts: &ReplaySettings,
    emit: F,
) -> Result<ReplaySummary>
where
    F: FnMut(Frame) -> Result<()>,
{
    let start = records.first().map_or(0, |r| r.at_ms);
    let refresh_ms = opts.refresh_interval_ms.max(1) as i64;
    registry.set_canvas_width(opts.canvas_width);

    let mut driver = VirtualDriver {
        registry,
        clock: ManualClock::new(start),
        refresh_ms,
        next_refresh: start + refresh_ms,
        summary: ReplaySummary::default(),
        emit,
    };

    for record in records {
        driver.apply(record)?;
    }

    if opts.drain {
        while let Some(deadline) = driver.registry.next_deadline() {
            driver.run_until(deadline)?;
        }
    }

    let mut summary = driver.summary;
    summary.end_ms = driver.clock.now_ms();
    info!(frames = summary.frames, end_ms = summary.end_ms, "Virtual replay finished");
    Ok(summary)
}

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Trace-time clock anchored to a tokio instant
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
    base_ms: i64,
}

impl TokioClock {
    pub fn new(base_ms: i64) -> Self {
        Self {
            origin: Instant::now(),
            base_ms,
        }
    }

    /// Instant at which trace time `at_ms` is reached
    ///
    /// Offsets past what `Instant` can represent saturate to a far-future
    /// instant.
    pub fn instant_for(&self, at_ms: i64) -> Instant {
        let offset = at_ms.saturating_sub(self.base_ms).max(0) as u64;
        self.origin
            .checked_add(Duration::from_millis(offset))
            .unwrap_or_else(|| self.origin + FAR_FUTURE)
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        self.base_ms + self.origin.elapsed().as_millis() as i64
    }
}

fn send(
    frames: &mpsc::UnboundedSender<Frame>,
    summary: &Mutex<ReplaySummary>,
    frame: Frame,
) -> Result<()> {
    summary.lock().frames += 1;
    frames
        .send(frame)
        .map_err(|_| OrbsError::Io("frame receiver closed".to_string()))
}

async fn feed_task(
    registry: SharedRegistry,
    records: Vec<TraceRecord>,
    clock: TokioClock,
    summary: Arc<Mutex<ReplaySummary>>,
    frames: mpsc::UnboundedSender<Frame>,
) -> Result<()> {
    for record in records {
        sleep_until(clock.instant_for(record.at_ms)).await;

        let frame = {
            let mut reg = registry.lock();
            let now = clock.now_ms();
            let report = apply_event(&mut reg, &record.event, now);
            summary.lock().record(&report);
            Frame::capture(&reg, now, FrameReason::Event, Vec::new())
        };
        send(&frames, &summary, frame)?;
    }
    debug!("Feed exhausted");
    Ok(())
}

/// Replay `records` against the tokio clock
///
/// Frames go to `frames`; the call returns once the feed is exhausted and,
/// when draining, no timer is pending any more.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn replay_realtime(
    registry: SharedRegistry,
    records: Vec<TraceRecord>,
    opts: ReplaySettings,
    frames: mpsc::UnboundedSender<Frame>,
) -> Result<ReplaySummary> {
    let clock = TokioClock::new(records.first().map_or(0, |r| r.at_ms));
    registry.lock().set_canvas_width(opts.canvas_width);
    let summary = Arc::new(Mutex::new(ReplaySummary::default()));

    let mut feed = tokio::spawn(feed_task(
        registry.clone(),
        records,
        clock,
        summary.clone(),
        frames.clone(),
    ));
    let mut feed_done = false;

    let mut refresh = interval(Duration::from_millis(opts.refresh_interval_ms.max(1)));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    refresh.tick().await;
    let mut pump = interval(Duration::from_millis(opts.frame_interval_ms.max(1)));
    pump.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            joined = &mut feed, if !feed_done => {
                feed_done = true;
                match joined {
                    Ok(result) => result?,
                    Err(e) => {
                        warn!(error = %e, "Feed task failed");
                        return Err(OrbsError::Io(format!("feed task failed: {}", e)));
                    }
                }
            }
            _ = refresh.tick() => {
                let frame = {
                    let mut reg = registry.lock();
                    let now = clock.now_ms();
                    reg.refresh(now);
                    (!reg.is_empty()).then(|| Frame::capture(&reg, now, FrameReason::Refresh, Vec::new()))
                };
                if let Some(frame) = frame {
                    send(&frames, &summary, frame)?;
                }
            }
            _ = pump.tick() => {
                let (frame, idle) = {
                    let mut reg = registry.lock();
                    let now = clock.now_ms();
                    let events = reg.advance(now);
                    let hovered = reg.animation_frame(now).is_some();
                    summary.lock().tally(&events);

                    let frame = if !events.is_empty() {
                        Some(Frame::capture(&reg, now, FrameReason::Timer, events))
                    } else if hovered {
                        Some(Frame::capture(&reg, now, FrameReason::Hover, Vec::new()))
                    } else {
                        None
                    };
                    (frame, reg.next_deadline().is_none())
                };
                if let Some(frame) = frame {
                    send(&frames, &summary, frame)?;
                }
                if feed_done && (!opts.drain || idle) {
                    break;
                }
            }
        }
    }

    let mut summary = summary.lock().clone();
    summary.end_ms = clock.now_ms();
    info!(frames = summary.frames, end_ms = summary.end_ms, "Realtime replay finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tick(at_ms: i64, xp: f64) -> TraceRecord {
        TraceRecord {
            at_ms,
            event: TraceEvent::Tick {
                player: json!({ "Skills": [{ "_skill": 7, "_level": 1, "_xp": xp }] }),
            },
        }
    }

    #[test]
    fn test_apply_event_dispatch() {
        let mut reg = OrbRegistry::default();
        apply_event(&mut reg, &TraceEvent::Names { lookup: json!({ "7": "cooking" }) }, 0);
        apply_event(&mut reg, &tick(0, 0.0).event, 0);
        let report = apply_event(&mut reg, &tick(0, 4.0).event, 10);
        assert_eq!(report.created.len(), 1);
        assert!(reg.get("cooking").is_some());

        apply_event(&mut reg, &TraceEvent::ClearAll, 20);
        assert!(reg.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_trace_jump_saturates() {
        let clock = TokioClock::new(0);
        let near = clock.instant_for(1_000);
        let far = clock.instant_for(i64::MAX);
        assert!(far > near);
        assert_eq!(clock.instant_for(i64::MIN), clock.instant_for(0));

        let shifted = TokioClock::new(-5);
        assert!(shifted.instant_for(i64::MAX) > shifted.instant_for(0));
    }

    #[test]
    fn test_virtual_emits_timer_frames() {
        let mut reg = OrbRegistry::default();
        let records = vec![tick(0, 0.0), tick(1_000, 12.0)];
        let mut frames = Vec::new();

        let summary = replay_virtual(&mut reg, &records, &ReplaySettings::default(), |f| {
            frames.push(f);
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.faded, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.end_ms, 6_260);
        assert_eq!(summary.frames, frames.len());

        let last = frames.last().unwrap();
        assert_eq!(last.reason, FrameReason::Timer);
        assert!(last.orbs.is_empty());
    }

    #[test]
    fn test_tokio_clock_offsets() {
        let clock = TokioClock::new(5_000);
        assert!(clock.instant_for(6_000) >= clock.instant_for(5_000));
        assert_eq!(clock.instant_for(1_000), clock.instant_for(5_000));
    }
}
