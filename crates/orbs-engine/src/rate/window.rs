//! Trailing sample window
//!
//! Keeps `(xp, timestamp)` pairs for at most [`SAMPLE_RETENTION_MS`] and
//! derives a rate from the net gain across the retained span.

use orbs_common::{MS_PER_HOUR, SAMPLE_RETENTION_MS};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One retained experience sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Total experience at sample time
    pub xp: f64,
    /// Sample timestamp (Unix millis)
    pub at_ms: i64,
}

/// Ordered samples, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    retention_ms: i64,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(SAMPLE_RETENTION_MS)
    }
}

impl SampleWindow {
    pub fn new(retention_ms: i64) -> Self {
        Self {
            samples: VecDeque::new(),
            retention_ms,
        }
    }

    /// Append a sample and drop everything older than the window
    pub fn push(&mut self, xp: f64, at_ms: i64) {
        self.samples.push_back(Sample { xp, at_ms });
        self.prune(at_ms);
    }

    /// Drop samples older than `now_ms - retention`
    pub fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.retention_ms;
        while self.samples.front().is_some_and(|s| s.at_ms < cutoff) {
            self.samples.pop_front();
        }
    }

    /// Net experience per hour across the retained samples
    ///
    /// Samples that would be pruned at `now_ms` are ignored. Returns 0 with
    /// fewer than two samples or no elapsed time between them.
    pub fn rate(&self, now_ms: i64) -> f64 {
        let cutoff = now_ms - self.retention_ms;
        let mut live = self.samples.iter().filter(|s| s.at_ms >= cutoff);

        let Some(first) = live.next() else {
            return 0.0;
        };
        let Some(last) = live.last() else {
            return 0.0;
        };
        if last.at_ms <= first.at_ms {
            return 0.0;
        }

        (last.xp - first.xp) / (last.at_ms - first.at_ms) as f64 * MS_PER_HOUR
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}
