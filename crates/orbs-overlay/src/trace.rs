//! Session trace format
//!
//! One JSON object per line:
//!
//! ```text
//! {"at_ms": 1000, "event": {"type": "tick", "player": {...}}}
//! {"at_ms": 1200, "event": {"type": "pointer_move", "x": 640, "y": 30}}
//! {"at_ms": 9000, "event": {"type": "clear_all"}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use orbs_common::{OrbSettings, OrbsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;

/// One timestamped host event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub at_ms: i64,
    pub event: TraceEvent,
}

/// Host events the overlay reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Game tick carrying the player object
    Tick { player: Value },
    /// Skill id → name lookup (array or object)
    Names { lookup: Value },
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    /// Canvas resized
    Resize { width: f64 },
    /// Full settings snapshot
    Settings(OrbSettings),
    /// "Clear All Orbs" action
    ClearAll,
}

/// Parse a whole trace; records must be in non-decreasing time order
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceRecord>> {
    let mut records: Vec<TraceRecord> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record: TraceRecord = serde_json::from_str(trimmed).map_err(|e| OrbsError::Trace {
            line: line_no,
            reason: e.to_string(),
        })?;

        if let Some(prev) = records.last() {
            if record.at_ms < prev.at_ms {
                return Err(OrbsError::Trace {
                    line: line_no,
                    reason: format!("time went backwards ({} < {})", record.at_ms, prev.at_ms),
                });
            }
        }
        records.push(record);
    }

    Ok(records)
}
