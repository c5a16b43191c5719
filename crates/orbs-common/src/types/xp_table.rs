//! ExperienceTable - cumulative experience thresholds per level (1-100)
//!
//! The table is built once and never mutated. Lookups outside the table
//! degrade instead of failing:
//! - levels below 1 map to 0
//! - levels above 100 map to the level-100 threshold
//! - the span of a level is never smaller than 1

use crate::error::TableError;
use crate::MAX_LEVEL;
use serde::{Deserialize, Serialize};

/// Number of levels in the table
pub const LEVEL_COUNT: usize = MAX_LEVEL as usize;

/// Game experience thresholds, index 0 = level 1
const STANDARD_THRESHOLDS: [u32; LEVEL_COUNT] = [
    0, 99, 210, 333, 470, 622, 791, 978, 1185, 1414,
    1667, 1947, 2256, 2598, 2976, 3393, 3854, 4363, 4925, 5546,
    6232, 6989, 7825, 8749, 9769, 10896, 12141, 13516, 15035, 16713,
    18567, 20616, 22880, 25382, 28147, 31202, 34579, 38311, 42436, 46996,
    52037, 57609, 63769, 70579, 78108, 86433, 95637, 105814, 117067, 129510,
    143269, 158484, 175309, 193915, 214491, 237246, 262410, 290240, 321018, 355057,
    392703, 434338, 480386, 531315, 587643, 649943, 718848, 795059, 879351, 972582,
    1075701, 1189756, 1315908, 1455440, 1609773, 1780476, 1969287, 2178128, 2409124, 2664626,
    2947234, 3259825, 3605580, 3988019, 4411034, 4878932, 5396475, 5968931, 6602127, 7302510,
    8077208, 8934109, 9881935, 10930335, 12089982, 13372681, 14791491, 16360855, 18096750, 20016848,
];

/// Where a skill sits inside its current level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Level reported by the feed
    pub level: i32,
    /// Fraction of the level completed, always in [0, 1]
    pub fraction: f64,
    /// Experience still needed for the next level, never negative
    pub to_next: f64,
    /// Whether the skill is at the level cap
    pub maxed: bool,
}

/// Immutable level → cumulative experience mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceTable {
    thresholds: Vec<f64>,
}

impl Default for ExperienceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExperienceTable {
    /// The game's built-in table
    pub fn standard() -> Self {
        Self {
            thresholds: STANDARD_THRESHOLDS.iter().map(|&xp| xp as f64).collect(),
        }
    }

    /// Build a custom table; index 0 is level 1
    pub fn from_thresholds(thresholds: Vec<f64>) -> Result<Self, TableError> {
        if thresholds.len() != LEVEL_COUNT {
            return Err(TableError::WrongLength {
                expected: LEVEL_COUNT,
                actual: thresholds.len(),
            });
        }

        for (idx, value) in thresholds.iter().enumerate() {
            let level = idx as u32 + 1;
            if !value.is_finite() {
                return Err(TableError::NotFinite { level });
            }
            if idx > 0 && *value < thresholds[idx - 1] {
                return Err(TableError::NotMonotonic {
                    level,
                    value: *value,
                    prev_level: level - 1,
                    prev_value: thresholds[idx - 1],
                });
            }
        }

        Ok(Self { thresholds })
    }

    /// Cumulative experience needed to reach `level`
    #[inline]
    pub fn threshold_for(&self, level: i32) -> f64 {
        if level < 1 {
            return 0.0;
        }
        let idx = (level.min(MAX_LEVEL) - 1) as usize;
        self.thresholds.get(idx).copied().unwrap_or(0.0)
    }

    /// Experience width of `level`, floored at 1
    #[inline]
    pub fn span(&self, level: i32) -> f64 {
        (self.threshold_for(level.saturating_add(1)) - self.threshold_for(level)).max(1.0)
    }

    /// Progress of `total_xp` through `level`
    ///
    /// A skill at or above the level cap always reports a full ring and
    /// nothing left to earn.
    pub fn progress(&self, level: i32, total_xp: f64) -> LevelProgress {
        if level >= MAX_LEVEL {
            return LevelProgress {
                level,
                fraction: 1.0,
                to_next: 0.0,
                maxed: true,
            };
        }

        let floor = self.threshold_for(level);
        let next = self.threshold_for(level.saturating_add(1));
        let into = (total_xp - floor).max(0.0);
        let fraction = (into / self.span(level)).clamp(0.0, 1.0);

        LevelProgress {
            level,
            fraction: if fraction.is_nan() { 0.0 } else { fraction },
            to_next: (next - total_xp).max(0.0),
            maxed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_standard_endpoints() {
        let table = ExperienceTable::standard();
        assert_eq!(table.threshold_for(1), 0.0);
        assert_eq!(table.threshold_for(2), 99.0);
        assert_eq!(table.threshold_for(100), 20_016_848.0);
    }

    #[test]
    fn test_out_of_range_levels() {
        let table = ExperienceTable::standard();
        assert_eq!(table.threshold_for(0), 0.0);
        assert_eq!(table.threshold_for(-5), 0.0);
        assert_eq!(table.threshold_for(101), table.threshold_for(100));
        assert_eq!(table.threshold_for(i32::MAX), table.threshold_for(100));
    }

    #[test]
    fn test_span_floor_at_cap() {
        let table = ExperienceTable::standard();
        assert_eq!(table.span(100), 1.0);
        assert_eq!(table.span(1), 99.0);
    }

    #[test]
    fn test_progress_mid_level() {
        let table = ExperienceTable::standard();
        let p = table.progress(2, 154.5);
        assert!((p.fraction - 0.5).abs() < 1e-9);
        assert!((p.to_next - 55.5).abs() < 1e-9);
        assert!(!p.maxed);
    }

    #[test]
    fn test_progress_maxed_ignores_raw_xp() {
        let table = ExperienceTable::standard();
        let p = table.progress(100, 99_999_999.0);
        assert_eq!(p.fraction, 1.0);
        assert_eq!(p.to_next, 0.0);
        assert!(p.maxed);
    }

    #[test]
    fn test_progress_below_floor_clamps() {
        let table = ExperienceTable::standard();
        let p = table.progress(10, 5.0);
        assert_eq!(p.fraction, 0.0);
        assert_eq!(p.to_next, 1667.0 - 5.0);
    }

    #[test]
    fn test_from_thresholds_rejects_bad_tables() {
        assert!(matches!(
            ExperienceTable::from_thresholds(vec![0.0; 3]),
            Err(TableError::WrongLength { actual: 3, .. })
        ));

        let mut descending: Vec<f64> = (0..100).map(|l| l as f64 * 10.0).collect();
        descending[50] = 1.0;
        assert!(matches!(
            ExperienceTable::from_thresholds(descending),
            Err(TableError::NotMonotonic { level: 51, .. })
        ));

        let mut nan: Vec<f64> = (0..100).map(|l| l as f64).collect();
        nan[4] = f64::NAN;
        assert!(matches!(
            ExperienceTable::from_thresholds(nan),
            Err(TableError::NotFinite { level: 5 })
        ));
    }

    #[test]
    fn test_flat_table_uses_span_floor() {
        let table = ExperienceTable::from_thresholds(vec![0.0; 100]).unwrap();
        let p = table.progress(5, 0.0);
        assert_eq!(p.fraction, 0.0);
        assert_eq!(table.span(5), 1.0);
    }

    proptest! {
        #[test]
        fn prop_thresholds_non_decreasing(level in 1i32..100) {
            let table = ExperienceTable::standard();
            prop_assert!(table.threshold_for(level + 1) >= table.threshold_for(level));
        }

        #[test]
        fn prop_progress_bounded(level in -10i32..150, xp in -1.0e6f64..5.0e7) {
            let table = ExperienceTable::standard();
            let p = table.progress(level, xp);
            prop_assert!((0.0..=1.0).contains(&p.fraction));
            prop_assert!(p.to_next >= 0.0);
            if level >= 100 {
                prop_assert_eq!(p.fraction, 1.0);
                prop_assert_eq!(p.to_next, 0.0);
            }
        }
    }
}
