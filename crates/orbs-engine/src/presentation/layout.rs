//! Orb row geometry
//!
//! The row sits 6 px from the top of the canvas with an 8 px gap between
//! orbs. It is centered either on the whole canvas or on the part of the
//! canvas left of the compass.

use orbs_common::{OrbSettings, RowAlignment};
use serde::{Deserialize, Serialize};

/// Distance from the top of the canvas (px)
pub const ROW_TOP_PX: f64 = 6.0;
/// Horizontal gap between orbs (px)
pub const ROW_GAP_PX: f64 = 8.0;
/// Width reserved for the compass on the right edge (px)
pub const COMPASS_RIGHT_PX: f64 = 212.0;

/// Pointer position in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Edge-inclusive containment
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// Horizontal center of the row for a canvas width
pub fn row_center_x(alignment: RowAlignment, canvas_width: f64) -> f64 {
    match alignment {
        RowAlignment::WholeWindow => canvas_width / 2.0,
        RowAlignment::UpToCompass => (canvas_width - COMPASS_RIGHT_PX) / 2.0,
    }
}

/// Bounding boxes of `count` orbs, left to right
pub fn orb_boxes(count: usize, settings: &OrbSettings, canvas_width: f64) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let size = settings.orb_size;
    let row_width = count as f64 * size + (count - 1) as f64 * ROW_GAP_PX;
    let left = row_center_x(settings.alignment, canvas_width) - row_width / 2.0;

    (0..count)
        .map(|i| Rect::new(left + i as f64 * (size + ROW_GAP_PX), ROW_TOP_PX, size, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(30.1, 20.0)));
    }

    #[test]
    fn test_row_centered_on_canvas() {
        let settings = OrbSettings::default();
        let boxes = orb_boxes(2, &settings, 1000.0);
        // row width = 56 + 8 + 56 = 120, centered at 500
        assert_eq!(boxes[0].left, 440.0);
        assert_eq!(boxes[1].left, 504.0);
        assert_eq!(boxes[1].right(), 560.0);
        assert_eq!(boxes[0].top, ROW_TOP_PX);
    }

    #[test]
    fn test_row_up_to_compass() {
        let settings = OrbSettings {
            alignment: RowAlignment::UpToCompass,
            ..OrbSettings::default()
        };
        assert_eq!(row_center_x(settings.alignment, 1212.0), 500.0);
        let boxes = orb_boxes(1, &settings, 1212.0);
        assert_eq!(boxes[0].left, 472.0);
    }

    #[test]
    fn test_empty_row() {
        assert!(orb_boxes(0, &OrbSettings::default(), 800.0).is_empty());
    }
}
