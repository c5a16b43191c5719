//! Pointer hover tracking
//!
//! Pointer moves are coalesced: only the latest position is kept, and it is
//! tested against the orb boxes once per animation frame. Only one orb is
//! hovered at a time; with overlapping boxes the first in display order wins.

use crate::presentation::layout::{Point, Rect};
use orbs_common::SkillKey;

/// Change of hovered orb produced by one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverTransition {
    /// Orb the pointer left, if any
    pub left: Option<SkillKey>,
    /// Orb the pointer entered, if any
    pub entered: Option<SkillKey>,
}

/// Coalescing hover tracker
#[derive(Debug, Default)]
pub struct HoverTracker {
    pending: Option<Point>,
    hovered: Option<SkillKey>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move; replaces any move not yet evaluated
    pub fn pointer_moved(&mut self, p: Point) {
        self.pending = Some(p);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn hovered(&self) -> Option<&SkillKey> {
        self.hovered.as_ref()
    }

    /// Evaluate the pending move against `boxes` (display order)
    ///
    /// Returns `None` when there was no pending move or the hovered orb did
    /// not change.
    pub fn resolve<'a, I>(&mut self, boxes: I) -> Option<HoverTransition>
    where
        I: IntoIterator<Item = (&'a SkillKey, Rect)>,
    {
        let p = self.pending.take()?;
        let hit = boxes
            .into_iter()
            .find(|(_, rect)| rect.contains(p))
            .map(|(key, _)| key.clone());

        if hit == self.hovered {
            return None;
        }

        let left = std::mem::replace(&mut self.hovered, hit.clone());
        Some(HoverTransition { left, entered: hit })
    }

    /// Pointer left the window; returns the orb that was hovered
    pub fn pointer_left(&mut self) -> Option<SkillKey> {
        self.pending = None;
        self.hovered.take()
    }

    /// Drop the hover if `key` was hovered (orb removed)
    pub fn forget(&mut self, key: &SkillKey) {
        if self.hovered.as_ref() == Some(key) {
            self.hovered = None;
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.hovered = None;
    }
}
