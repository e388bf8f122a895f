//! Pointer tracking and the swipe trail
//!
//! Each pointer move slices along the hop from the previous sample. Input that
//! arrives while the run isn't active is dropped, not queued.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::slice::SliceOutcome;
use super::state::GameState;
use crate::consts::{MAX_TRAIL_POINTS, TRAIL_FADE_MS};

/// Trail sample for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Host timestamp (ms)
    pub at_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    down: bool,
    last: Option<Vec2>,
    trail: VecDeque<TrailPoint>,
}

impl PointerTracker {
    pub fn is_down(&self) -> bool {
        self.down
    }

    pub fn last(&self) -> Option<Vec2> {
        self.last
    }

    pub fn trail(&self) -> impl Iterator<Item = &TrailPoint> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn release(&mut self) {
        self.down = false;
        self.last = None;
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    fn push_trail(&mut self, pos: Vec2, at_ms: f64) {
        self.trail.push_back(TrailPoint { pos, at_ms });
        if self.trail.len() > MAX_TRAIL_POINTS {
            self.trail.pop_front();
        }
    }

    /// Drop trail points older than the fade window
    pub fn prune_trail(&mut self, now_ms: f64) {
        while self
            .trail
            .front()
            .is_some_and(|p| now_ms - p.at_ms > TRAIL_FADE_MS)
        {
            self.trail.pop_front();
        }
    }
}

impl GameState {
    pub fn pointer_down(&mut self, pos: Vec2, at_ms: f64) {
        if !self.is_running() {
            return;
        }
        self.pointer.down = true;
        self.pointer.last = Some(pos);
        self.pointer.push_trail(pos, at_ms);
    }

    /// Slice along the hop from the previous sample to `pos`
    pub fn pointer_move(&mut self, pos: Vec2, at_ms: f64) -> SliceOutcome {
        if !self.pointer.down || !self.is_running() {
            return SliceOutcome::default();
        }
        let Some(prev) = self.pointer.last else {
            return SliceOutcome::default();
        };
        self.pointer.last = Some(pos);
        self.pointer.push_trail(pos, at_ms);
        self.slice(prev, pos)
    }

    pub fn pointer_up(&mut self) {
        self.pointer.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_capped_and_faded() {
        let mut tracker = PointerTracker::default();
        for i in 0..40 {
            tracker.push_trail(Vec2::new(i as f32, 0.0), i as f64 * 10.0);
        }
        assert_eq!(tracker.trail_len(), MAX_TRAIL_POINTS);

        // Newest point at t=390; anything before t=40 fades out
        tracker.prune_trail(390.0);
        assert!(tracker.trail().all(|p| 390.0 - p.at_ms <= TRAIL_FADE_MS));
        tracker.prune_trail(10_000.0);
        assert_eq!(tracker.trail_len(), 0);
    }

    #[test]
    fn test_release_forgets_last_sample() {
        let mut tracker = PointerTracker::default();
        tracker.down = true;
        tracker.last = Some(Vec2::ONE);
        tracker.release();
        assert!(!tracker.is_down());
        assert_eq!(tracker.last(), None);
    }
}
