//! Click-or-drag classification for a single pointer-down to pointer-up.
//!
//! `Idle -> Pending` on down, `Pending -> Dragging` once the pointer travels past the threshold,
//! back to `Idle` on up. After a drag ends, clicks are swallowed for a short cool-down so the drag's
//! own release can't land as a click on whatever is under it.

use crate::core::Point;
use std::time::{Duration, Instant};
use tracing::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Dragging,
}

/// How a gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Down and up without passing the threshold
    Click,
    /// A click inside the post-drag cool-down, to be ignored
    SuppressedClick,
    /// The pointer passed the threshold before coming up
    Drag,
    /// Up without a matching down
    Stray,
}

#[derive(Debug, Clone, Copy)]
pub struct Gesture {
    phase: Phase,
    /// Where the gesture started, in world space
    start: Point,
    /// Where it started on screen
    start_screen: Point,
    cooldown_until: Option<Instant>,
}
impl Default for Gesture {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            start: Point::origin(),
            start_screen: Point::origin(),
            cooldown_until: None,
        }
    }
}
impl Gesture {
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn is_dragging(&self) -> bool {
        self.phase == Phase::Dragging
    }
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }
    pub fn start(&self) -> Point {
        self.start
    }
    pub fn start_screen(&self) -> Point {
        self.start_screen
    }

    pub fn down(&mut self, world: Point, screen: Point) {
        self.phase = Phase::Pending;
        self.start = world;
        self.start_screen = screen;
    }
    /// Track a move. Returns true on the move that turns the gesture into a drag.
    pub fn moved(&mut self, world: Point, threshold: f64) -> bool {
        if self.phase == Phase::Pending && (world - self.start).norm() > threshold {
            trace!(x = world.x, y = world.y, "gesture became a drag");
            self.phase = Phase::Dragging;
            true
        } else {
            false
        }
    }
    /// Finish the gesture. A release past the threshold counts as a drag even if no move event
    /// reported it.
    pub fn up(&mut self, world: Point, threshold: f64, now: Instant, cooldown: Duration) -> Release {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            Phase::Idle => Release::Stray,
            Phase::Dragging => {
                self.cooldown_until = now.checked_add(cooldown);
                Release::Drag
            }
            Phase::Pending if (world - self.start).norm() > threshold => {
                self.cooldown_until = now.checked_add(cooldown);
                Release::Drag
            }
            Phase::Pending => {
                if self.cooldown_until.is_some_and(|until| now < until) {
                    trace!("click suppressed after drag");
                    Release::SuppressedClick
                } else {
                    Release::Click
                }
            }
        }
    }
    /// Drop any gesture in progress. The cool-down survives.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}
