//! Pan and zoom. Screen coordinates map to world coordinates as `(screen - offset) / scale`.

use crate::core::{Point, Vector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset: Vector,
    pub scale: f64,
}
impl ViewTransform {
    pub fn new() -> Self {
        Self {
            offset: Vector::zeros(),
            scale: 1.0,
        }
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point::from((screen.coords - self.offset) / self.scale)
    }
    pub fn to_screen(&self, world: Point) -> Point {
        Point::from(world.coords * self.scale + self.offset)
    }

    /// Non-finite deltas are dropped
    pub fn pan_by(&mut self, delta: Vector) {
        if delta.iter().all(|c| c.is_finite()) {
            self.offset += delta;
        }
    }

    /// Change the scale while keeping the world point under `anchor` (in screen space) fixed.
    /// `scale` is clamped to `range` first, with the bounds taken in either order. Returns whether
    /// anything changed; non-finite input and unusable ranges leave the view alone.
    pub fn zoom_to(&mut self, anchor: Point, scale: f64, range: (f64, f64)) -> bool {
        if !scale.is_finite() || !anchor.coords.iter().all(|c| c.is_finite()) {
            return false;
        }
        let (min, max) = if range.0 <= range.1 {
            range
        } else {
            (range.1, range.0)
        };
        if !(min > 0.0 && max.is_finite()) {
            return false;
        }
        let scale = scale.clamp(min, max);
        if scale == self.scale {
            return false;
        }
        let ratio = scale / self.scale;
        self.offset = anchor.coords - (anchor.coords - self.offset) * ratio;
        self.scale = scale;
        true
    }
    /// Zoom one fixed step in (`steps > 0`) or out around `anchor`
    pub fn zoom_step(&mut self, anchor: Point, steps: f64, step: f64, range: (f64, f64)) -> bool {
        self.zoom_to(anchor, self.scale + steps * step, range)
    }
}
impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}
