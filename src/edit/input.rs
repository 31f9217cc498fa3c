use crate::core::Point;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// The pointer left the drawing surface
    Leave,
    /// Scroll wheel, negative `delta` zooms in
    Wheel { delta: f64 },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}
impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

/// One pointer event, positioned in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Point,
    pub modifiers: Modifiers,
    pub time: Instant,
}
impl PointerEvent {
    pub fn new(kind: PointerKind, pos: Point, time: Instant) -> Self {
        Self {
            kind,
            pos,
            modifiers: Modifiers::NONE,
            time,
        }
    }
    pub fn down(x: f64, y: f64, time: Instant) -> Self {
        Self::new(PointerKind::Down, Point::new(x, y), time)
    }
    pub fn moved(x: f64, y: f64, time: Instant) -> Self {
        Self::new(PointerKind::Move, Point::new(x, y), time)
    }
    pub fn up(x: f64, y: f64, time: Instant) -> Self {
        Self::new(PointerKind::Up, Point::new(x, y), time)
    }
    pub fn leave(time: Instant) -> Self {
        Self::new(PointerKind::Leave, Point::origin(), time)
    }
    pub fn wheel(x: f64, y: f64, delta: f64, time: Instant) -> Self {
        Self::new(PointerKind::Wheel { delta }, Point::new(x, y), time)
    }
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
