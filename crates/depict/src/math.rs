use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::element::ContainFn;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// A `w` x `h` box anchored at the local origin.
    pub fn from_size(w: f32, h: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(w, h))
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Containment predicate for an element whose hit area is this rect.
    pub fn contain_fn(self) -> ContainFn {
        std::rc::Rc::new(move |x, y| self.contains(Vec2::new(x, y)))
    }
}

/// Containment predicate for a circle of `radius` centered at `center`.
pub fn contain_circle(center: Vec2, radius: f32) -> ContainFn {
    std::rc::Rc::new(move |x, y| Vec2::new(x, y).distance_squared(center) <= radius * radius)
}

/// SVG path of a rectangle outline.
pub fn rect_path(w: f32, h: f32) -> String {
    format!("M 0 0 h {w} v {h} h {} Z", -w)
}
