use serde::{Deserialize, Serialize};

use crate::Vector2;

/// An axis-aligned bounding box in source pixel space.
///
/// Serialized as `[x1, y1, x2, y2]`, the layout detectors emit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    /// Left edge, in px
    pub x1: f64,
    /// Top edge, in px
    pub y1: f64,
    /// Right edge, in px
    pub x2: f64,
    /// Bottom edge, in px
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Center of the box.
    pub fn center(&self) -> Vector2 {
        Vector2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Horizontal midpoint of the bottom edge, used as the ground contact point of a
    /// standing person.
    pub fn foot_point(&self) -> Vector2 {
        Vector2::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Vertical midpoint of the box.
    pub fn mid_y(&self) -> f64 {
        (self.y1 + self.y2) / 2.0
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Whether all coordinates are finite and the corners are ordered.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite()) && self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}
