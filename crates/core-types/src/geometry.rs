use serde::{Deserialize, Serialize};

/// Viewport-relative rectangle of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre point of the box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// A box with no area cannot be screenshotted or matched.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Whether width and height are each within `tolerance` (relative) of `reference`.
    pub fn similar_size(&self, reference: &BoundingBox, tolerance: f64) -> bool {
        relative_delta(self.width, reference.width) <= tolerance
            && relative_delta(self.height, reference.height) <= tolerance
    }
}

fn relative_delta(value: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return if value <= 0.0 { 0.0 } else { f64::INFINITY };
    }
    (value - reference).abs() / reference
}
