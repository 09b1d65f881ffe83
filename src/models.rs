use serde::{Deserialize, Serialize};

/// One detected circle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    /// Euclidean distance from this circle's center to a point.
    pub fn distance_from(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Everything found in one frame, strongest circle first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub width: u32,
    pub height: u32,
    pub circles: Vec<Circle>,
}

impl DetectionResult {
    /// Integer center of the frame, the reference point for distance reporting.
    pub fn frame_center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}
