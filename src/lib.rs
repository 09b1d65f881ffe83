pub mod detection;
pub mod models;
pub mod params;
pub mod render;

pub use detection::Detector;
pub use models::{Circle, DetectionResult};
pub use params::{HoughParams, HsvBand, MaskParams};

#[cfg(feature = "camera")]
pub mod camera;
