use serde::{Deserialize, Serialize};

/// Inclusive HSV box using OpenCV channel ranges: hue in [0, 180),
/// saturation and value in [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBand {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
}

impl HsvBand {
    /// Wide warm band from red through yellow-green, tolerant of dark pixels.
    pub const WARM_WIDE: Self = Self {
        hue_min: 0,
        hue_max: 90,
        sat_min: 70,
        sat_max: 255,
        val_min: 6,
        val_max: 255,
    };

    /// Narrow band for saturated orange and yellow objects.
    pub const ORANGE_YELLOW: Self = Self {
        hue_min: 5,
        hue_max: 30,
        sat_min: 70,
        sat_max: 255,
        val_min: 20,
        val_max: 255,
    };

    /// True if the HSV triple lies inside all three channel intervals.
    pub fn contains(&self, hue: u8, sat: u8, val: u8) -> bool {
        self.hue_min <= hue
            && hue <= self.hue_max
            && self.sat_min <= sat
            && sat <= self.sat_max
            && self.val_min <= val
            && val <= self.val_max
    }
}

impl Default for HsvBand {
    fn default() -> Self {
        Self::WARM_WIDE
    }
}

/// Default minimum blob area for still images.
pub const IMAGE_MIN_BLOB_AREA: u32 = 200;

/// Default minimum blob area for camera frames, which are smaller and noisier.
pub const CAMERA_MIN_BLOB_AREA: u32 = 150;

/// Tunables for color mask construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    pub band: HsvBand,
    /// Blobs with a smaller enclosed area are erased from the mask.
    pub min_blob_area: u32,
    /// Kernel size of the final median smoothing, expected odd.
    pub median_kernel: u32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            band: HsvBand::WARM_WIDE,
            min_blob_area: IMAGE_MIN_BLOB_AREA,
            median_kernel: 5,
        }
    }
}

/// Tunables for the circle transform.
///
/// Lower `accum_threshold` when real circles are missed and raise it when
/// phantom circles appear; keep the radius bounds close to the expected
/// object size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// High Canny threshold for edge extraction; the low threshold is half of it.
    pub edge_threshold: f32,
    /// Accumulator votes required both for a center and for its radius support.
    pub accum_threshold: u32,
    /// Minimum distance between accepted circle centers, in pixels.
    pub min_dist: f32,
    pub min_radius: u32,
    pub max_radius: u32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            edge_threshold: 200.0,
            accum_threshold: 14,
            min_dist: 1000.0,
            min_radius: 15,
            max_radius: 100,
        }
    }
}
