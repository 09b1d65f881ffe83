pub mod blobs;
pub mod colormask;
pub mod hough;

use image::{GrayImage, RgbImage};

use crate::models::DetectionResult;
use crate::params::{HoughParams, MaskParams};

/// Per-frame detection orchestrator: color mask first, circle transform second.
///
/// Stateless across frames; every call recomputes the full result.
pub struct Detector {
    pub mask_params: MaskParams,
    pub hough_params: HoughParams,
    pub verbose: bool,
}

impl Detector {
    pub fn new() -> Self {
        Self {
            mask_params: MaskParams::default(),
            hough_params: HoughParams::default(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_mask_params(mut self, params: MaskParams) -> Self {
        self.mask_params = params;
        self
    }

    pub fn with_hough_params(mut self, params: HoughParams) -> Self {
        self.hough_params = params;
        self
    }

    /// Run the full pipeline on one frame.
    pub fn detect(&self, frame: &RgbImage) -> DetectionResult {
        self.detect_with_mask(frame).0
    }

    /// Run the full pipeline and also return the binary mask it worked on.
    pub fn detect_with_mask(&self, frame: &RgbImage) -> (DetectionResult, GrayImage) {
        if self.verbose {
            println!("\nBuilding color mask...");
        }
        let report = colormask::build_mask_report(frame, &self.mask_params, false);
        if self.verbose {
            println!(
                "Area threshold: {} pixels - kept {} of {} blobs",
                self.mask_params.min_blob_area, report.blobs_kept, report.blobs_seen
            );
            println!("\nDetecting circles...");
        }

        let circles = hough::find_circles(&report.mask, &self.hough_params);
        if self.verbose {
            println!("Found {} circle(s)", circles.len());
        }

        let result = DetectionResult {
            width: frame.width(),
            height: frame.height(),
            circles,
        };
        (result, report.mask)
    }

    /// Mask construction only, with per-stage snapshots (for debugging).
    pub fn get_mask_stages(&self, frame: &RgbImage) -> colormask::MaskReport {
        colormask::build_mask_report(frame, &self.mask_params, true)
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}
