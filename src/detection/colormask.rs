use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::{close, open};

use crate::detection::blobs;
use crate::params::{HsvBand, MaskParams};

/// Convert an 8-bit RGB pixel to HSV with OpenCV channel ranges:
/// hue in [0, 180) half degrees, saturation and value in [0, 255].
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> (u8, u8, u8) {
    let r = pixel[0] as f32;
    let g = pixel[1] as f32;
    let b = pixel[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = max;
    let saturation = if max > 0.0 { delta / max * 255.0 } else { 0.0 };

    let hue_degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let hue_degrees = if hue_degrees < 0.0 {
        hue_degrees + 360.0
    } else {
        hue_degrees
    };

    let hue = ((hue_degrees / 2.0).round() as u16 % 180) as u8;
    (hue, saturation.round() as u8, value.round() as u8)
}

/// Binary mask of the pixels whose HSV triple falls inside `band`.
pub fn threshold_band(frame: &RgbImage, band: &HsvBand) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let (h, s, v) = rgb_to_hsv(*frame.get_pixel(x, y));
        if band.contains(h, s, v) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Snapshots of the intermediate masks, for debugging.
pub struct MaskStages {
    pub thresholded: GrayImage,
    pub cleaned: GrayImage,
    pub filtered: GrayImage,
}

/// A finished mask plus advisory counts from the blob filter.
pub struct MaskReport {
    pub mask: GrayImage,
    pub blobs_seen: usize,
    pub blobs_kept: usize,
    pub stages: Option<MaskStages>,
}

/// Build the binary color mask for one frame.
pub fn build_mask(frame: &RgbImage, params: &MaskParams) -> GrayImage {
    build_mask_report(frame, params, false).mask
}

/// Build the mask, keeping the intermediate stages when `keep_stages` is set.
///
/// Threshold by HSV band, open then close with a 3x3 square element, erase
/// blobs below the area threshold, and median-smooth the survivors.
pub fn build_mask_report(frame: &RgbImage, params: &MaskParams, keep_stages: bool) -> MaskReport {
    let thresholded = threshold_band(frame, &params.band);

    let opened = open(&thresholded, Norm::LInf, 1);
    let cleaned = close(&opened, Norm::LInf, 1);

    let filtered = blobs::filter_by_area(&cleaned, params.min_blob_area);

    let radius = params.median_kernel / 2;
    let mask = median_filter(&filtered.mask, radius, radius);

    MaskReport {
        mask,
        blobs_seen: filtered.blobs_seen,
        blobs_kept: filtered.blobs_kept,
        stages: keep_stages.then(|| MaskStages {
            thresholded,
            cleaned,
            filtered: filtered.mask,
        }),
    }
}
