//! Drawing helpers for result overlays and the four-panel summary image.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::models::{Circle, DetectionResult};

const CIRCLE_OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
const CENTER_DOT: Rgb<u8> = Rgb([255, 0, 0]);
const DISTANCE_LINE: Rgb<u8> = Rgb([255, 255, 0]);
const FRAME_CENTER_DOT: Rgb<u8> = Rgb([255, 0, 255]);

/// Expand a binary mask to RGB so it can sit next to color panels.
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// Copy of the frame with every detected circle outlined and its center dotted.
pub fn draw_circles(frame: &RgbImage, result: &DetectionResult) -> RgbImage {
    let mut out = frame.clone();
    for circle in &result.circles {
        draw_circle_marker(&mut out, circle);
    }
    out
}

/// Circles plus a line from the frame center to each circle center, and a
/// dot marking the frame center itself.
pub fn draw_distances(frame: &RgbImage, result: &DetectionResult) -> RgbImage {
    let mut out = frame.clone();
    let (cx, cy) = result.frame_center();
    for circle in &result.circles {
        draw_circle_marker(&mut out, circle);
        draw_line_segment_mut(
            &mut out,
            (cx as f32, cy as f32),
            (circle.x, circle.y),
            DISTANCE_LINE,
        );
    }
    draw_filled_circle_mut(&mut out, (cx as i32, cy as i32), 5, FRAME_CENTER_DOT);
    out
}

fn draw_circle_marker(canvas: &mut RgbImage, circle: &Circle) {
    let center = (circle.x.round() as i32, circle.y.round() as i32);
    let radius = circle.radius.round() as i32;
    // two rings approximate a 2px stroke
    draw_hollow_circle_mut(canvas, center, radius, CIRCLE_OUTLINE);
    if radius > 1 {
        draw_hollow_circle_mut(canvas, center, radius - 1, CIRCLE_OUTLINE);
    }
    draw_filled_circle_mut(canvas, center, 2, CENTER_DOT);
}

/// Side-by-side summary strip: original, mask, detected circles, distance lines.
pub fn compose_panels(frame: &RgbImage, mask: &GrayImage, result: &DetectionResult) -> RgbImage {
    let (w, h) = frame.dimensions();
    let mut panels = RgbImage::new(w * 4, h);
    image::imageops::replace(&mut panels, frame, 0, 0);
    image::imageops::replace(&mut panels, &mask_to_rgb(mask), w as i64, 0);
    image::imageops::replace(&mut panels, &draw_circles(frame, result), (w * 2) as i64, 0);
    image::imageops::replace(&mut panels, &draw_distances(frame, result), (w * 3) as i64, 0);
    panels
}
