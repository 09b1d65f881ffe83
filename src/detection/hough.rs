//! Gradient Hough transform for circles on a binary mask.
//!
//! Edge pixels vote along their gradient direction at every radius in the
//! configured range; circle centers show up as accumulator peaks because
//! votes from a circular boundary converge there.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::models::Circle;
use crate::params::HoughParams;

/// Neighborhood radius for accumulator smoothing before peak extraction.
const SMOOTH_RADIUS: i64 = 2;

/// Find circles in a binary mask.
///
/// Returns accepted circles strongest first; every circle has a radius in
/// `[min_radius, max_radius]` and centers are pairwise at least `min_dist`
/// apart. An empty result is the normal outcome for an empty mask.
pub fn find_circles(mask: &GrayImage, params: &HoughParams) -> Vec<Circle> {
    let (w, h) = mask.dimensions();
    if w < 4 || h < 4 || params.min_radius > params.max_radius || params.edge_threshold <= 0.0 {
        return Vec::new();
    }

    let edges = canny(mask, params.edge_threshold / 2.0, params.edge_threshold);
    let gx = horizontal_sobel(mask);
    let gy = vertical_sobel(mask);

    let stride = w as usize;
    let mut accum = vec![0u32; stride * h as usize];
    let mut edge_points: Vec<(u32, u32)> = Vec::new();

    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        let gxv = gx.get_pixel(x, y)[0] as f32;
        let gyv = gy.get_pixel(x, y)[0] as f32;
        let mag = (gxv * gxv + gyv * gyv).sqrt();
        if mag < 1e-3 {
            continue;
        }
        edge_points.push((x, y));

        let dx = gxv / mag;
        let dy = gyv / mag;
        for r in params.min_radius..=params.max_radius {
            let rf = r as f32;
            // the gradient may point into or out of the circle, vote both ways
            for sign in [1.0f32, -1.0] {
                let cx = (x as f32 + sign * dx * rf).round() as i64;
                let cy = (y as f32 + sign * dy * rf).round() as i64;
                if cx >= 0 && cx < w as i64 && cy >= 0 && cy < h as i64 {
                    accum[cy as usize * stride + cx as usize] += 1;
                }
            }
        }
    }
    if edge_points.is_empty() {
        return Vec::new();
    }

    // Sobel directions on a binary mask are coarsely quantized, which
    // splits a center's votes across a knot of nearby cells. Summing each
    // cell's neighborhood reads the knot as one peak.
    let smoothed = box_sum(&accum, stride, h as usize, SMOOTH_RADIUS);

    // Center candidates: cells at or above the vote threshold that are
    // 3x3 local maxima of the smoothed field, plateau ties resolved by
    // scan order.
    let mut candidates: Vec<(usize, u32)> = Vec::new();
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let idx = y as usize * stride + x as usize;
            let votes = smoothed[idx];
            if votes < params.accum_threshold {
                continue;
            }
            let mut is_max = true;
            'nms: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || nx >= w as i64 || ny < 0 || ny >= h as i64 {
                        continue;
                    }
                    let nidx = ny as usize * stride + nx as usize;
                    if smoothed[nidx] > votes || (smoothed[nidx] == votes && nidx < idx) {
                        is_max = false;
                        break 'nms;
                    }
                }
            }
            if is_max {
                candidates.push((idx, votes));
            }
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    // Greedy acceptance: a candidate too close to an already accepted
    // circle is dropped, then its radius must gather enough edge support.
    let mut circles: Vec<Circle> = Vec::new();
    let min_dist_sq = params.min_dist * params.min_dist;
    for (idx, _votes) in candidates {
        let cx = (idx % stride) as f32;
        let cy = (idx / stride) as f32;
        let too_close = circles.iter().any(|c| {
            let dx = c.x - cx;
            let dy = c.y - cy;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }
        if let Some(radius) = estimate_radius(&edge_points, cx, cy, params) {
            circles.push(Circle { x: cx, y: cy, radius });
        }
    }
    circles
}

/// Sum each cell with its neighbors within `radius`, truncated at the
/// field edge.
fn box_sum(accum: &[u32], stride: usize, height: usize, radius: i64) -> Vec<u32> {
    let mut out = vec![0u32; accum.len()];
    for y in 0..height as i64 {
        for x in 0..stride as i64 {
            let mut sum = 0u32;
            for ny in (y - radius).max(0)..=(y + radius).min(height as i64 - 1) {
                for nx in (x - radius).max(0)..=(x + radius).min(stride as i64 - 1) {
                    sum += accum[ny as usize * stride + nx as usize];
                }
            }
            out[y as usize * stride + x as usize] = sum;
        }
    }
    out
}

/// Histogram the distances from `(cx, cy)` to every edge point and pick the
/// best supported radius, ties toward the smaller one. `None` when even the
/// best bin stays under the accumulator threshold.
fn estimate_radius(edge_points: &[(u32, u32)], cx: f32, cy: f32, params: &HoughParams) -> Option<f32> {
    let bins = (params.max_radius - params.min_radius + 1) as usize;
    let mut histogram = vec![0u32; bins];

    for &(x, y) in edge_points {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt().round();
        if dist < params.min_radius as f32 || dist > params.max_radius as f32 {
            continue;
        }
        histogram[(dist as u32 - params.min_radius) as usize] += 1;
    }

    let mut best_bin = 0usize;
    let mut best_count = 0u32;
    for (bin, &count) in histogram.iter().enumerate() {
        if count > best_count {
            best_count = count;
            best_bin = bin;
        }
    }
    if best_count < params.accum_threshold {
        return None;
    }
    Some((params.min_radius + best_bin as u32) as f32)
}
