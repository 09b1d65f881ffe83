use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// Saturated orange, inside both built-in HSV bands.
pub const ORANGE: Rgb<u8> = Rgb([255, 140, 0]);

/// Dark background, outside every band.
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Frame of a single color.
pub fn solid_frame(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, _| color)
}

/// Dark frame with one solid orange disk.
pub fn disk_frame(width: u32, height: u32, cx: i64, cy: i64, radius: i64) -> RgbImage {
    let mut frame = solid_frame(width, height, BACKGROUND);
    paint_disk(&mut frame, cx, cy, radius, ORANGE);
    frame
}

/// Paint a filled disk onto an existing frame.
pub fn paint_disk(frame: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let dx = x as i64 - cx;
            let dy = y as i64 - cy;
            if dx * dx + dy * dy <= radius * radius {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Paint a filled axis-aligned square with the given side length.
pub fn paint_square(frame: &mut RgbImage, x0: u32, y0: u32, side: u32, color: Rgb<u8>) {
    for y in y0..(y0 + side).min(frame.height()) {
        for x in x0..(x0 + side).min(frame.width()) {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Dark frame with an orange annulus between the two radii.
pub fn ring_frame(width: u32, height: u32, cx: i64, cy: i64, inner: i64, outer: i64) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let dx = x as i64 - cx;
        let dy = y as i64 - cy;
        let d2 = dx * dx + dy * dy;
        if d2 <= outer * outer && d2 > inner * inner {
            ORANGE
        } else {
            BACKGROUND
        }
    })
}

/// Binary mask that is empty everywhere.
pub fn blank_mask(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

/// Binary mask with one solid disk of 255s.
pub fn disk_mask(width: u32, height: u32, cx: i64, cy: i64, radius: i64) -> GrayImage {
    let mut mask = blank_mask(width, height);
    paint_mask_disk(&mut mask, cx, cy, radius);
    mask
}

/// Paint a disk of 255s onto an existing mask.
pub fn paint_mask_disk(mask: &mut GrayImage, cx: i64, cy: i64, radius: i64) {
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            let dx = x as i64 - cx;
            let dy = y as i64 - cy;
            if dx * dx + dy * dy <= radius * radius {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
}
