//! Live camera detection behind the `camera` feature.
//!
//! Blocking read-process-display loop: frames that arrive while the
//! detector is busy are simply dropped by the driver.

use anyhow::Context;
use image::{GrayImage, RgbImage};
use opencv::{
    core::{self, Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::detection::Detector;
use crate::models::DetectionResult;
use crate::render;

/// Device that is mounted the right way around; every other device gets
/// mirrored before processing.
const NO_FLIP_DEVICE: i32 = 2;
const CAPTURE_PATH: &str = "hueseek_capture.png";
const STREAM_WINDOW: &str = "hueseek camera stream";
const MASK_WINDOW: &str = "hueseek mask";

struct Capture(VideoCapture);

impl Drop for Capture {
    fn drop(&mut self) {
        let _ = self.0.release();
    }
}

struct Windows;

impl Drop for Windows {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}

/// Read frames from `device` and run the detector on each until 'q' is
/// pressed; 's' saves the current annotated frame.
pub fn run_stream(device: i32, detector: &Detector) -> anyhow::Result<()> {
    let mut cap = VideoCapture::new(device, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        anyhow::bail!("Cannot open camera {}", device);
    }
    cap.set(videoio::CAP_PROP_FRAME_WIDTH, 640.0)?;
    cap.set(videoio::CAP_PROP_FRAME_HEIGHT, 480.0)?;
    let mut cap = Capture(cap);

    let band = detector.mask_params.band;
    println!("Camera stream started. Press 'q' to quit, 's' to save a frame");
    println!(
        "HSV range: [{},{},{}] to [{},{},{}]",
        band.hue_min, band.sat_min, band.val_min, band.hue_max, band.sat_max, band.val_max
    );

    let _windows = Windows;
    highgui::named_window(STREAM_WINDOW, highgui::WINDOW_AUTOSIZE)?;
    highgui::named_window(MASK_WINDOW, highgui::WINDOW_AUTOSIZE)?;

    let mut raw = Mat::default();
    loop {
        if !cap.0.read(&mut raw)? || raw.empty() {
            println!("Cannot read frame from camera {}", device);
            break;
        }

        let bgr = if device != NO_FLIP_DEVICE {
            let mut flipped = Mat::default();
            core::flip(&raw, &mut flipped, 1)?;
            flipped
        } else {
            raw.try_clone()?
        };

        let frame = mat_to_rgb(&bgr)?;
        let (result, mask) = detector.detect_with_mask(&frame);
        let annotated = render::draw_distances(&frame, &result);

        if detector.verbose {
            let (cx, cy) = result.frame_center();
            for (i, circle) in result.circles.iter().enumerate() {
                let distance = circle.distance_from(cx as f32, cy as f32);
                println!(
                    "Circle {}: center=({}, {}), radius={}, distance={:.1}",
                    i + 1,
                    circle.x.round(),
                    circle.y.round(),
                    circle.radius.round(),
                    distance
                );
            }
        }

        let mut display = rgb_to_mat(&annotated)?;
        draw_hud(&mut display, &result)?;
        highgui::imshow(STREAM_WINDOW, &display)?;
        highgui::imshow(MASK_WINDOW, &gray_to_mat(&mask)?)?;

        let key = highgui::wait_key(1)?;
        if key == i32::from(b'q') {
            break;
        } else if key == i32::from(b's') {
            let shot = mat_to_rgb(&display)?;
            shot.save(CAPTURE_PATH)
                .map_err(|e| anyhow::anyhow!("Failed to save frame: {}", e))?;
            println!("Saved frame to '{}'", CAPTURE_PATH);
        }
    }

    Ok(())
}

/// Circle labels, center marker and key hints, drawn in OpenCV's own text.
fn draw_hud(display: &mut Mat, result: &DetectionResult) -> opencv::Result<()> {
    let white = Scalar::new(255.0, 255.0, 255.0, 0.0);
    let yellow = Scalar::new(0.0, 255.0, 255.0, 0.0);
    let magenta = Scalar::new(255.0, 0.0, 255.0, 0.0);
    let rows = display.rows();
    let (cx, cy) = result.frame_center();

    imgproc::put_text(
        display,
        "CENTER",
        Point::new(cx as i32 - 30, cy as i32 - 10),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        magenta,
        1,
        imgproc::LINE_8,
        false,
    )?;

    for circle in &result.circles {
        let x = circle.x.round() as i32;
        let y = circle.y.round() as i32;
        let distance = circle.distance_from(cx as f32, cy as f32);
        imgproc::put_text(
            display,
            &format!("({},{})", x, y),
            Point::new(x + 10, y - 10),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.4,
            yellow,
            1,
            imgproc::LINE_8,
            false,
        )?;
        imgproc::put_text(
            display,
            &format!("d:{:.0}", distance),
            Point::new(x + 10, y + 5),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.4,
            yellow,
            1,
            imgproc::LINE_8,
            false,
        )?;
    }

    imgproc::put_text(
        display,
        &format!("Circles: {}", result.circles.len()),
        Point::new(10, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.7,
        white,
        2,
        imgproc::LINE_8,
        false,
    )?;
    imgproc::put_text(
        display,
        "Press 'q' to quit, 's' to save",
        Point::new(10, rows - 20),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        white,
        1,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

/// Convert a BGR `Mat` into an `RgbImage`.
fn mat_to_rgb(mat: &Mat) -> anyhow::Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes()?.to_vec();
    RgbImage::from_raw(width, height, data).context("camera frame has an unexpected layout")
}

/// Convert an `RgbImage` into a BGR `Mat` for display.
fn rgb_to_mat(img: &RgbImage) -> anyhow::Result<Mat> {
    let flat = Mat::from_slice(img.as_raw())?;
    let shaped = flat.reshape(3, img.height() as i32)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color(&shaped, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn gray_to_mat(mask: &GrayImage) -> anyhow::Result<Mat> {
    let flat = Mat::from_slice(mask.as_raw())?;
    let shaped = flat.reshape(1, mask.height() as i32)?;
    Ok(shaped)
}
