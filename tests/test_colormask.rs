mod common;

use common::*;
use hueseek::detection::{blobs, colormask};
use hueseek::params::{HsvBand, MaskParams};
use hueseek::render;
use image::Rgb;

/// Band that admits every non-black pixel, for feeding masks back in as frames.
fn pass_through_band() -> HsvBand {
    HsvBand {
        hue_min: 0,
        hue_max: 180,
        sat_min: 0,
        sat_max: 255,
        val_min: 1,
        val_max: 255,
    }
}

#[test]
fn mask_matches_frame_dimensions() {
    let frame = disk_frame(123, 77, 60, 40, 15);
    let mask = colormask::build_mask(&frame, &MaskParams::default());
    assert_eq!(mask.dimensions(), frame.dimensions());
}

#[test]
fn band_selects_target_hue_only() {
    let mut frame = solid_frame(80, 40, BACKGROUND);
    paint_square(&mut frame, 0, 0, 40, ORANGE);
    paint_square(&mut frame, 40, 0, 40, Rgb([0, 0, 255]));

    let params = MaskParams {
        min_blob_area: 100,
        ..MaskParams::default()
    };
    let mask = colormask::build_mask(&frame, &params);
    assert_eq!(mask.get_pixel(10, 20)[0], 255);
    assert_eq!(mask.get_pixel(70, 20)[0], 0);
}

#[test]
fn small_blobs_below_threshold_are_erased() {
    let mut frame = disk_frame(120, 120, 60, 60, 20);
    paint_square(&mut frame, 8, 8, 5, ORANGE);

    let params = MaskParams::default();
    let report = colormask::build_mask_report(&frame, &params, true);
    assert_eq!(report.blobs_seen, 2);
    assert_eq!(report.blobs_kept, 1);

    let stages = report.stages.expect("stages requested");
    let (_, remaining) = blobs::label_blobs(&stages.filtered);
    assert_eq!(remaining.len(), 1);
    for blob in &remaining {
        assert!(
            blob.enclosed_area() >= params.min_blob_area,
            "blob of area {} survived a threshold of {}",
            blob.enclosed_area(),
            params.min_blob_area
        );
    }

    assert_eq!(report.mask.get_pixel(10, 10)[0], 0);
    assert_eq!(report.mask.get_pixel(60, 60)[0], 255);
}

#[test]
fn enclosed_holes_count_toward_blob_area() {
    // annulus of ~940 own pixels enclosing a ~317 pixel hole
    let frame = ring_frame(80, 80, 40, 40, 10, 20);
    let params = MaskParams {
        min_blob_area: 1100,
        ..MaskParams::default()
    };
    let report = colormask::build_mask_report(&frame, &params, true);
    assert_eq!(report.blobs_kept, 1);

    // the survivor is written back solid
    let stages = report.stages.expect("stages requested");
    assert_eq!(stages.filtered.get_pixel(40, 40)[0], 255);
}

#[test]
fn feedback_pass_does_not_create_blobs() {
    let frame = disk_frame(160, 160, 80, 80, 22);
    let params = MaskParams::default();
    let first = colormask::build_mask(&frame, &params);
    let (_, first_blobs) = blobs::label_blobs(&first);
    assert_eq!(first_blobs.len(), 1);

    let refed = render::mask_to_rgb(&first);
    let second = colormask::build_mask(
        &refed,
        &MaskParams {
            band: pass_through_band(),
            ..params
        },
    );
    let (_, second_blobs) = blobs::label_blobs(&second);
    assert!(second_blobs.len() <= first_blobs.len());
    assert_eq!(second_blobs.len(), 1);
}
