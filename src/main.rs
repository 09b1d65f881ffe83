use clap::{Parser, ValueEnum};
use image::{GrayImage, ImageReader, RgbImage};
use std::path::{Path, PathBuf};

use hueseek::detection::Detector;
use hueseek::params::{CAMERA_MIN_BLOB_AREA, HoughParams, HsvBand, IMAGE_MIN_BLOB_AREA, MaskParams};
use hueseek::render;

#[derive(Parser)]
#[command(name = "hueseek")]
#[command(about = "Detect circular objects through an HSV color mask and a Hough transform")]
struct Cli {
    /// Path to an input image, or the literal "camera" for a live stream
    #[arg(value_name = "INPUT")]
    input: String,

    /// Camera device index; malformed values fall back to 0
    #[arg(value_name = "DEVICE")]
    device: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Where to save the four-panel summary image (image mode; default: <stem>_panels.png)
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Write the detection result as JSON (image mode)
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Save intermediate mask stages to a directory (image mode; must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// HSV band preset
    #[arg(long, value_enum, default_value = "warm-wide")]
    band: BandPreset,

    /// Override the lower hue bound (0-180 scale)
    #[arg(long)]
    hue_min: Option<u8>,

    /// Override the upper hue bound (0-180 scale)
    #[arg(long)]
    hue_max: Option<u8>,

    /// Override the lower saturation bound
    #[arg(long)]
    sat_min: Option<u8>,

    /// Override the upper saturation bound
    #[arg(long)]
    sat_max: Option<u8>,

    /// Override the lower value bound
    #[arg(long)]
    val_min: Option<u8>,

    /// Override the upper value bound
    #[arg(long)]
    val_max: Option<u8>,

    /// Minimum blob area in pixels (default 200, or 150 in camera mode)
    #[arg(long)]
    min_area: Option<u32>,

    /// Median smoothing kernel size, expected odd
    #[arg(long, default_value_t = 5)]
    median_kernel: u32,

    /// Canny high threshold for edge extraction
    #[arg(long, default_value_t = 200.0)]
    edge_threshold: f32,

    /// Accumulator votes required for a circle center
    #[arg(long, default_value_t = 14)]
    accum_threshold: u32,

    /// Minimum distance between circle centers in pixels
    #[arg(long, default_value_t = 1000.0)]
    min_dist: f32,

    /// Smallest detectable radius in pixels
    #[arg(long, default_value_t = 15)]
    min_radius: u32,

    /// Largest detectable radius in pixels
    #[arg(long, default_value_t = 100)]
    max_radius: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum BandPreset {
    /// Red through yellow-green, tolerant of dark pixels
    WarmWide,
    /// Saturated orange and yellow objects
    OrangeYellow,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let camera_mode = args.input.eq_ignore_ascii_case("camera");

    let mut band = match args.band {
        BandPreset::WarmWide => HsvBand::WARM_WIDE,
        BandPreset::OrangeYellow => HsvBand::ORANGE_YELLOW,
    };
    if let Some(v) = args.hue_min {
        band.hue_min = v;
    }
    if let Some(v) = args.hue_max {
        band.hue_max = v;
    }
    if let Some(v) = args.sat_min {
        band.sat_min = v;
    }
    if let Some(v) = args.sat_max {
        band.sat_max = v;
    }
    if let Some(v) = args.val_min {
        band.val_min = v;
    }
    if let Some(v) = args.val_max {
        band.val_max = v;
    }

    let mask_params = MaskParams {
        band,
        min_blob_area: args.min_area.unwrap_or(if camera_mode {
            CAMERA_MIN_BLOB_AREA
        } else {
            IMAGE_MIN_BLOB_AREA
        }),
        median_kernel: args.median_kernel,
    };
    let hough_params = HoughParams {
        edge_threshold: args.edge_threshold,
        accum_threshold: args.accum_threshold,
        min_dist: args.min_dist,
        min_radius: args.min_radius,
        max_radius: args.max_radius,
    };
    let detector = Detector::new()
        .with_mask_params(mask_params)
        .with_hough_params(hough_params)
        .with_verbose(args.verbose);

    if camera_mode {
        let device = parse_device(args.device.as_deref());
        println!("Starting camera stream with camera {}", device);
        return run_camera(device, &detector);
    }

    run_image(&args, &detector)
}

/// A missing or malformed device index falls back to the default camera.
fn parse_device(arg: Option<&str>) -> i32 {
    match arg {
        None => 0,
        Some(raw) => match raw.parse() {
            Ok(device) => device,
            Err(_) => {
                println!("Invalid camera index '{}'. Using default camera (0)", raw);
                0
            }
        },
    }
}

#[cfg(feature = "camera")]
fn run_camera(device: i32, detector: &Detector) -> anyhow::Result<()> {
    hueseek::camera::run_stream(device, detector)
}

#[cfg(not(feature = "camera"))]
fn run_camera(device: i32, _detector: &Detector) -> anyhow::Result<()> {
    anyhow::bail!(
        "camera {} requested but this build has no camera support (enable the `camera` feature)",
        device
    )
}

fn run_image(args: &Cli, detector: &Detector) -> anyhow::Result<()> {
    let path = PathBuf::from(&args.input);
    println!("Processing image: {}", path.display());

    let img = ImageReader::open(&path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    let frame = img.to_rgb8();

    if args.verbose {
        println!("Image loaded: {}x{}", frame.width(), frame.height());
    }

    let (result, mask) = detector.detect_with_mask(&frame);

    let (center_x, center_y) = result.frame_center();
    println!("\n=== Circle Detection Results ===");
    if result.circles.is_empty() {
        println!("No circles detected");
    } else {
        println!("Detected {} circles", result.circles.len());
        println!("Image center: ({}, {})", center_x, center_y);
        println!("Circle centers (x, y, radius) and distances:");
        for (i, circle) in result.circles.iter().enumerate() {
            let distance = circle.distance_from(center_x as f32, center_y as f32);
            println!(
                "  Circle {}: center=({}, {}), radius={}, distance={:.1} pixels",
                i + 1,
                circle.x.round(),
                circle.y.round(),
                circle.radius.round(),
                distance
            );
        }
    }

    let panels = render::compose_panels(&frame, &mask, &result);
    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| default_panel_path(&path));
    panels
        .save(&out_path)
        .map_err(|e| anyhow::anyhow!("Failed to save panel image: {}", e))?;
    println!("Saved panel image to {}", out_path.display());

    if let Some(json_path) = &args.json {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(json_path, json)?;
        println!("Saved detection result to {}", json_path.display());
    }

    if let Some(dir) = &args.debug_out {
        save_debug_stages(detector, &frame, dir)?;
    }

    Ok(())
}

fn default_panel_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    input.with_file_name(format!("{}_panels.png", stem))
}

/// Save the intermediate masks into `dir`, which must be empty or absent.
fn save_debug_stages(detector: &Detector, frame: &RgbImage, dir: &Path) -> anyhow::Result<()> {
    if dir.exists() {
        let entries = std::fs::read_dir(dir)?;
        if entries.count() > 0 {
            anyhow::bail!("Debug directory is not empty: {}", dir.display());
        }
    } else {
        std::fs::create_dir_all(dir)?;
    }

    let report = detector.get_mask_stages(frame);
    if let Some(stages) = &report.stages {
        save_stage(&stages.thresholded, dir, "01_threshold.png")?;
        save_stage(&stages.cleaned, dir, "02_morphology.png")?;
        save_stage(&stages.filtered, dir, "03_area_filter.png")?;
    }
    save_stage(&report.mask, dir, "04_median.png")?;
    println!("Saved mask stages to {}", dir.display());
    Ok(())
}

fn save_stage(mask: &GrayImage, dir: &Path, name: &str) -> anyhow::Result<()> {
    let path = dir.join(name);
    mask.save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn image_only_flags_say_so_in_help() {
        let cmd = Cli::command();
        for flag in ["out", "json", "debug-out"] {
            let arg = cmd
                .get_arguments()
                .find(|a| a.get_long() == Some(flag))
                .unwrap();
            let help = arg.get_help().unwrap().to_string();
            assert!(help.contains("image mode"), "--{}: {}", flag, help);
        }
    }

    #[test]
    fn device_index_parses_or_falls_back() {
        assert_eq!(parse_device(None), 0);
        assert_eq!(parse_device(Some("3")), 3);
        assert_eq!(parse_device(Some("abc")), 0);
    }

    #[test]
    fn debug_stages_require_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("leftover.txt"), "x").unwrap();

        let detector = Detector::new();
        let frame = RgbImage::new(32, 32);
        assert!(save_debug_stages(&detector, &frame, dir.path()).is_err());
    }

    #[test]
    fn debug_stages_are_written_to_a_fresh_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("stages");

        let detector = Detector::new();
        let frame = RgbImage::new(32, 32);
        save_debug_stages(&detector, &frame, &target).unwrap();

        for name in [
            "01_threshold.png",
            "02_morphology.png",
            "03_area_filter.png",
            "04_median.png",
        ] {
            assert!(target.join(name).exists(), "missing {}", name);
        }
    }
}
