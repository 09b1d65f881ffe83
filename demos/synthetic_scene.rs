use image::{Rgb, RgbImage};

fn paint_disk(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    for y in (cy - radius).max(0)..(cy + radius + 1).min(h as i64) {
        for x in (cx - radius).max(0)..(cx + radius + 1).min(w as i64) {
            let dx = x - cx;
            let dy = y - cy;
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn main() {
    let (width, height) = (640u32, 480u32);
    let mut img = RgbImage::new(width, height);

    // Bluish gray backdrop with a vertical gradient
    for y in 0..height {
        for x in 0..width {
            let shade = 40 + (y * 30 / height) as u8;
            img.put_pixel(x, y, Rgb([shade, shade, shade + 25]));
        }
    }

    // Two orange disks of different sizes and slightly different tones
    paint_disk(&mut img, 240, 200, 45, Rgb([255, 140, 0]));
    paint_disk(&mut img, 520, 360, 20, Rgb([250, 160, 30]));

    // Specks too small to survive the area filter
    paint_disk(&mut img, 80, 420, 3, Rgb([255, 140, 0]));
    paint_disk(&mut img, 600, 60, 2, Rgb([255, 150, 10]));

    img.save("synthetic_scene.png").unwrap();
    println!("Created synthetic_scene.png ({}x{})", width, height);
}
