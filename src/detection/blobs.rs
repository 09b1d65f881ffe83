use image::GrayImage;

/// A connected foreground region in a binary mask.
#[derive(Debug, Clone)]
pub struct Blob {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// Foreground pixels belonging to the region.
    pub pixel_count: u32,
    /// Background pixels fully enclosed by the region.
    pub hole_count: u32,
}

impl Blob {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Region area including enclosed holes, the area an outer boundary
    /// traced around the region would contain.
    pub fn enclosed_area(&self) -> u32 {
        self.pixel_count + self.hole_count
    }
}

/// Result of erasing under-sized blobs from a mask.
pub struct FilteredMask {
    pub mask: GrayImage,
    pub blobs_seen: usize,
    pub blobs_kept: usize,
}

const FG_NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
const BG_NEIGHBORS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Label every foreground blob in a binary mask by flood fill.
///
/// Returns the row-major label grid (0 = background) and one `Blob` per
/// label. Foreground is 8-connected; enclosed holes are credited to the
/// surrounding blob afterwards and their pixels carry that blob's label
/// in the grid, so writing a label back produces a solid region. A blob
/// walled in by another blob folds into it, so only outermost regions
/// are reported.
pub fn label_blobs(mask: &GrayImage) -> (Vec<u32>, Vec<Blob>) {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let data = mask.as_raw();
    let mut labels = vec![0u32; data.len()];
    let mut blobs: Vec<Blob> = Vec::new();
    let mut queue: Vec<(i32, i32)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let start = (y * w + x) as usize;
            if data[start] == 0 || labels[start] != 0 {
                continue;
            }

            // Grow a new blob from this unlabeled seed.
            let label = blobs.len() as u32 + 1;
            labels[start] = label;
            queue.push((x, y));
            let mut blob = Blob {
                label,
                min_x: x as u32,
                min_y: y as u32,
                max_x: x as u32,
                max_y: y as u32,
                pixel_count: 0,
                hole_count: 0,
            };

            while let Some((cx, cy)) = queue.pop() {
                blob.pixel_count += 1;
                blob.min_x = blob.min_x.min(cx as u32);
                blob.min_y = blob.min_y.min(cy as u32);
                blob.max_x = blob.max_x.max(cx as u32);
                blob.max_y = blob.max_y.max(cy as u32);

                for (dx, dy) in FG_NEIGHBORS {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if nx < 0 || nx >= w || ny < 0 || ny >= h {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if data[nidx] != 0 && labels[nidx] == 0 {
                        labels[nidx] = label;
                        queue.push((nx, ny));
                    }
                }
            }

            blobs.push(blob);
        }
    }

    assign_holes(data, &mut labels, &mut blobs, w, h);
    (labels, blobs)
}

/// Mark the background reachable from the frame border, then fold every
/// remaining background component, and any blob it walls in, into the
/// blob that encloses it.
///
/// Background connectivity is 4-way so that a diagonal foreground chain
/// still separates inside from outside.
fn assign_holes(data: &[u8], labels: &mut [u32], blobs: &mut Vec<Blob>, w: i32, h: i32) {
    if blobs.is_empty() {
        return;
    }

    let mut outside = vec![false; data.len()];
    let mut queue: Vec<(i32, i32)> = Vec::new();

    for x in 0..w {
        for y in [0, h - 1] {
            let idx = (y * w + x) as usize;
            if data[idx] == 0 && !outside[idx] {
                outside[idx] = true;
                queue.push((x, y));
            }
        }
    }
    for y in 0..h {
        for x in [0, w - 1] {
            let idx = (y * w + x) as usize;
            if data[idx] == 0 && !outside[idx] {
                outside[idx] = true;
                queue.push((x, y));
            }
        }
    }

    while let Some((cx, cy)) = queue.pop() {
        for (dx, dy) in BG_NEIGHBORS {
            let nx = cx + dx;
            let ny = cy + dy;
            if nx < 0 || nx >= w || ny < 0 || ny >= h {
                continue;
            }
            let nidx = (ny * w + nx) as usize;
            if data[nidx] == 0 && !outside[nidx] {
                outside[nidx] = true;
                queue.push((nx, ny));
            }
        }
    }

    // Whatever background is left cannot reach the border: it is a hole.
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if data[idx] != 0 || outside[idx] || labels[idx] != 0 {
                continue;
            }

            let mut hole: Vec<usize> = vec![idx];
            let mut nested: Vec<usize> = Vec::new();
            let mut owner = 0u32;
            labels[idx] = u32::MAX;
            queue.push((x, y));
            while let Some((cx, cy)) = queue.pop() {
                for (dx, dy) in BG_NEIGHBORS {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if nx < 0 || nx >= w || ny < 0 || ny >= h {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if data[nidx] != 0 {
                        // The first blob found is the enclosing one: the
                        // scan enters the region at its topmost cell, and
                        // the cell above that cannot belong to a blob
                        // sitting inside the region.
                        if owner == 0 {
                            owner = labels[nidx];
                        } else if labels[nidx] != owner {
                            nested.push(nidx);
                        }
                    } else if !outside[nidx] && labels[nidx] == 0 {
                        labels[nidx] = u32::MAX;
                        hole.push(nidx);
                        queue.push((nx, ny));
                    }
                }
            }

            // A bounded background region always borders some blob.
            if owner > 0 {
                for &p in &hole {
                    labels[p] = owner;
                }
                blobs[(owner - 1) as usize].hole_count += hole.len() as u32;
                // Blobs inside the region sit within the enclosing blob's
                // outer boundary; they are part of its area, not regions
                // of their own.
                for &seed in &nested {
                    fold_into(data, labels, blobs, w, h, seed, owner);
                }
            } else {
                for &p in &hole {
                    labels[p] = 0;
                }
            }
        }
    }

    // Folded blobs leave empty entries; renumber the survivors.
    if blobs.iter().any(|b| b.pixel_count == 0) {
        let mut remap = vec![0u32; blobs.len() + 1];
        let mut next = 0u32;
        blobs.retain_mut(|b| {
            if b.pixel_count == 0 {
                return false;
            }
            next += 1;
            remap[b.label as usize] = next;
            b.label = next;
            true
        });
        for label in labels.iter_mut() {
            *label = remap[*label as usize];
        }
    }
}

/// Merge the blob containing `seed` into the blob labeled `to`,
/// relabeling its pixels and moving its counts and bounds over.
fn fold_into(
    data: &[u8],
    labels: &mut [u32],
    blobs: &mut [Blob],
    w: i32,
    h: i32,
    seed: usize,
    to: u32,
) {
    let from = labels[seed];
    if from == to {
        return;
    }

    let source = {
        let b = &mut blobs[(from - 1) as usize];
        let copy = b.clone();
        b.pixel_count = 0;
        b.hole_count = 0;
        copy
    };
    let target = &mut blobs[(to - 1) as usize];
    target.pixel_count += source.pixel_count;
    target.hole_count += source.hole_count;
    target.min_x = target.min_x.min(source.min_x);
    target.min_y = target.min_y.min(source.min_y);
    target.max_x = target.max_x.max(source.max_x);
    target.max_y = target.max_y.max(source.max_y);

    let mut queue = vec![((seed % w as usize) as i32, (seed / w as usize) as i32)];
    labels[seed] = to;
    while let Some((cx, cy)) = queue.pop() {
        for (dx, dy) in FG_NEIGHBORS {
            let nx = cx + dx;
            let ny = cy + dy;
            if nx < 0 || nx >= w || ny < 0 || ny >= h {
                continue;
            }
            let nidx = (ny * w + nx) as usize;
            if data[nidx] != 0 && labels[nidx] == from {
                labels[nidx] = to;
                queue.push((nx, ny));
            }
        }
    }
}

/// Erase every blob whose enclosed area is below `min_area`. Surviving
/// blobs are written back solid, holes filled.
pub fn filter_by_area(mask: &GrayImage, min_area: u32) -> FilteredMask {
    let (w, h) = mask.dimensions();
    let (labels, blobs) = label_blobs(mask);
    let keep: Vec<bool> = blobs.iter().map(|b| b.enclosed_area() >= min_area).collect();

    let filtered = GrayImage::from_fn(w, h, |x, y| {
        let label = labels[y as usize * w as usize + x as usize];
        if label != 0 && keep[(label - 1) as usize] {
            image::Luma([255u8])
        } else {
            image::Luma([0u8])
        }
    });

    FilteredMask {
        mask: filtered,
        blobs_seen: blobs.len(),
        blobs_kept: keep.iter().filter(|&&k| k).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> GrayImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        GrayImage::from_fn(w, h, |x, y| {
            let row = rows[y as usize].as_bytes();
            if row[x as usize] == b'#' {
                image::Luma([255u8])
            } else {
                image::Luma([0u8])
            }
        })
    }

    #[test]
    fn diagonal_pixels_join_one_blob() {
        let mask = mask_from(&[
            "#....", //
            ".#...", //
            "..#..", //
            ".....", //
        ]);
        let (_, blobs) = label_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].pixel_count, 3);
    }

    #[test]
    fn separated_regions_get_distinct_labels() {
        let mask = mask_from(&[
            "##..##", //
            "##..##", //
        ]);
        let (labels, blobs) = label_blobs(&mask);
        assert_eq!(blobs.len(), 2);
        assert_ne!(labels[0], labels[4]);
    }

    #[test]
    fn enclosed_hole_is_credited_to_the_surrounding_blob() {
        let mask = mask_from(&[
            "#####", //
            "#...#", //
            "#...#", //
            "#...#", //
            "#####", //
        ]);
        let (labels, blobs) = label_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].pixel_count, 16);
        assert_eq!(blobs[0].hole_count, 9);
        assert_eq!(blobs[0].enclosed_area(), 25);
        // hole pixels carry the owner's label
        assert_eq!(labels[2 * 5 + 2], blobs[0].label);
    }

    #[test]
    fn nested_rings_fold_into_the_outer_region() {
        let mask = mask_from(&[
            "###########", //
            "#.........#", //
            "#.#######.#", //
            "#.#.....#.#", //
            "#.#######.#", //
            "#.........#", //
            "###########", //
        ]);
        let (labels, blobs) = label_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].pixel_count, 48);
        assert_eq!(blobs[0].hole_count, 29);
        assert_eq!(blobs[0].enclosed_area(), 77);
        // the inner ring carries the outer label
        assert_eq!(labels[2 * 11 + 2], blobs[0].label);

        // a threshold the inner ring alone would fail keeps the whole region
        let filtered = filter_by_area(&mask, 50);
        assert_eq!(filtered.blobs_seen, 1);
        assert_eq!(filtered.mask.get_pixel(3, 3)[0], 255);
        assert_eq!(filtered.mask.get_pixel(5, 3)[0], 255);
    }

    #[test]
    fn border_touching_cavity_is_not_a_hole() {
        let mask = mask_from(&[
            "#.#", //
            "#.#", //
            "###", //
        ]);
        let (_, blobs) = label_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].hole_count, 0);
    }

    #[test]
    fn area_filter_erases_small_and_fills_kept() {
        let mask = mask_from(&[
            "#####..#", //
            "#...#...", //
            "#...#..#", //
            "#...#...", //
            "#####...", //
        ]);
        let filtered = filter_by_area(&mask, 20);
        assert_eq!(filtered.blobs_seen, 3);
        assert_eq!(filtered.blobs_kept, 1);
        // the ring survives with its hole filled
        assert_eq!(filtered.mask.get_pixel(2, 2)[0], 255);
        // the specks are gone
        assert_eq!(filtered.mask.get_pixel(7, 0)[0], 0);
        assert_eq!(filtered.mask.get_pixel(7, 2)[0], 0);
    }
}
