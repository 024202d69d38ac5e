use std::collections::VecDeque;

use image::{GrayImage, Luma, RgbImage};

/// Mask and geometry produced by one flood fill.
#[derive(Debug)]
pub struct FloodRegion {
    pub mask: GrayImage,
    pub area: u32,
    /// x, y, width, height in the source raster.
    pub bounds: (i32, i32, i32, i32),
}

/// Fixed-range flood fill over a three-plane raster: a pixel joins when every
/// channel sits within `tolerance` of the seed pixel's value (not the running
/// region mean). 4-connectivity, mask-only, source untouched.
pub fn flood_fill_fixed_range(
    planes: &RgbImage,
    seed_x: u32,
    seed_y: u32,
    tolerance: [i32; 3],
) -> FloodRegion {
    let (w, h) = planes.dimensions();
    let mut mask = GrayImage::new(w, h);
    let seed = planes.get_pixel(seed_x, seed_y).0;

    let mut queue = VecDeque::new();
    queue.push_back((seed_x as i32, seed_y as i32));
    mask.put_pixel(seed_x, seed_y, Luma([255]));

    let (mut min_x, mut min_y) = (seed_x as i32, seed_y as i32);
    let (mut max_x, mut max_y) = (seed_x as i32, seed_y as i32);
    let mut area = 1u32;

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            if mask.get_pixel(nx as u32, ny as u32).0[0] != 0 {
                continue;
            }
            let px = planes.get_pixel(nx as u32, ny as u32).0;
            let within = (0..3).all(|i| {
                let diff = px[i] as i32 - seed[i] as i32;
                diff.abs() <= tolerance[i]
            });
            if !within {
                continue;
            }
            mask.put_pixel(nx as u32, ny as u32, Luma([255]));
            area += 1;
            min_x = min_x.min(nx);
            min_y = min_y.min(ny);
            max_x = max_x.max(nx);
            max_y = max_y.max(ny);
            queue.push_back((nx, ny));
        }
    }

    FloodRegion {
        mask,
        area,
        bounds: (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn uniform_image_fills_completely() {
        let img: RgbImage = ImageBuffer::from_pixel(16, 8, Rgb([100, 100, 100]));
        let region = flood_fill_fixed_range(&img, 4, 4, [10, 10, 10]);
        assert_eq!(region.area, 16 * 8);
        assert_eq!(region.bounds, (0, 0, 16, 8));
    }

    #[test]
    fn fill_stops_at_color_boundary() {
        let mut img: RgbImage = ImageBuffer::from_pixel(20, 20, Rgb([50, 50, 50]));
        for y in 5..15 {
            for x in 5..15 {
                img.put_pixel(x, y, Rgb([200, 60, 60]));
            }
        }
        let region = flood_fill_fixed_range(&img, 10, 10, [20, 20, 20]);
        assert_eq!(region.area, 100);
        assert_eq!(region.bounds, (5, 5, 10, 10));
    }

    #[test]
    fn tolerance_widens_the_region_monotonically() {
        let mut img: RgbImage = ImageBuffer::from_pixel(30, 1, Rgb([0, 0, 0]));
        for x in 0..30 {
            let v = (x * 5) as u8;
            img.put_pixel(x, 0, Rgb([v, v, v]));
        }
        let mut last_area = 0;
        for tol in [10, 30, 60, 120] {
            let region = flood_fill_fixed_range(&img, 0, 0, [tol, tol, tol]);
            assert!(region.area >= last_area);
            last_area = region.area;
        }
        assert!(last_area > 1);
    }

    #[test]
    fn tolerance_is_anchored_to_the_seed_not_the_frontier() {
        // A slow gradient would be swallowed by a running-mean fill; the
        // fixed-range rule stops once values drift past the seed tolerance.
        let mut img: RgbImage = ImageBuffer::from_pixel(26, 1, Rgb([0, 0, 0]));
        for x in 0..26 {
            let v = (x * 10) as u8;
            img.put_pixel(x, 0, Rgb([v, v, v]));
        }
        let region = flood_fill_fixed_range(&img, 0, 0, [45, 45, 45]);
        // Values 0,10,20,30,40 qualify; 50 is past the tolerance.
        assert_eq!(region.area, 5);
    }
}
