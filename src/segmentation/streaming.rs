use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use super::strategy::Segmenter;
use super::types::{BoundingBox, Region};
use crate::raster::{
    component_stats, downscale_half, flood_fill_fixed_range, masked_mean, rgb_to_lab8,
};

const PROCESSING_RESOLUTION: u32 = 480;
const MIN_COMPONENT_AREA: u32 = 100;
const MIN_COMPONENT_DIM: i32 = 10;
const MAX_REGIONS: usize = 40;
const MIN_SEED_AREA: u32 = 50;
const BASE_TOLERANCE: i32 = 20;

/// Quantization + connected components. One pass over the pixels, no
/// iterative optimization, so it holds up under repeated streaming calls.
#[derive(Debug, Default)]
pub struct FastStreamingSegmenter;

impl FastStreamingSegmenter {
    pub fn new() -> Self {
        Self
    }
}

/// Folds an 8-bit Lab pixel into one of 64 labels. Each channel contributes
/// four levels; +1 keeps every label clear of the background value.
fn quantized_label(lab8: [u8; 3]) -> u8 {
    let ql = lab8[0] / 64;
    let qa = lab8[1] / 64;
    let qb = lab8[2] / 64;
    (ql * 16 + qa * 4 + qb) + 1
}

impl Segmenter for FastStreamingSegmenter {
    fn algorithm_name(&self) -> &'static str {
        "fast-streaming"
    }

    fn processing_resolution(&self) -> u32 {
        PROCESSING_RESOLUTION
    }

    fn uses_contours(&self) -> bool {
        false
    }

    fn extract_regions(&self, raster: &RgbImage) -> Vec<Region> {
        let half = downscale_half(raster);
        let lab = rgb_to_lab8(&half);

        let mut quantized = GrayImage::new(lab.width(), lab.height());
        for (x, y, px) in lab.enumerate_pixels() {
            quantized.put_pixel(x, y, Luma([quantized_label(px.0)]));
        }

        // Labels are all nonzero, so nothing is treated as background and
        // components form wherever neighbors share a quantized color.
        let labels = connected_components(&quantized, Connectivity::Eight, Luma([0u8]));
        let mut stats = component_stats(&labels, Some(&half));
        stats.retain(|s| {
            s.area >= MIN_COMPONENT_AREA
                && s.bounds.2 >= MIN_COMPONENT_DIM
                && s.bounds.3 >= MIN_COMPONENT_DIM
        });
        stats.sort_by(|a, b| b.area.cmp(&a.area));
        stats.truncate(MAX_REGIONS);
        debug!("Streaming extraction kept {} components", stats.len());

        stats
            .into_iter()
            .map(|s| {
                let (x, y, w, h) = s.bounds;
                // Scale back out of the half-resolution working image.
                Region::new(
                    BoundingBox::new(x * 2, y * 2, w * 2, h * 2),
                    s.area * 4,
                    s.mean_color,
                )
            })
            .collect()
    }

    fn extract_seeded_region(
        &self,
        raster: &RgbImage,
        seed_x: u32,
        seed_y: u32,
        sensitivity: u8,
    ) -> Option<Region> {
        if seed_x >= raster.width() || seed_y >= raster.height() {
            return None;
        }

        let lab = rgb_to_lab8(raster);
        let tolerance = BASE_TOLERANCE + 2 * sensitivity as i32;
        let filled = flood_fill_fixed_range(&lab, seed_x, seed_y, [tolerance; 3]);
        if filled.area < MIN_SEED_AREA {
            debug!(
                "Seeded fill at ({}, {}) too small: {} px",
                seed_x, seed_y, filled.area
            );
            return None;
        }

        let (x, y, w, h) = filled.bounds;
        let mean = masked_mean(raster, &filled.mask);
        Some(Region::new(BoundingBox::new(x, y, w, h), filled.area, mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gray_with_red_square() -> RgbImage {
        let mut img: RgbImage = ImageBuffer::from_pixel(200, 200, Rgb([128, 128, 128]));
        for y in 80..120 {
            for x in 80..120 {
                img.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn label_space_is_bijective_over_quantized_channels() {
        let mut seen = [false; 65];
        for l in [0u8, 70, 140, 210] {
            for a in [0u8, 70, 140, 210] {
                for b in [0u8, 70, 140, 210] {
                    let label = quantized_label([l, a, b]);
                    assert!(label >= 1 && label <= 64);
                    assert!(!seen[label as usize], "label {} reused", label);
                    seen[label as usize] = true;
                }
            }
        }
    }

    #[test]
    fn finds_the_red_square_and_the_background() {
        let seg = FastStreamingSegmenter::new();
        let regions = seg.extract_regions(&gray_with_red_square());
        assert!(!regions.is_empty());

        // Largest region is the gray background.
        assert!(regions[0].area > 20_000);

        let red = regions
            .iter()
            .find(|r| r.mean_color[0] > 150 && r.mean_color[0] > r.mean_color[1] + 50)
            .expect("red component missing");
        assert!(red.bounds.x >= 76 && red.bounds.x <= 84);
        assert!(red.bounds.y >= 76 && red.bounds.y <= 84);
        assert!(red.bounds.width >= 32 && red.bounds.width <= 44);
        assert!(red.bounds.height >= 32 && red.bounds.height <= 44);
    }

    #[test]
    fn regions_come_out_area_sorted() {
        let seg = FastStreamingSegmenter::new();
        let regions = seg.extract_regions(&gray_with_red_square());
        for pair in regions.windows(2) {
            assert!(pair[0].area >= pair[1].area);
        }
    }

    #[test]
    fn uniform_image_is_one_region() {
        let seg = FastStreamingSegmenter::new();
        let img: RgbImage = ImageBuffer::from_pixel(100, 100, Rgb([40, 90, 160]));
        let regions = seg.extract_regions(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounds, BoundingBox::new(0, 0, 100, 100));
        assert_eq!(regions[0].mean_color, [40, 90, 160]);
    }

    #[test]
    fn seeded_fill_hugs_the_square() {
        let seg = FastStreamingSegmenter::new();
        let region = seg
            .extract_seeded_region(&gray_with_red_square(), 100, 100, 10)
            .expect("seeded region");
        assert_eq!(region.bounds, BoundingBox::new(80, 80, 40, 40));
        assert_eq!(region.area, 1600);
        assert_eq!(region.mean_color, [255, 0, 0]);
    }

    #[test]
    fn seeded_area_grows_with_sensitivity() {
        let seg = FastStreamingSegmenter::new();
        let img = gray_with_red_square();
        let mut last = 0u32;
        for sensitivity in [5u8, 20, 60] {
            let region = seg
                .extract_seeded_region(&img, 100, 100, sensitivity)
                .expect("seeded region");
            assert!(region.area >= last);
            last = region.area;
        }
    }

    #[test]
    fn seed_outside_the_raster_is_rejected() {
        let seg = FastStreamingSegmenter::new();
        let img = gray_with_red_square();
        assert!(seg.extract_seeded_region(&img, 200, 200, 50).is_none());
        assert!(seg.extract_seeded_region(&img, 10, 400, 50).is_none());
    }

    #[test]
    fn luminance_noise_does_not_split_the_background() {
        use rand::Rng;

        // Noise of +0..8 on a 130 gray stays inside one quantization cell.
        let mut rng = rand::rng();
        let mut img: RgbImage = ImageBuffer::from_fn(200, 200, |_, _| {
            let v = 130 + rng.random_range(0..8u8);
            Rgb([v, v, v])
        });
        for y in 80..120 {
            for x in 80..120 {
                img.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }

        let seg = FastStreamingSegmenter::new();
        let regions = seg.extract_regions(&img);
        assert!(regions[0].area > 20_000);
        assert!(regions
            .iter()
            .any(|r| r.mean_color[0] > 150 && r.mean_color[0] > r.mean_color[1] + 50));

        let region = seg
            .extract_seeded_region(&img, 100, 100, 10)
            .expect("seeded region");
        assert_eq!(region.bounds, BoundingBox::new(80, 80, 40, 40));
    }

    #[test]
    fn tiny_seeded_blob_is_rejected() {
        let mut img: RgbImage = ImageBuffer::from_pixel(100, 100, Rgb([128, 128, 128]));
        for y in 50..55 {
            for x in 50..55 {
                img.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        let seg = FastStreamingSegmenter::new();
        assert!(seg.extract_seeded_region(&img, 52, 52, 5).is_none());
    }
}
