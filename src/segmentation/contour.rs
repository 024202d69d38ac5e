use image::imageops::grayscale;
use image::RgbImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use tracing::debug;

use super::strategy::Segmenter;
use super::types::{BoundingBox, Region};
use crate::raster::{
    external_contours, in_range, mean_shift_smooth, rgb_to_hsv8, threshold_above, window_mean,
};

const PROCESSING_RESOLUTION: u32 = 200;
const SMOOTH_SPATIAL: u32 = 15;
const SMOOTH_COLOR: f32 = 30.0;
const THRESHOLD_LEVELS: [u8; 6] = [20, 60, 100, 140, 180, 220];
const MIN_CONTOUR_AREA: f64 = 50.0;
const MAX_REGIONS: usize = 20;
const SEED_HUE_RANGE: f32 = 20.0;
const SEED_SAT_RANGE: f32 = 80.0;
const SEED_VAL_RANGE: f32 = 80.0;

/// Multi-threshold contour extraction. Slower than the streaming path but the
/// regions carry real boundary polylines instead of plain boxes.
#[derive(Debug, Default)]
pub struct ContourSegmenter;

impl ContourSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl Segmenter for ContourSegmenter {
    fn algorithm_name(&self) -> &'static str {
        "contour"
    }

    fn processing_resolution(&self) -> u32 {
        PROCESSING_RESOLUTION
    }

    fn uses_contours(&self) -> bool {
        true
    }

    fn extract_regions(&self, raster: &RgbImage) -> Vec<Region> {
        let smoothed = mean_shift_smooth(raster, SMOOTH_SPATIAL, SMOOTH_COLOR);
        let gray = grayscale(&smoothed);

        // The same object can surface at several threshold levels. That
        // redundancy is intentional; area sorting and the downstream merge
        // passes decide which representation survives.
        let mut regions = Vec::new();
        for level in THRESHOLD_LEVELS {
            let mask = threshold_above(&gray, level);
            let opened = open(&mask, Norm::L1, 1);
            for contour in external_contours(&opened) {
                if contour.area < MIN_CONTOUR_AREA {
                    continue;
                }
                let (x, y, w, h) = contour.bounds;
                let mean = window_mean(&smoothed, x, y, w, h);
                regions.push(
                    Region::new(BoundingBox::new(x, y, w, h), contour.area as u32, mean)
                        .with_contour(contour.points),
                );
            }
        }

        regions.sort_by(|a, b| b.area.cmp(&a.area));
        regions.truncate(MAX_REGIONS);
        debug!("Contour extraction kept {} regions", regions.len());
        regions
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

        let smoothed = mean_shift_smooth(raster, SMOOTH_SPATIAL, SMOOTH_COLOR);
        let hsv = rgb_to_hsv8(&smoothed);
        let seed = hsv.get_pixel(seed_x, seed_y).0;

        let factor = sensitivity as f32 / 50.0;
        let h_range = (SEED_HUE_RANGE * factor) as i32;
        let s_range = (SEED_SAT_RANGE * factor) as i32;
        let v_range = (SEED_VAL_RANGE * factor) as i32;
        let lo = [
            (seed[0] as i32 - h_range).max(0) as u8,
            (seed[1] as i32 - s_range).max(0) as u8,
            (seed[2] as i32 - v_range).max(0) as u8,
        ];
        let hi = [
            (seed[0] as i32 + h_range).min(179) as u8,
            (seed[1] as i32 + s_range).min(255) as u8,
            (seed[2] as i32 + v_range).min(255) as u8,
        ];

        let mask = in_range(&hsv, lo, hi);
        let cleaned = open(&close(&mask, Norm::L2, 2), Norm::L2, 2);

        let contour = external_contours(&cleaned).into_iter().find(|c| {
            let (x, y, w, h) = c.bounds;
            BoundingBox::new(x, y, w, h).contains(seed_x as i32, seed_y as i32)
        })?;

        let (x, y, w, h) = contour.bounds;
        let mean = window_mean(&smoothed, x, y, w, h);
        Some(
            Region::new(BoundingBox::new(x, y, w, h), contour.area as u32, mean)
                .with_contour(contour.points),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn dark_with_bright_square() -> RgbImage {
        let mut img: RgbImage = ImageBuffer::from_pixel(200, 200, Rgb([30, 30, 30]));
        for y in 80..120 {
            for x in 80..120 {
                img.put_pixel(x, y, Rgb([220, 220, 220]));
            }
        }
        img
    }

    #[test]
    fn bright_square_surfaces_at_upper_thresholds() {
        let seg = ContourSegmenter::new();
        let regions = seg.extract_regions(&dark_with_bright_square());
        assert!(!regions.is_empty());

        let square = regions
            .iter()
            .find(|r| r.bounds.width < 60 && r.mean_color[0] > 180)
            .expect("square region missing");
        assert!(square.bounds.x >= 76 && square.bounds.x <= 84);
        assert!(square.bounds.y >= 76 && square.bounds.y <= 84);
        assert!(square.bounds.width >= 34 && square.bounds.width <= 44);
        assert!(!square.contour.is_empty());
    }

    #[test]
    fn regions_carry_contours_and_area_order() {
        let seg = ContourSegmenter::new();
        let regions = seg.extract_regions(&dark_with_bright_square());
        for r in &regions {
            assert!(!r.contour.is_empty());
        }
        for pair in regions.windows(2) {
            assert!(pair[0].area >= pair[1].area);
        }
        assert!(regions.len() <= 20);
    }

    #[test]
    fn nothing_above_any_threshold_yields_no_regions() {
        let seg = ContourSegmenter::new();
        let img: RgbImage = ImageBuffer::from_pixel(100, 100, Rgb([10, 10, 10]));
        assert!(seg.extract_regions(&img).is_empty());
    }

    #[test]
    fn seeded_mask_recovers_the_square() {
        let seg = ContourSegmenter::new();
        let region = seg
            .extract_seeded_region(&dark_with_bright_square(), 100, 100, 50)
            .expect("seeded region");
        assert!(region.bounds.contains(100, 100));
        assert!(region.bounds.x >= 74 && region.bounds.x <= 84);
        assert!(region.bounds.width >= 34 && region.bounds.width <= 50);
        assert!(region.mean_color[0] > 180);
        assert!(!region.contour.is_empty());
    }

    #[test]
    fn seeded_background_returns_the_background_contour() {
        let seg = ContourSegmenter::new();
        let region = seg
            .extract_seeded_region(&dark_with_bright_square(), 10, 10, 50)
            .expect("background region");
        assert!(region.bounds.contains(10, 10));
        assert!(region.bounds.width > 150);
    }

    #[test]
    fn isolated_pixel_is_opened_away() {
        let mut img: RgbImage = ImageBuffer::from_pixel(200, 200, Rgb([128, 128, 128]));
        img.put_pixel(50, 50, Rgb([250, 10, 10]));
        let seg = ContourSegmenter::new();
        assert!(seg.extract_seeded_region(&img, 50, 50, 0).is_none());
    }

    #[test]
    fn seed_outside_the_raster_is_rejected() {
        let seg = ContourSegmenter::new();
        let img = dark_with_bright_square();
        assert!(seg.extract_seeded_region(&img, 200, 100, 50).is_none());
    }
}
