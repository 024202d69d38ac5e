use image::imageops::grayscale;
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::distance_transform::{euclidean_squared_distance_transform, Norm};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::sobel_gradients;
use imageproc::morphology::{close, dilate, open};
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use super::postprocess::{insert_with_hierarchy, merge_adjacent, suppress_overlaps};
use super::strategy::Segmenter;
use super::types::{BoundingBox, Region};
use crate::raster::{
    component_stats, count_nonzero, external_contours, in_range, invert, mean_shift_smooth,
    rgb_to_hsv8, subtract, watershed, window_mean,
};

type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;
type GradientImage = ImageBuffer<Luma<u16>, Vec<u16>>;

const PROCESSING_RESOLUTION: u32 = 400;
const SMOOTH_SPATIAL: u32 = 8;
const SMOOTH_COLOR: f32 = 16.0;
const BLUR_SIGMA: f32 = 0.8;
const CANNY_LOW: f32 = 40.0;
const CANNY_HIGH: f32 = 120.0;
const HUE_BINS: u32 = 24;
const MIN_AREA_FRACTION: f32 = 0.0015;
const PEAK_FRACTION: f32 = 0.4;
const SEED_PEAK_FRACTION: f32 = 0.3;
const MAX_PEAKS: u32 = 60;
const ASPECT_MIN: f32 = 0.15;
const ASPECT_MAX: f32 = 7.0;
const MIN_REGION_AREA: u32 = 200;
const NMS_IOU: f32 = 0.5;
const MAX_REGIONS: usize = 35;
const SEED_HUE_RANGE: f32 = 20.0;
const SEED_SAT_RANGE: f32 = 70.0;
const SEED_VAL_RANGE: f32 = 70.0;

/// Adaptive color masks split by a watershed pass. Slower than streaming but
/// separates touching same-colored objects, which neither of the other two
/// strategies attempts.
#[derive(Debug, Default)]
pub struct HybridBoxSegmenter;

impl HybridBoxSegmenter {
    pub fn new() -> Self {
        Self
    }
}

/// Smoothed raster plus the per-image planes every mask shares.
struct Workspace {
    base: RgbImage,
    hsv: RgbImage,
    edges: GrayImage,
    gradient: GradientImage,
}

fn prepare(raster: &RgbImage) -> Workspace {
    let smoothed = mean_shift_smooth(raster, SMOOTH_SPATIAL, SMOOTH_COLOR);
    let base = gaussian_blur_f32(&smoothed, BLUR_SIGMA);
    let gray = grayscale(&base);
    let edges = dilate(&canny(&gray, CANNY_LOW, CANNY_HIGH), Norm::L1, 1);
    let gradient = sobel_gradients(&gray);
    let hsv = rgb_to_hsv8(&base);
    Workspace {
        base,
        hsv,
        edges,
        gradient,
    }
}

/// Value/saturation cutoffs derived from the channel means, so dim or washed
/// out photographs still split into usable dark/gray/colored classes.
fn adaptive_thresholds(hsv: &RgbImage) -> (u8, u8) {
    let mut v_sum = 0u64;
    let mut s_sum = 0u64;
    let mut count = 0u64;
    for px in hsv.pixels() {
        s_sum += px.0[1] as u64;
        v_sum += px.0[2] as u64;
        count += 1;
    }
    if count == 0 {
        return (20, 20);
    }
    let v_mean = v_sum as f32 / count as f32;
    let s_mean = s_sum as f32 / count as f32;
    let v_thresh = (v_mean * 0.32).clamp(20.0, 55.0) as u8;
    let s_thresh = (s_mean * 0.42).clamp(20.0, 65.0) as u8;
    (v_thresh, s_thresh)
}

fn class_masks(hsv: &RgbImage, v_thresh: u8, s_thresh: u8) -> Vec<GrayImage> {
    let mut masks = Vec::with_capacity(2 + HUE_BINS as usize);
    masks.push(in_range(hsv, [0, 0, 0], [179, 255, v_thresh]));
    masks.push(in_range(hsv, [0, 0, v_thresh + 1], [179, s_thresh, 255]));
    for bin in 0..HUE_BINS {
        let lo_h = (bin * 180 / HUE_BINS) as u8;
        let hi_h = ((bin + 1) * 180 / HUE_BINS - 1) as u8;
        masks.push(in_range(
            hsv,
            [lo_h, s_thresh + 1, v_thresh + 1],
            [hi_h, 255, 255],
        ));
    }
    masks
}

fn clean_mask(mask: &GrayImage, edges: &GrayImage) -> GrayImage {
    let opened = open(mask, Norm::L1, 1);
    let closed = close(&opened, Norm::L1, 1);
    subtract(&closed, edges)
}

/// Seed markers from the interior distance transform: pixels further from the
/// mask boundary than `fraction` of the maximum distance, dilated so near
/// peaks fuse, then component-labelled. Returns the labels and the peak count.
fn peak_markers(mask: &GrayImage, fraction: f32) -> (LabelImage, u32) {
    let (w, h) = mask.dimensions();
    let dist_sq = euclidean_squared_distance_transform(&invert(mask));

    let mut max_dist = 0f64;
    for px in dist_sq.pixels() {
        let d = px.0[0].sqrt();
        if d > max_dist {
            max_dist = d;
        }
    }

    let mut peaks = GrayImage::new(w, h);
    if max_dist > 0.0 && max_dist.is_finite() {
        let cutoff = fraction as f64 * max_dist;
        for (x, y, px) in dist_sq.enumerate_pixels() {
            if px.0[0].sqrt() > cutoff {
                peaks.put_pixel(x, y, Luma([255]));
            }
        }
    }
    let peaks = dilate(&peaks, Norm::L1, 1);

    let markers = connected_components(&peaks, Connectivity::Eight, Luma([0u8]));
    let count = markers.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    (markers, count)
}

fn acceptable_aspect(w: i32, h: i32) -> bool {
    if w <= 0 || h <= 0 {
        return false;
    }
    let aspect = w as f32 / h as f32;
    aspect > ASPECT_MIN && aspect < ASPECT_MAX
}

/// Splits one color mask into sub-regions, through the watershed when the
/// peak count suggests touching blobs and through plain contours otherwise.
fn segment_mask(mask: &GrayImage, ws: &Workspace, min_area: u32) -> Vec<Region> {
    let clean = clean_mask(mask, &ws.edges);
    if count_nonzero(&clean) < min_area {
        return Vec::new();
    }

    let (markers, peak_count) = peak_markers(&clean, PEAK_FRACTION);
    let mut regions = Vec::new();

    if (2..=MAX_PEAKS).contains(&peak_count) {
        let labels = watershed(&ws.gradient, &markers, &clean);
        for stats in component_stats(&labels, None) {
            let (x, y, w, h) = stats.bounds;
            if stats.area < min_area || !acceptable_aspect(w, h) {
                continue;
            }
            let mean = window_mean(&ws.base, x, y, w, h);
            regions.push(Region::new(BoundingBox::new(x, y, w, h), stats.area, mean));
        }
    } else {
        for contour in external_contours(&clean) {
            let (x, y, w, h) = contour.bounds;
            if (contour.area as u32) < min_area || !acceptable_aspect(w, h) {
                continue;
            }
            let mean = window_mean(&ws.base, x, y, w, h);
            regions.push(Region::new(
                BoundingBox::new(x, y, w, h),
                contour.area as u32,
                mean,
            ));
        }
    }
    regions
}

impl Segmenter for HybridBoxSegmenter {
    fn algorithm_name(&self) -> &'static str {
        "box-hybrid"
    }

    fn processing_resolution(&self) -> u32 {
        PROCESSING_RESOLUTION
    }

    fn uses_contours(&self) -> bool {
        false
    }

    fn extract_regions(&self, raster: &RgbImage) -> Vec<Region> {
        let ws = prepare(raster);
        let (v_thresh, s_thresh) = adaptive_thresholds(&ws.hsv);
        let min_area =
            ((raster.width() * raster.height()) as f32 * MIN_AREA_FRACTION).max(1.0) as u32;
        debug!(
            "Hybrid thresholds v={} s={} min_area={}",
            v_thresh, s_thresh, min_area
        );

        let mut regions: Vec<Region> = Vec::new();
        for mask in class_masks(&ws.hsv, v_thresh, s_thresh) {
            if count_nonzero(&mask) < min_area {
                continue;
            }
            for candidate in segment_mask(&mask, &ws, min_area) {
                insert_with_hierarchy(&mut regions, candidate);
            }
        }

        let mut regions = merge_adjacent(regions);
        regions.retain(|r| {
            let w = r.bounds.width;
            let h = r.bounds.height;
            w > 0
                && h > 0
                && (w.max(h) as f32 / w.min(h) as f32) <= ASPECT_MAX
                && r.area >= MIN_REGION_AREA
        });

        let mut regions = suppress_overlaps(regions, NMS_IOU);
        regions.truncate(MAX_REGIONS);
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

        let ws = prepare(raster);
        let seed = ws.hsv.get_pixel(seed_x, seed_y).0;
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

        let clean = clean_mask(&in_range(&ws.hsv, lo, hi), &ws.edges);
        let (markers, peak_count) = peak_markers(&clean, SEED_PEAK_FRACTION);
        if peak_count == 0 {
            return None;
        }

        let labels = watershed(&ws.gradient, &markers, &clean);
        let seed_label = labels.get_pixel(seed_x, seed_y).0[0];
        if seed_label == 0 {
            return None;
        }

        let (w, h) = labels.dimensions();
        let mut label_mask = GrayImage::new(w, h);
        let mut area = 0u32;
        for (x, y, px) in labels.enumerate_pixels() {
            if px.0[0] == seed_label {
                label_mask.put_pixel(x, y, Luma([255]));
                area += 1;
            }
        }

        let contour = external_contours(&label_mask)
            .into_iter()
            .max_by(|a, b| a.area.total_cmp(&b.area))?;
        let (x, y, bw, bh) = contour.bounds;
        let mean = window_mean(&ws.base, x, y, bw, bh);
        Some(
            Region::new(BoundingBox::new(x, y, bw, bh), area, mean)
                .with_contour(contour.points),
        )
    }
}
