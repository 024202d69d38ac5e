//! The engine front door. Owns one segmenter per mode, the hot-result
//! cache, the processing buffer pool and the frame-rate gate, and turns
//! raw [`Region`]s into named, full-resolution [`Segment`]s.

use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::color::{ciede2000_between, oklab_distance, rgb_to_oklab, ColorDescriptor, ColorNamer, Oklab};
use crate::config::{EngineConfig, SegmentationMode};
use crate::engine::buffer_pool::{BufferPool, PoolStats};
use crate::engine::cache::HotCache;
use crate::engine::frame_rate::{FrameRateController, FrameStats};
use crate::error::EngineError;
use crate::raster::{resize_into, scaled_dimensions, window_mean};
use crate::segmentation::{build_segmenter, BoundingBox, Region, Segment, SegmentationResult, Segmenter};

/// Perceptual readout for a single probed point.
#[derive(Debug, Clone, Serialize)]
pub struct ColorAnalysis {
    pub color: ColorDescriptor,
    pub oklab: Oklab,
    /// Which distance metric scored the palette match.
    pub metric: &'static str,
    /// Distance to the closest palette anchor. Lower is a surer name.
    pub accuracy: f32,
}

/// Runtime counters exposed by [`DualModeEngine::stats`].
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub mode: SegmentationMode,
    pub cache_age_ms: Option<u64>,
    pub pool: PoolStats,
    pub frames: FrameStats,
}

/// Segmentation engine that switches between a fast streaming strategy
/// and a slower precision strategy at runtime.
pub struct DualModeEngine {
    config: EngineConfig,
    namer: ColorNamer,
    streaming: Box<dyn Segmenter>,
    precision: Box<dyn Segmenter>,
    hot: HotCache,
    pool: BufferPool,
    frames: FrameRateController,
}

impl DualModeEngine {
    pub fn new(config: EngineConfig) -> Self {
        let streaming = build_segmenter(config.streaming_strategy);
        let precision = build_segmenter(config.precision_strategy);
        info!(
            "Engine ready: {} for streaming, {} for precision",
            streaming.algorithm_name(),
            precision.algorithm_name()
        );
        Self {
            namer: ColorNamer::new(),
            hot: HotCache::new(config.cache_validity),
            pool: BufferPool::new(0, 0),
            frames: FrameRateController::new(config.target_fps),
            streaming,
            precision,
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn mode(&self) -> SegmentationMode {
        self.config.mode
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Switches modes. The hot cache only ever holds the active mode's
    /// last result, so a real switch invalidates it.
    pub fn set_mode(&mut self, mode: SegmentationMode) {
        if self.config.mode == mode {
            return;
        }
        info!("Switching mode {:?} -> {:?}", self.config.mode, mode);
        self.config.mode = mode;
        self.hot.invalidate();
    }

    /// Segments the whole raster with the active mode's strategy.
    ///
    /// Serves the cached result when one is still inside the validity
    /// window. Callers that need to share the result across threads can
    /// clone the returned [`Arc`] cheaply.
    pub fn segment(&mut self, image: &RgbImage) -> Result<Arc<SegmentationResult>, EngineError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            warn!("Rejecting empty raster {}x{}", width, height);
            return Err(EngineError::EmptyRaster { width, height });
        }

        if let Some(hit) = self.hot.get(self.config.mode) {
            debug!("Hot cache hit for {:?}", self.config.mode);
            return Ok(hit);
        }

        let started = Instant::now();
        let mode = self.config.mode;
        let segmenter: &dyn Segmenter = match mode {
            SegmentationMode::Streaming => self.streaming.as_ref(),
            SegmentationMode::Precision => self.precision.as_ref(),
        };

        let (proc_w, proc_h) =
            scaled_dimensions(width, height, segmenter.processing_resolution());
        self.pool.reset(proc_w, proc_h);
        let mut buffer = self.pool.acquire();
        resize_into(image, &mut buffer);

        let regions = segmenter.extract_regions(&buffer);
        drop(buffer);

        let scale_x = width as f32 / proc_w as f32;
        let scale_y = height as f32 / proc_h as f32;
        let keep_contours = segmenter.uses_contours();
        let segments: Vec<Segment> = regions
            .into_iter()
            .enumerate()
            .map(|(id, region)| {
                to_segment(&self.namer, image, id as u32, region, scale_x, scale_y, keep_contours)
            })
            .collect();

        let elapsed = started.elapsed().as_millis() as u64;
        info!(
            "Segmented {}x{} via {} in {} ms: {} segments",
            width,
            height,
            segmenter.algorithm_name(),
            elapsed,
            segments.len()
        );

        let result = Arc::new(SegmentationResult::completed(segments, elapsed, mode));
        self.hot.store(mode, Arc::clone(&result));
        Ok(result)
    }

    /// Segments only the region under a seed point. Never touches the
    /// hot cache: seeded queries are parameterized by seed and
    /// sensitivity, so one cached slot would thrash.
    ///
    /// Returns `None` for an out-of-bounds seed or when no acceptable
    /// region surrounds it.
    pub fn segment_at(
        &mut self,
        image: &RgbImage,
        x: u32,
        y: u32,
        sensitivity: u8,
    ) -> Option<Segment> {
        let (width, height) = image.dimensions();
        if x >= width || y >= height {
            debug!("Seed ({}, {}) outside {}x{}", x, y, width, height);
            return None;
        }

        let sensitivity = sensitivity.min(100);
        let segmenter: &dyn Segmenter = match self.config.mode {
            SegmentationMode::Streaming => self.streaming.as_ref(),
            SegmentationMode::Precision => self.precision.as_ref(),
        };

        let (proc_w, proc_h) =
            scaled_dimensions(width, height, segmenter.processing_resolution());
        self.pool.reset(proc_w, proc_h);
        let mut buffer = self.pool.acquire();
        resize_into(image, &mut buffer);

        let scale_x = width as f32 / proc_w as f32;
        let scale_y = height as f32 / proc_h as f32;
        let seed_x = ((x as f32 / scale_x) as u32).min(proc_w - 1);
        let seed_y = ((y as f32 / scale_y) as u32).min(proc_h - 1);

        let region = segmenter.extract_seeded_region(&buffer, seed_x, seed_y, sensitivity)?;
        debug!(
            "Seeded region at ({}, {}): {} px in processing space",
            x, y, region.area
        );
        let keep_contours = segmenter.uses_contours();
        Some(to_segment(&self.namer, image, 0, region, scale_x, scale_y, keep_contours))
    }

    /// Mean color of the `(2r+1)x(2r+1)` window around a point, named
    /// against the palette. Streaming mode scores the match with the
    /// OKLAB metric, precision mode with CIEDE2000.
    pub fn analyze_color(
        &self,
        image: &RgbImage,
        x: u32,
        y: u32,
        radius: u32,
    ) -> Option<ColorAnalysis> {
        let (width, height) = image.dimensions();
        if x >= width || y >= height {
            return None;
        }

        let r = radius as i32;
        let side = 2 * r + 1;
        let mean = window_mean(image, x as i32 - r, y as i32 - r, side, side);
        let oklab = rgb_to_oklab(mean);
        let (metric, accuracy) = match self.config.mode {
            SegmentationMode::Streaming => {
                ("OKLAB", self.namer.nearest_anchor_distance(oklab, oklab_distance))
            }
            SegmentationMode::Precision => {
                ("CIEDE2000", self.namer.nearest_anchor_distance(oklab, ciede2000_between))
            }
        };

        Some(ColorAnalysis {
            color: self.namer.describe(mean),
            oklab,
            metric,
            accuracy,
        })
    }

    /// Rate-gated variant of [`segment`](Self::segment) for video-style
    /// callers. `None` means the frame was dropped to hold the target
    /// frame rate.
    pub fn segment_frame(
        &mut self,
        image: &RgbImage,
    ) -> Option<Result<Arc<SegmentationResult>, EngineError>> {
        if !self.frames.should_process() {
            debug!("Frame dropped by rate gate");
            return None;
        }
        self.frames.frame_started();
        let result = self.segment(image);
        self.frames.frame_finished();
        Some(result)
    }

    /// Drops the cached result and every pooled buffer.
    pub fn cleanup(&mut self) {
        self.hot.invalidate();
        self.pool.clear();
        info!("Engine caches cleared");
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            mode: self.config.mode,
            cache_age_ms: self.hot.age_ms(),
            pool: self.pool.stats(),
            frames: self.frames.stats(),
        }
    }
}

/// Maps a processing-space region back to full resolution and names it.
/// The display color is re-read from the original raster at the region
/// center so downscale artifacts never tint the name.
fn to_segment(
    namer: &ColorNamer,
    image: &RgbImage,
    id: u32,
    region: Region,
    scale_x: f32,
    scale_y: f32,
    keep_contour: bool,
) -> Segment {
    let bounds = scale_bounds(&region.bounds, scale_x, scale_y);
    let (cx, cy) = bounds.center();
    let px = (cx.max(0) as u32).min(image.width() - 1);
    let py = (cy.max(0) as u32).min(image.height() - 1);
    let color = namer.describe(image.get_pixel(px, py).0);

    let contour = if keep_contour {
        region
            .contour
            .iter()
            .map(|&(x, y)| ((x as f32 * scale_x) as i32, (y as f32 * scale_y) as i32))
            .collect()
    } else {
        Vec::new()
    };

    Segment {
        id,
        bounds,
        color,
        confidence: 1.0,
        contour,
    }
}

fn scale_bounds(b: &BoundingBox, scale_x: f32, scale_y: f32) -> BoundingBox {
    BoundingBox::new(
        (b.x as f32 * scale_x) as i32,
        (b.y as f32 * scale_y) as i32,
        (b.width as f32 * scale_x) as i32,
        (b.height as f32 * scale_y) as i32,
    )
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use image::{ImageBuffer, Rgb};

    use super::*;

    fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        ImageBuffer::from_pixel(width, height, Rgb(rgb))
    }

    fn red_square_scene() -> RgbImage {
        let mut img = uniform(200, 200, [128, 128, 128]);
        for y in 80..120 {
            for x in 80..120 {
                img.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn repeated_calls_reuse_the_cached_result() {
        let mut engine = DualModeEngine::with_defaults();
        let img = uniform(100, 100, [60, 120, 180]);

        let first = engine.segment(&img).unwrap();
        let second = engine.segment(&img).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        engine.set_mode(SegmentationMode::Precision);
        let third = engine.segment(&img).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.mode, SegmentationMode::Precision);
    }

    #[test]
    fn cached_result_expires_after_the_validity_window() {
        let config = EngineConfig {
            cache_validity: Duration::from_millis(20),
            ..EngineConfig::default()
        };
        let mut engine = DualModeEngine::new(config);
        let img = uniform(80, 80, [90, 90, 90]);

        let first = engine.segment(&img).unwrap();
        thread::sleep(Duration::from_millis(50));
        let second = engine.segment(&img).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn empty_raster_is_an_error() {
        let mut engine = DualModeEngine::with_defaults();
        let empty = RgbImage::new(0, 0);
        let err = engine.segment(&empty).unwrap_err();
        assert!(matches!(err, EngineError::EmptyRaster { width: 0, height: 0 }));
    }

    #[test]
    fn uniform_raster_becomes_a_single_named_segment() {
        let mut engine = DualModeEngine::with_defaults();
        let img = uniform(100, 100, [255, 0, 0]);

        let result = engine.segment(&img).unwrap();
        assert!(result.success);
        assert_eq!(result.segments.len(), 1);

        let seg = &result.segments[0];
        assert_eq!(seg.bounds, BoundingBox::new(0, 0, 100, 100));
        assert_eq!(seg.color.name, "red");
        assert_eq!(seg.confidence, 1.0);
    }

    #[test]
    fn seeded_query_finds_the_square_in_both_modes() {
        let mut engine = DualModeEngine::with_defaults();
        let img = red_square_scene();

        let seg = engine.segment_at(&img, 100, 100, 10).expect("streaming seed");
        assert_eq!(seg.id, 0);
        assert_eq!(seg.confidence, 1.0);
        assert!((seg.bounds.x - 80).abs() <= 2);
        assert!((seg.bounds.y - 80).abs() <= 2);
        assert!((seg.bounds.width - 40).abs() <= 4);
        assert!((seg.bounds.height - 40).abs() <= 4);
        assert!(seg.color.name.contains("red"));
        assert!(seg.contour.is_empty());

        engine.set_mode(SegmentationMode::Precision);
        let seg = engine.segment_at(&img, 100, 100, 10).expect("precision seed");
        assert!((seg.bounds.x - 80).abs() <= 2);
        assert!((seg.bounds.y - 80).abs() <= 2);
        assert!((seg.bounds.width - 40).abs() <= 4);
        assert!((seg.bounds.height - 40).abs() <= 4);
        assert!(seg.color.name.contains("red"));
        assert!(!seg.contour.is_empty());
    }

    #[test]
    fn out_of_bounds_seed_is_rejected() {
        let mut engine = DualModeEngine::with_defaults();
        let img = red_square_scene();

        assert!(engine.segment_at(&img, 200, 100, 50).is_none());
        assert!(engine.segment_at(&img, 100, 200, 50).is_none());
    }

    #[test]
    fn color_probe_switches_metric_with_the_mode() {
        let mut engine = DualModeEngine::with_defaults();
        let img = uniform(50, 50, [10, 120, 200]);

        let probe = engine.analyze_color(&img, 25, 25, 2).expect("in-bounds probe");
        assert_eq!(probe.color.rgb, [10, 120, 200]);
        assert_eq!(probe.metric, "OKLAB");
        assert!(probe.accuracy >= 0.0);

        engine.set_mode(SegmentationMode::Precision);
        let probe = engine.analyze_color(&img, 25, 25, 2).expect("in-bounds probe");
        assert_eq!(probe.metric, "CIEDE2000");

        assert!(engine.analyze_color(&img, 50, 25, 2).is_none());
    }

    #[test]
    fn frame_gate_drops_frames_past_the_target_rate() {
        let config = EngineConfig {
            target_fps: 1,
            ..EngineConfig::default()
        };
        let mut engine = DualModeEngine::new(config);
        let img = uniform(60, 60, [40, 40, 40]);

        assert!(engine.segment_frame(&img).is_some());
        assert!(engine.segment_frame(&img).is_none());

        let stats = engine.stats();
        assert_eq!(stats.frames.processed, 1);
        assert_eq!(stats.frames.dropped, 1);
    }

    #[test]
    fn processing_buffers_come_back_from_the_pool() {
        let config = EngineConfig {
            cache_validity: Duration::ZERO,
            ..EngineConfig::default()
        };
        let mut engine = DualModeEngine::new(config);
        let img = uniform(100, 100, [70, 140, 70]);

        engine.segment(&img).unwrap();
        engine.segment(&img).unwrap();

        let pool = engine.stats().pool;
        assert_eq!(pool.created, 1);
        assert!(pool.reused >= 1);
    }

    #[test]
    fn cleanup_clears_cache_and_pool() {
        let mut engine = DualModeEngine::with_defaults();
        let img = uniform(80, 80, [200, 200, 40]);

        engine.segment(&img).unwrap();
        assert!(engine.stats().cache_age_ms.is_some());

        engine.cleanup();
        let stats = engine.stats();
        assert!(stats.cache_age_ms.is_none());
        assert_eq!(stats.pool.available, 0);
    }
}
