use image::RgbImage;

use super::contour::ContourSegmenter;
use super::hybrid::HybridBoxSegmenter;
use super::streaming::FastStreamingSegmenter;
use super::types::Region;
use crate::config::SegmenterKind;

/// Capability interface every extraction strategy implements. The variant set
/// is fixed; dispatch happens through [`build_segmenter`], not subclassing.
pub trait Segmenter: Send {
    fn algorithm_name(&self) -> &'static str;

    /// Longest raster side the strategy wants to work at. The engine resizes
    /// the input down to this before dispatching.
    fn processing_resolution(&self) -> u32;

    /// Whether regions carry boundary polylines (contours) or plain boxes.
    fn uses_contours(&self) -> bool;

    /// Whole-image extraction in processing coordinates.
    fn extract_regions(&self, raster: &RgbImage) -> Vec<Region>;

    /// Single-region extraction around a seed pixel, or None when no region
    /// of acceptable size claims the seed.
    fn extract_seeded_region(
        &self,
        raster: &RgbImage,
        seed_x: u32,
        seed_y: u32,
        sensitivity: u8,
    ) -> Option<Region>;
}

pub fn build_segmenter(kind: SegmenterKind) -> Box<dyn Segmenter> {
    match kind {
        SegmenterKind::FastStreaming => Box::new(FastStreamingSegmenter::new()),
        SegmenterKind::Contour => Box::new(ContourSegmenter::new()),
        SegmenterKind::BoxHybrid => Box::new(HybridBoxSegmenter::new()),
    }
}
