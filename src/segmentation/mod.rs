//! Region extraction: three interchangeable strategies behind one trait, the
//! shared geometry types, and the box-level postprocessing passes.

pub mod contour;
pub mod hybrid;
pub mod postprocess;
pub mod strategy;
pub mod streaming;
pub mod types;

pub use contour::ContourSegmenter;
pub use hybrid::HybridBoxSegmenter;
pub use postprocess::{insert_with_hierarchy, merge_adjacent, suppress_overlaps};
pub use strategy::{build_segmenter, Segmenter};
pub use streaming::FastStreamingSegmenter;
pub use types::{BoundingBox, Region, Segment, SegmentationResult};
