pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod raster;
pub mod segmentation;

pub use color::{ColorDescriptor, ColorNamer, ColorVision, ContrastRating};
pub use config::{EngineConfig, SegmentationMode, SegmenterKind};
pub use engine::{ColorAnalysis, DualModeEngine, EngineStats};
pub use error::EngineError;
pub use segmentation::{BoundingBox, Segment, SegmentationResult};
