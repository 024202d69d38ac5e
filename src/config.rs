use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public analysis mode. Streaming favors latency, Precision favors boundary
/// fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentationMode {
    Streaming,
    Precision,
}

/// The closed set of extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmenterKind {
    FastStreaming,
    Contour,
    BoxHybrid,
}

/// Engine construction parameters. Which strategy serves each mode is
/// configurable; the defaults pair Streaming with the fast labeling pass and
/// Precision with the contour pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: SegmentationMode,
    pub streaming_strategy: SegmenterKind,
    pub precision_strategy: SegmenterKind,
    /// Default seeded-query sensitivity in [0, 100].
    pub sensitivity: u8,
    pub target_fps: u32,
    /// How long a whole-image result stays servable from the hot cache.
    pub cache_validity: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: SegmentationMode::Streaming,
            streaming_strategy: SegmenterKind::FastStreaming,
            precision_strategy: SegmenterKind::Contour,
            sensitivity: 50,
            target_fps: 10,
            cache_validity: Duration::from_secs(2),
        }
    }
}
