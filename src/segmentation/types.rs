use serde::Serialize;
use uuid::Uuid;

use crate::color::ColorDescriptor;
use crate::config::SegmentationMode;

/// Integer pixel rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> i64 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        (x1 - x0) as i64 * (y1 - y0) as i64
    }

    /// Intersection over union of the two rectangles.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = self.intersection_area(other);
        if inter == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        inter as f32 / union as f32
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        BoundingBox::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Whether `self` sits fully inside `outer`, allowing `tolerance` pixels
    /// of slack on every edge.
    pub fn inside_of(&self, outer: &BoundingBox, tolerance: i32) -> bool {
        self.x >= outer.x - tolerance
            && self.y >= outer.y - tolerance
            && self.x + self.width <= outer.x + outer.width + tolerance
            && self.y + self.height <= outer.y + outer.height + tolerance
    }
}

/// Extraction output in processing-raster coordinates, before mapping back to
/// the original image.
#[derive(Debug, Clone)]
pub struct Region {
    pub bounds: BoundingBox,
    pub area: u32,
    pub mean_color: [u8; 3],
    pub contour: Vec<(i32, i32)>,
}

impl Region {
    pub fn new(bounds: BoundingBox, area: u32, mean_color: [u8; 3]) -> Self {
        Self {
            bounds,
            area,
            mean_color,
            contour: Vec::new(),
        }
    }

    pub fn with_contour(mut self, contour: Vec<(i32, i32)>) -> Self {
        self.contour = contour;
        self
    }
}

/// One detected object in original-image coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub id: u32,
    pub bounds: BoundingBox,
    pub color: ColorDescriptor,
    pub confidence: f32,
    /// Boundary polyline; empty for box-producing strategies.
    pub contour: Vec<(i32, i32)>,
}

impl Segment {
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y)
    }

    pub fn area(&self) -> i64 {
        self.bounds.area()
    }
}

/// Outcome of one whole-image analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationResult {
    pub success: bool,
    pub segments: Vec<Segment>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub mode: SegmentationMode,
    pub request_id: Uuid,
}

impl SegmentationResult {
    pub fn completed(segments: Vec<Segment>, elapsed_ms: u64, mode: SegmentationMode) -> Self {
        Self {
            success: true,
            segments,
            error: None,
            elapsed_ms,
            mode,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn failed(message: impl Into<String>, mode: SegmentationMode) -> Self {
        Self {
            success: false,
            segments: Vec::new(),
            error: Some(message.into()),
            elapsed_ms: 0,
            mode,
            request_id: Uuid::new_v4(),
        }
    }

    /// First segment containing the point. Segments are area-sorted, so this
    /// is also the largest one under the point.
    pub fn find_segment_at(&self, x: i32, y: i32) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains_point(x, y))
    }
}
