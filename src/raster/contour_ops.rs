use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

/// One traced outer boundary with its polygon area and bounding box.
#[derive(Debug, Clone)]
pub struct TracedContour {
    pub points: Vec<(i32, i32)>,
    pub area: f64,
    /// x, y, width, height.
    pub bounds: (i32, i32, i32, i32),
}

/// Outer boundaries of the mask's top-level blobs. Holes and nested borders
/// are dropped, matching external-only retrieval.
pub fn external_contours(mask: &GrayImage) -> Vec<TracedContour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let points: Vec<(i32, i32)> = c.points.iter().map(|p| (p.x, p.y)).collect();
            TracedContour {
                area: polygon_area(&points),
                bounds: points_bounds(&points),
                points,
            }
        })
        .collect()
}

/// Shoelace area of a closed polygon given by its boundary points.
pub fn polygon_area(points: &[(i32, i32)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        twice_area += x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64;
    }
    (twice_area.abs() as f64) / 2.0
}

fn points_bounds(points: &[(i32, i32)]) -> (i32, i32, i32, i32) {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}
