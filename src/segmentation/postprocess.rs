use super::types::Region;

const DUPLICATE_IOU: f32 = 0.9;
const CONTAINED_AREA_FRACTION: f32 = 0.7;
const CONTAINMENT_TOLERANCE: i32 = 1;
const MERGE_IOU: f32 = 0.25;
const MERGE_COLOR_DISTANCE: f32 = 45.0;
const MERGE_RATIO_MIN: f32 = 0.33;
const MERGE_RATIO_MAX: f32 = 3.0;
const MERGE_MAX_ROUNDS: usize = 3;

/// Adds `candidate` to `kept` unless an existing region already covers it
/// (IoU above 0.9). Existing regions that sit inside the candidate and hold
/// less than 70% of its box area are treated as partial detections of the
/// same object and replaced.
pub fn insert_with_hierarchy(kept: &mut Vec<Region>, candidate: Region) {
    if kept
        .iter()
        .any(|r| r.bounds.iou(&candidate.bounds) > DUPLICATE_IOU)
    {
        return;
    }

    let parent_area = candidate.bounds.area() as f32;
    kept.retain(|r| {
        !(r.bounds.inside_of(&candidate.bounds, CONTAINMENT_TOLERANCE)
            && (r.bounds.area() as f32) < parent_area * CONTAINED_AREA_FRACTION)
    });
    kept.push(candidate);
}

fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    let dr = a[0] as f32 - b[0] as f32;
    let dg = a[1] as f32 - b[1] as f32;
    let db = a[2] as f32 - b[2] as f32;
    (dr * dr + dg * dg + db * db).sqrt()
}

fn should_merge(a: &Region, b: &Region) -> bool {
    if a.bounds.iou(&b.bounds) <= MERGE_IOU {
        return false;
    }
    if rgb_distance(a.mean_color, b.mean_color) >= MERGE_COLOR_DISTANCE {
        return false;
    }
    let ratio = a.area as f32 / b.area.max(1) as f32;
    (MERGE_RATIO_MIN..=MERGE_RATIO_MAX).contains(&ratio)
}

fn merge_pair(a: &Region, b: &Region) -> Region {
    let total = a.area as u64 + b.area as u64;
    let mix = |i: usize| {
        ((a.mean_color[i] as u64 * a.area as u64 + b.mean_color[i] as u64 * b.area as u64)
            / total.max(1)) as u8
    };
    Region::new(
        a.bounds.union(&b.bounds),
        (total.min(u32::MAX as u64)) as u32,
        [mix(0), mix(1), mix(2)],
    )
}

/// Agglomerates regions that overlap substantially, look alike in color, and
/// are of comparable size. Runs at most three rounds; one object split across
/// a few masks converges well before that.
pub fn merge_adjacent(mut regions: Vec<Region>) -> Vec<Region> {
    for _ in 0..MERGE_MAX_ROUNDS {
        let mut merged_any = false;
        let mut consumed = vec![false; regions.len()];
        let mut out: Vec<Region> = Vec::with_capacity(regions.len());

        for i in 0..regions.len() {
            if consumed[i] {
                continue;
            }
            let mut current = regions[i].clone();
            for j in (i + 1)..regions.len() {
                if consumed[j] {
                    continue;
                }
                if should_merge(&current, &regions[j]) {
                    current = merge_pair(&current, &regions[j]);
                    consumed[j] = true;
                    merged_any = true;
                }
            }
            out.push(current);
        }

        regions = out;
        if !merged_any {
            break;
        }
    }
    regions
}

/// Greedy non-maximum suppression: regions are visited largest-first and kept
/// only when they do not overlap an already kept region past `iou_threshold`.
pub fn suppress_overlaps(mut regions: Vec<Region>, iou_threshold: f32) -> Vec<Region> {
    regions.sort_by(|a, b| b.area.cmp(&a.area));
    let mut kept: Vec<Region> = Vec::with_capacity(regions.len());
    for r in regions {
        if kept.iter().all(|k| k.bounds.iou(&r.bounds) <= iou_threshold) {
            kept.push(r);
        }
    }
    kept
}
