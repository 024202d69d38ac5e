use image::{ImageBuffer, Luma, RgbImage};

type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Per-label geometry and color accumulated in one pass over a label image.
#[derive(Debug, Clone)]
pub struct ComponentStats {
    pub label: u32,
    pub area: u32,
    /// x, y, width, height.
    pub bounds: (i32, i32, i32, i32),
    pub mean_color: [u8; 3],
}

/// Collects stats for every nonzero label. When `source` is given, the mean
/// color is taken over the component's own pixels, not its bounding box.
pub fn component_stats(labels: &LabelImage, source: Option<&RgbImage>) -> Vec<ComponentStats> {
    struct Acc {
        area: u32,
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        color_sum: [u64; 3],
    }

    let mut accs: Vec<Option<Acc>> = Vec::new();

    for (x, y, px) in labels.enumerate_pixels() {
        let label = px.0[0] as usize;
        if label == 0 {
            continue;
        }
        if accs.len() <= label {
            accs.resize_with(label + 1, || None);
        }
        let acc = accs[label].get_or_insert(Acc {
            area: 0,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            color_sum: [0; 3],
        });
        acc.area += 1;
        acc.min_x = acc.min_x.min(x as i32);
        acc.min_y = acc.min_y.min(y as i32);
        acc.max_x = acc.max_x.max(x as i32);
        acc.max_y = acc.max_y.max(y as i32);
        if let Some(src) = source {
            let c = src.get_pixel(x, y).0;
            acc.color_sum[0] += c[0] as u64;
            acc.color_sum[1] += c[1] as u64;
            acc.color_sum[2] += c[2] as u64;
        }
    }

    accs.into_iter()
        .enumerate()
        .filter_map(|(label, acc)| {
            let acc = acc?;
            let mean_color = [
                (acc.color_sum[0] / acc.area as u64) as u8,
                (acc.color_sum[1] / acc.area as u64) as u8,
                (acc.color_sum[2] / acc.area as u64) as u8,
            ];
            Some(ComponentStats {
                label: label as u32,
                area: acc.area,
                bounds: (
                    acc.min_x,
                    acc.min_y,
                    acc.max_x - acc.min_x + 1,
                    acc.max_y - acc.min_y + 1,
                ),
                mean_color,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::region_labelling::{connected_components, Connectivity};

    #[test]
    fn stats_cover_two_separate_blobs() {
        let mut mask = image::GrayImage::new(30, 10);
        for y in 1..5 {
            for x in 1..6 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        for y in 2..9 {
            for x in 20..24 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));
        let mut stats = component_stats(&labels, None);
        stats.sort_by_key(|s| s.bounds.0);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].bounds, (1, 1, 5, 4));
        assert_eq!(stats[0].area, 20);
        assert_eq!(stats[1].bounds, (20, 2, 4, 7));
        assert_eq!(stats[1].area, 28);
    }

    #[test]
    fn mean_color_uses_member_pixels_only() {
        // Label a diagonal pair; the bbox window would also include the
        // off-component corners, which carry a loud color.
        let mut labels: LabelImage = ImageBuffer::new(2, 2);
        labels.put_pixel(0, 0, Luma([1u32]));
        labels.put_pixel(1, 1, Luma([1u32]));

        let mut src: RgbImage = ImageBuffer::from_pixel(2, 2, Rgb([255, 0, 0]));
        src.put_pixel(0, 0, Rgb([10, 20, 30]));
        src.put_pixel(1, 1, Rgb([30, 40, 50]));

        let stats = component_stats(&labels, Some(&src));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].mean_color, [20, 30, 40]);
        assert_eq!(stats[0].area, 2);
        assert_eq!(stats[0].bounds, (0, 0, 2, 2));
    }

    #[test]
    fn empty_label_image_yields_no_stats() {
        let labels: LabelImage = ImageBuffer::new(8, 8);
        assert!(component_stats(&labels, None).is_empty());
    }
}
