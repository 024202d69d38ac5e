use std::cmp::Reverse;
use std::collections::BinaryHeap;

use image::{GrayImage, ImageBuffer, Luma};

type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;
type GradientImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Marker-seeded watershed constrained to a mask: basins grow from the marker
/// labels in order of rising gradient magnitude until the mask is partitioned.
/// Pixels outside the mask keep label 0, so a basin can never leak past the
/// color class that produced the markers.
pub fn watershed(gradient: &GradientImage, markers: &LabelImage, mask: &GrayImage) -> LabelImage {
    let (w, h) = markers.dimensions();
    let mut labels = markers.clone();

    // Heap entries: (gradient priority, insertion order, x, y, claiming label).
    // The order term keeps growth breadth-first within equal priorities.
    let mut heap: BinaryHeap<Reverse<(u16, u64, u32, u32, u32)>> = BinaryHeap::new();
    let mut ticket: u64 = 0;

    let push_neighbors = |heap: &mut BinaryHeap<Reverse<(u16, u64, u32, u32, u32)>>,
                              labels: &LabelImage,
                              ticket: &mut u64,
                              x: u32,
                              y: u32,
                              label: u32| {
        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if mask.get_pixel(nx, ny).0[0] == 0 {
                continue;
            }
            if labels.get_pixel(nx, ny).0[0] != 0 {
                continue;
            }
            let priority = gradient.get_pixel(nx, ny).0[0];
            heap.push(Reverse((priority, *ticket, nx, ny, label)));
            *ticket += 1;
        }
    };

    for y in 0..h {
        for x in 0..w {
            let label = labels.get_pixel(x, y).0[0];
            if label != 0 {
                push_neighbors(&mut heap, &labels, &mut ticket, x, y, label);
            }
        }
    }

    while let Some(Reverse((_, _, x, y, label))) = heap.pop() {
        if labels.get_pixel(x, y).0[0] != 0 {
            continue;
        }
        labels.put_pixel(x, y, Luma([label]));
        push_neighbors(&mut heap, &labels, &mut ticket, x, y, label);
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_gradient(w: u32, h: u32) -> GradientImage {
        ImageBuffer::from_pixel(w, h, Luma([0u16]))
    }

    #[test]
    fn two_peaks_partition_a_dumbbell() {
        // Two 6x6 blobs joined by a 2-wide bridge.
        let mut mask = GrayImage::new(20, 8);
        for y in 1..7 {
            for x in 1..7 {
                mask.put_pixel(x, y, Luma([255]));
            }
            for x in 13..19 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        for y in 3..5 {
            for x in 7..13 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let mut markers: LabelImage = ImageBuffer::new(20, 8);
        markers.put_pixel(3, 3, Luma([1u32]));
        markers.put_pixel(16, 3, Luma([2u32]));

        let labels = watershed(&flat_gradient(20, 8), &markers, &mask);

        assert_eq!(labels.get_pixel(2, 2).0[0], 1);
        assert_eq!(labels.get_pixel(17, 2).0[0], 2);
        // Everything inside the mask is claimed, nothing outside it.
        for (x, y, px) in labels.enumerate_pixels() {
            let inside = mask.get_pixel(x, y).0[0] != 0;
            assert_eq!(px.0[0] != 0, inside, "mismatch at ({x},{y})");
        }
    }

    #[test]
    fn flooding_respects_the_mask_boundary() {
        let mut mask = GrayImage::new(10, 10);
        for y in 0..10 {
            for x in 0..5 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let mut markers: LabelImage = ImageBuffer::new(10, 10);
        markers.put_pixel(2, 5, Luma([7u32]));

        let labels = watershed(&flat_gradient(10, 10), &markers, &mask);
        assert_eq!(labels.get_pixel(4, 9).0[0], 7);
        assert_eq!(labels.get_pixel(5, 5).0[0], 0);
        assert_eq!(labels.get_pixel(9, 0).0[0], 0);
    }

    #[test]
    fn high_gradient_ridge_decides_the_border() {
        // A vertical high-gradient ridge at x=6 should become the basin
        // border: the left seed claims everything up to it first.
        let mut gradient = flat_gradient(12, 3);
        for y in 0..3 {
            gradient.put_pixel(6, y, Luma([1000u16]));
        }
        let mask = GrayImage::from_pixel(12, 3, Luma([255]));
        let mut markers: LabelImage = ImageBuffer::new(12, 3);
        markers.put_pixel(1, 1, Luma([1u32]));
        markers.put_pixel(10, 1, Luma([2u32]));

        let labels = watershed(&gradient, &markers, &mask);
        assert_eq!(labels.get_pixel(5, 1).0[0], 1);
        assert_eq!(labels.get_pixel(7, 1).0[0], 2);
    }
}
