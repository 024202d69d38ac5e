use image::{GrayImage, RgbImage};

/// Binary mask of pixels strictly above the threshold.
pub fn threshold_above(gray: &GrayImage, t: u8) -> GrayImage {
    let mut out = GrayImage::new(gray.width(), gray.height());
    for (x, y, px) in gray.enumerate_pixels() {
        if px.0[0] > t {
            out.put_pixel(x, y, image::Luma([255]));
        }
    }
    out
}

/// Per-channel inclusive range test over a three-plane raster (HSV or Lab).
pub fn in_range(planes: &RgbImage, lo: [u8; 3], hi: [u8; 3]) -> GrayImage {
    let mut out = GrayImage::new(planes.width(), planes.height());
    for (x, y, px) in planes.enumerate_pixels() {
        let p = px.0;
        let hit = (0..3).all(|i| p[i] >= lo[i] && p[i] <= hi[i]);
        if hit {
            out.put_pixel(x, y, image::Luma([255]));
        }
    }
    out
}

/// Removes `strip` pixels from `mask`.
pub fn subtract(mask: &GrayImage, strip: &GrayImage) -> GrayImage {
    let mut out = mask.clone();
    for (x, y, px) in strip.enumerate_pixels() {
        if px.0[0] > 0 {
            out.put_pixel(x, y, image::Luma([0]));
        }
    }
    out
}

pub fn count_nonzero(mask: &GrayImage) -> u32 {
    mask.pixels().filter(|p| p.0[0] > 0).count() as u32
}

/// Foreground/background inversion, used to flip mask polarity before the
/// inside-the-blob distance transform.
pub fn invert(mask: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(mask.width(), mask.height());
    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] == 0 {
            out.put_pixel(x, y, image::Luma([255]));
        }
    }
    out
}
