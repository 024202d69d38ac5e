//! Pixel-level primitives shared by the extraction strategies: resampling,
//! color-plane conversions, smoothing, and content hashing.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb, RgbImage};

/// Processing dimensions for a raster: scaled down so the longer side is at
/// most `max_side`, never scaled up.
pub fn scaled_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = max_side as f32 / longest as f32;
    (
        ((width as f32 * scale) as u32).max(1),
        ((height as f32 * scale) as u32).max(1),
    )
}

/// Nearest-neighbor resample into a preallocated target, overwriting every
/// pixel. The target's own dimensions pick the output size, which lets the
/// caller reuse pooled buffers instead of allocating per frame.
pub fn resize_into(img: &RgbImage, out: &mut RgbImage) {
    let (sw, sh) = img.dimensions();
    let (dw, dh) = out.dimensions();
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }
    for y in 0..dh {
        let sy = (y as u64 * sh as u64 / dh as u64).min(sh as u64 - 1) as u32;
        for x in 0..dw {
            let sx = (x as u64 * sw as u64 / dw as u64).min(sw as u64 - 1) as u32;
            out.put_pixel(x, y, *img.get_pixel(sx, sy));
        }
    }
}

/// Bilinear 2x downscale.
pub fn downscale_half(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    imageops::resize(img, (w / 2).max(1), (h / 2).max(1), FilterType::Triangle)
}

/// 8-bit Lab encoding of one sRGB pixel: L scaled to [0,255], a and b offset
/// by 128. The scaling matches what the extraction tolerances were tuned for.
pub fn lab8_pixel(rgb: [u8; 3]) -> [u8; 3] {
    let lab = crate::color::rgb_to_lab(rgb);
    [
        (lab.l * 255.0 / 100.0).clamp(0.0, 255.0) as u8,
        (lab.a + 128.0).clamp(0.0, 255.0) as u8,
        (lab.b + 128.0).clamp(0.0, 255.0) as u8,
    ]
}

/// Converts a whole raster to 8-bit Lab planes.
pub fn rgb_to_lab8(img: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, px) in img.enumerate_pixels() {
        out.put_pixel(x, y, Rgb(lab8_pixel(px.0)));
    }
    out
}

/// HSV with hue halved into [0,180) and saturation/value in [0,255]; the
/// range thresholds throughout the hybrid strategy assume this scaling.
pub fn hsv8_pixel(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v == 0.0 { 0.0 } else { 255.0 * delta / v };
    let mut h = if delta == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [(h / 2.0) as u8, s.round() as u8, v as u8]
}

pub fn rgb_to_hsv8(img: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, px) in img.enumerate_pixels() {
        out.put_pixel(x, y, Rgb(hsv8_pixel(px.0)));
    }
    out
}

/// Edge-preserving smoothing in the mean-shift style: each pixel becomes the
/// mean of the window samples whose color sits within `color_radius`. The
/// window is subsampled so large spatial radii stay affordable.
pub fn mean_shift_smooth(img: &RgbImage, spatial_radius: u32, color_radius: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = RgbImage::new(w, h);
    let r = spatial_radius as i32;
    let step = (spatial_radius / 4).max(1) as i32;
    let color_sq = color_radius * color_radius;

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let center = img.get_pixel(x as u32, y as u32).0;
            let mut sum = [0u32; 3];
            let mut count = 0u32;

            let mut dy = -r;
            while dy <= r {
                let ny = y + dy;
                if ny >= 0 && ny < h as i32 {
                    let mut dx = -r;
                    while dx <= r {
                        let nx = x + dx;
                        if nx >= 0 && nx < w as i32 {
                            let sample = img.get_pixel(nx as u32, ny as u32).0;
                            if color_distance_sq(center, sample) <= color_sq {
                                sum[0] += sample[0] as u32;
                                sum[1] += sample[1] as u32;
                                sum[2] += sample[2] as u32;
                                count += 1;
                            }
                        }
                        dx += step;
                    }
                }
                dy += step;
            }

            let px = if count == 0 {
                center
            } else {
                [
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ]
            };
            out.put_pixel(x as u32, y as u32, Rgb(px));
        }
    }
    out
}

fn color_distance_sq(a: [u8; 3], b: [u8; 3]) -> f32 {
    let dr = a[0] as f32 - b[0] as f32;
    let dg = a[1] as f32 - b[1] as f32;
    let db = a[2] as f32 - b[2] as f32;
    dr * dr + dg * dg + db * db
}

/// Mean color over a rectangular window, clipped to the image.
pub fn window_mean(img: &RgbImage, x: i32, y: i32, w: i32, h: i32) -> [u8; 3] {
    let (iw, ih) = (img.width() as i32, img.height() as i32);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(iw);
    let y1 = (y + h).min(ih);

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for yy in y0..y1 {
        for xx in x0..x1 {
            let px = img.get_pixel(xx as u32, yy as u32).0;
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
            count += 1;
        }
    }
    if count == 0 {
        return [0, 0, 0];
    }
    [
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]
}

/// Mean color over the pixels a nonzero mask selects. An all-zero mask gives
/// black.
pub fn masked_mean(img: &RgbImage, mask: &GrayImage) -> [u8; 3] {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] > 0 {
            let c = img.get_pixel(x, y).0;
            sum[0] += c[0] as u64;
            sum[1] += c[1] as u64;
            sum[2] += c[2] as u64;
            count += 1;
        }
    }
    if count == 0 {
        return [0, 0, 0];
    }
    [
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]
}

/// Sampled content checksum. Reads every 16th pixel with a wrapping
/// multiply-accumulate; collisions are acceptable for cache keying.
pub fn content_checksum(img: &RgbImage) -> u64 {
    let mut hash: u64 = 17;
    for (i, px) in img.pixels().enumerate() {
        if i % 16 == 0 {
            let packed =
                ((px.0[0] as u64) << 16) | ((px.0[1] as u64) << 8) | px.0[2] as u64;
            hash = hash.wrapping_mul(31).wrapping_add(packed);
        }
    }
    hash
}
