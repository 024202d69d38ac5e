//! CIE-Lab conversion and the CIEDE2000 difference formula.

use super::oklab::{oklab_to_rgb, srgb_to_linear, Oklab};

/// Color in CIE-Lab (D65 white point). `l` in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// sRGB to CIE-Lab via XYZ under D65.
pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let r = srgb_to_linear(rgb[0] as f32 / 255.0);
    let g = srgb_to_linear(rgb[1] as f32 / 255.0);
    let b = srgb_to_linear(rgb[2] as f32 / 255.0);

    let x = (r * 0.412_456_4 + g * 0.357_576_1 + b * 0.180_437_5) / 0.950_47;
    let y = r * 0.212_672_9 + g * 0.715_152_2 + b * 0.072_175_0;
    let z = (r * 0.019_333_9 + g * 0.119_192_0 + b * 0.950_304_1) / 1.088_83;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

fn lab_f(t: f32) -> f32 {
    if t > 0.008_856 {
        t.powf(1.0 / 3.0)
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// CIEDE2000 between two OKLAB colors. Round-trips through sRGB and CIE-Lab;
/// the indirection is intentional and slightly shifts results versus a direct
/// conversion, so keep it when comparing against stored distances.
pub fn ciede2000_between(c1: Oklab, c2: Oklab) -> f32 {
    let lab1 = rgb_to_lab(oklab_to_rgb(c1));
    let lab2 = rgb_to_lab(oklab_to_rgb(c2));
    ciede2000_distance(lab1, lab2)
}

/// Full CIEDE2000 formula: G-factor gamut compensation, hue-dependent
/// weighting T, and the rotation term RT. Internals run in f64 so the result
/// holds against published reference values.
pub fn ciede2000_distance(lab1: Lab, lab2: Lab) -> f32 {
    use std::f64::consts::PI;

    let (l1, a1, b1) = (lab1.l as f64, lab1.a as f64, lab1.b as f64);
    let (l2, a2, b2) = (lab2.l as f64, lab2.a as f64, lab2.b as f64);

    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let c_bar = (c1 + c2) / 2.0;

    let g = 0.5 * (1.0 - (c_bar.powi(7) / (c_bar.powi(7) + 25.0_f64.powi(7))).sqrt());
    let a1p = a1 * (1.0 + g);
    let a2p = a2 * (1.0 + g);

    let c1p = (a1p * a1p + b1 * b1).sqrt();
    let c2p = (a2p * a2p + b2 * b2).sqrt();

    let h1p = hue_angle(a1p, b1);
    let h2p = hue_angle(a2p, b2);

    let dl_p = l2 - l1;
    let dc_p = c2p - c1p;

    let dh_p = if c1p * c2p == 0.0 {
        0.0
    } else {
        let mut d = h2p - h1p;
        if d > PI {
            d -= 2.0 * PI;
        }
        if d < -PI {
            d += 2.0 * PI;
        }
        d
    };
    let dhh_p = 2.0 * (c1p * c2p).sqrt() * (dh_p / 2.0).sin();

    let l_bar = (l1 + l2) / 2.0;
    let cp_bar = (c1p + c2p) / 2.0;

    let hp_bar = if c1p * c2p == 0.0 {
        h1p + h2p
    } else {
        let mut mean = (h1p + h2p) / 2.0;
        if (h1p - h2p).abs() > PI {
            if mean < PI {
                mean += PI;
            } else {
                mean -= PI;
            }
        }
        mean
    };

    let t = 1.0 - 0.17 * (hp_bar - PI / 6.0).cos() + 0.24 * (2.0 * hp_bar).cos()
        + 0.32 * (3.0 * hp_bar + PI / 30.0).cos()
        - 0.20 * (4.0 * hp_bar - 63.0 * PI / 180.0).cos();

    let sl = 1.0 + (0.015 * (l_bar - 50.0).powi(2)) / (20.0 + (l_bar - 50.0).powi(2)).sqrt();
    let sc = 1.0 + 0.045 * cp_bar;
    let sh = 1.0 + 0.015 * cp_bar * t;

    let rt = -2.0
        * (cp_bar.powi(7) / (cp_bar.powi(7) + 25.0_f64.powi(7))).sqrt()
        * (60.0 * PI / 180.0 * (-((hp_bar - 275.0 * PI / 180.0) / (25.0 * PI / 180.0)).powi(2)).exp())
            .sin();

    let de = ((dl_p / sl).powi(2)
        + (dc_p / sc).powi(2)
        + (dhh_p / sh).powi(2)
        + rt * (dc_p / sc) * (dhh_p / sh))
        .sqrt();

    de as f32
}

fn hue_angle(ap: f64, b: f64) -> f64 {
    use std::f64::consts::PI;
    if ap.abs() + b.abs() == 0.0 {
        return 0.0;
    }
    let h = b.atan2(ap);
    if h < 0.0 {
        h + 2.0 * PI
    } else {
        h
    }
}
