//! sRGB to OKLAB conversion and perceptual distance.
//!
//! OKLAB is near-uniform: Euclidean distance here tracks perceived color
//! difference far better than RGB or HSV distance does.

use serde::Serialize;

/// Color in the OKLAB space. `l` is lightness in [0, 1] for in-gamut sRGB,
/// `a` and `b` are the green-red and blue-yellow axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Oklab {
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Chroma (colorfulness). Values under ~0.05 read as gray.
    pub fn chroma(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

/// Converts an sRGB triple to OKLAB: gamma decode, linear RGB to LMS cone
/// response, cube-root compression, then the final linear map.
pub fn rgb_to_oklab(rgb: [u8; 3]) -> Oklab {
    let r = srgb_to_linear(rgb[0] as f32 / 255.0);
    let g = srgb_to_linear(rgb[1] as f32 / 255.0);
    let b = srgb_to_linear(rgb[2] as f32 / 255.0);

    let l = 0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b;
    let m = 0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b;
    let s = 0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b;

    let l_root = l.cbrt();
    let m_root = m.cbrt();
    let s_root = s.cbrt();

    Oklab::new(
        0.210_454_255_3 * l_root + 0.793_617_785_0 * m_root - 0.004_072_046_8 * s_root,
        1.977_998_495_1 * l_root - 2.428_592_205_0 * m_root + 0.450_593_709_9 * s_root,
        0.025_904_037_1 * l_root + 0.782_771_766_2 * m_root - 0.808_675_766_0 * s_root,
    )
}

/// Inverse of [`rgb_to_oklab`]. Out-of-gamut results are clamped per channel,
/// which is lossy but keeps the function total.
pub fn oklab_to_rgb(c: Oklab) -> [u8; 3] {
    let l_root = c.l * 0.999_999_998_5 + 0.396_337_777_4 * c.a + 0.215_803_757_3 * c.b;
    let m_root = c.l * 1.000_000_008_9 - 0.105_561_345_8 * c.a - 0.063_854_172_8 * c.b;
    let s_root = c.l * 1.000_000_054_7 - 0.089_484_177_5 * c.a - 1.291_485_548_0 * c.b;

    let l = l_root * l_root * l_root;
    let m = m_root * m_root * m_root;
    let s = s_root * s_root * s_root;

    let r = 4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s;
    let g = -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s;
    let b = -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s;

    [
        (linear_to_srgb(r) * 255.0).clamp(0.0, 255.0) as u8,
        (linear_to_srgb(g) * 255.0).clamp(0.0, 255.0) as u8,
        (linear_to_srgb(b) * 255.0).clamp(0.0, 255.0) as u8,
    ]
}

/// Euclidean distance in OKLAB. Cheap enough for per-pixel use; this is the
/// metric for streaming-mode comparisons and all palette lookups.
pub fn oklab_distance(c1: Oklab, c2: Oklab) -> f32 {
    let dl = c2.l - c1.l;
    let da = c2.a - c1.a;
    let db = c2.b - c1.b;
    (dl * dl + da * da + db * db).sqrt()
}

pub(crate) fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

pub(crate) fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}
