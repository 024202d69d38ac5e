//! Color-vision deficiency simulation via fixed linear RGB transforms.
//!
//! These adapt names and presentation only; segmentation geometry never runs
//! through a simulated color.

use serde::{Deserialize, Serialize};

use super::namer::ColorNamer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorVision {
    Normal,
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Protanomaly,
    Deuteranomaly,
    Tritanomaly,
    Achromatopsia,
}

impl ColorVision {
    pub fn label(&self) -> &'static str {
        match self {
            ColorVision::Normal => "normal vision",
            ColorVision::Protanopia => "protanopia (red-green)",
            ColorVision::Deuteranopia => "deuteranopia (red-green)",
            ColorVision::Tritanopia => "tritanopia (blue-yellow)",
            ColorVision::Protanomaly => "protanomaly (mild red-green)",
            ColorVision::Deuteranomaly => "deuteranomaly (mild red-green)",
            ColorVision::Tritanomaly => "tritanomaly (mild blue-yellow)",
            ColorVision::Achromatopsia => "achromatopsia (no color)",
        }
    }

    fn matrix(&self) -> [[f32; 3]; 3] {
        match self {
            ColorVision::Protanopia => [
                [0.567, 0.433, 0.0],
                [0.558, 0.442, 0.0],
                [0.0, 0.242, 0.758],
            ],
            ColorVision::Deuteranopia => {
                [[0.625, 0.375, 0.0], [0.7, 0.3, 0.0], [0.0, 0.3, 0.7]]
            }
            ColorVision::Tritanopia => [
                [0.95, 0.05, 0.0],
                [0.0, 0.433, 0.567],
                [0.0, 0.475, 0.525],
            ],
            ColorVision::Protanomaly => [
                [0.817, 0.183, 0.0],
                [0.333, 0.667, 0.0],
                [0.0, 0.125, 0.875],
            ],
            ColorVision::Deuteranomaly => [
                [0.8, 0.2, 0.0],
                [0.258, 0.742, 0.0],
                [0.0, 0.142, 0.858],
            ],
            ColorVision::Tritanomaly => [
                [0.967, 0.033, 0.0],
                [0.0, 0.733, 0.267],
                [0.0, 0.183, 0.817],
            ],
            ColorVision::Achromatopsia => [
                [0.299, 0.587, 0.114],
                [0.299, 0.587, 0.114],
                [0.299, 0.587, 0.114],
            ],
            ColorVision::Normal => [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Applies this deficiency's transform to a color.
    pub fn simulate(&self, rgb: [u8; 3]) -> [u8; 3] {
        let m = self.matrix();
        let input = [rgb[0] as f32, rgb[1] as f32, rgb[2] as f32];
        let mut out = [0u8; 3];
        for (i, row) in m.iter().enumerate() {
            let v = row[0] * input[0] + row[1] * input[1] + row[2] * input[2];
            out[i] = v.clamp(0.0, 255.0) as u8;
        }
        out
    }

    /// Names a color as this viewer would perceive it.
    pub fn adapted_name(&self, rgb: [u8; 3], namer: &ColorNamer) -> String {
        format!(
            "{} (as perceived with {})",
            namer.name(self.simulate(rgb)),
            self.label()
        )
    }

    /// Whether two colors stay tellable-apart under this deficiency.
    /// Post-transform RGB Euclidean distance over 50 counts as distinct.
    pub fn distinguishable(&self, a: [u8; 3], b: [u8; 3]) -> bool {
        let ta = self.simulate(a);
        let tb = self.simulate(b);
        let dr = ta[0] as f32 - tb[0] as f32;
        let dg = ta[1] as f32 - tb[1] as f32;
        let db = ta[2] as f32 - tb[2] as f32;
        (dr * dr + dg * dg + db * db).sqrt() > 50.0
    }
}
