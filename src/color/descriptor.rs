use std::fmt;

use serde::Serialize;

use super::contrast::{contrast_ratio, ContrastRating};

/// Everything a caller needs to present one color: the raw value, its
/// perceptual name, hex code, and WCAG contrast against a white background.
/// Built once per region and carried on the segment.
#[derive(Debug, Clone, Serialize)]
pub struct ColorDescriptor {
    pub rgb: [u8; 3],
    pub name: String,
    pub hex: String,
    pub contrast: f32,
    pub rating: ContrastRating,
}

impl ColorDescriptor {
    pub fn new(rgb: [u8; 3], name: String) -> Self {
        let contrast = contrast_ratio(rgb, [255, 255, 255]);
        Self {
            hex: format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]),
            contrast,
            rating: ContrastRating::from_ratio(contrast),
            rgb,
            name,
        }
    }
}

impl fmt::Display for ColorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, RGB({}, {}, {}))",
            self.name, self.hex, self.rgb[0], self.rgb[1], self.rgb[2]
        )
    }
}
