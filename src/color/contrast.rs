use serde::Serialize;

/// WCAG conformance bucket for a contrast ratio against white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContrastRating {
    Aaa,
    Aa,
    A,
    Low,
}

impl ContrastRating {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio >= 7.0 {
            ContrastRating::Aaa
        } else if ratio >= 4.5 {
            ContrastRating::Aa
        } else if ratio >= 3.0 {
            ContrastRating::A
        } else {
            ContrastRating::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContrastRating::Aaa => "AAA",
            ContrastRating::Aa => "AA",
            ContrastRating::A => "A",
            ContrastRating::Low => "low",
        }
    }
}

/// WCAG relative luminance of an sRGB color, in [0, 1].
pub fn wcag_luminance(rgb: [u8; 3]) -> f32 {
    let channel = |v: u8| {
        let v = v as f32 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(rgb[0]) + 0.7152 * channel(rgb[1]) + 0.0722 * channel(rgb[2])
}

/// WCAG contrast ratio between two colors, in [1, 21].
pub fn contrast_ratio(a: [u8; 3], b: [u8; 3]) -> f32 {
    let la = wcag_luminance(a);
    let lb = wcag_luminance(b);
    let lighter = la.max(lb);
    let darker = la.min(lb);
    (lighter + 0.05) / (darker + 0.05)
}
