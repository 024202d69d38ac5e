pub mod contrast;
pub mod descriptor;
pub mod lab;
pub mod namer;
pub mod oklab;
pub mod vision;

pub use contrast::{contrast_ratio, wcag_luminance, ContrastRating};
pub use descriptor::ColorDescriptor;
pub use lab::{ciede2000_between, ciede2000_distance, rgb_to_lab, Lab};
pub use namer::ColorNamer;
pub use oklab::{oklab_distance, oklab_to_rgb, rgb_to_oklab, Oklab};
pub use vision::ColorVision;
