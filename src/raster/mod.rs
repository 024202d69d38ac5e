pub mod components;
pub mod contour_ops;
pub mod flood;
pub mod mask;
pub mod ops;
pub mod watershed;

pub use components::{component_stats, ComponentStats};
pub use contour_ops::{external_contours, polygon_area, TracedContour};
pub use flood::{flood_fill_fixed_range, FloodRegion};
pub use mask::{count_nonzero, in_range, invert, subtract, threshold_above};
pub use ops::{
    content_checksum, downscale_half, hsv8_pixel, lab8_pixel, masked_mean, mean_shift_smooth,
    resize_into, rgb_to_hsv8, rgb_to_lab8, scaled_dimensions, window_mean,
};
pub use watershed::watershed;
