pub mod enhance;
pub mod resize;
pub mod rotate;

pub use enhance::{enhance, EnhanceFactors};
pub use resize::{complementary_dimension, fit_dimensions, fit_to_area, resize_exact, Axis};
pub use rotate::rotate;
