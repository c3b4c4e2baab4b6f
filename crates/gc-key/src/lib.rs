//! Green-screen keying: HSV segmentation into a foreground mask, then
//! background substitution.

pub mod composite;
pub mod segment;

pub use composite::{KeyedFrame, composite, flatten, key_frame};
pub use segment::{KeyReport, detect, segment};

/// Alias of [`segment`] under its registry-facing name.
pub use segment::segment as segment_green_screen;
/// Alias of [`composite`] under its registry-facing name.
pub use composite::composite as composite_background;
