//! ASCII conversion engine for glyphcast.
//!
//! Converts pixel grids to ASCII/Unicode glyph grids through a fixed
//! registry of five converters.

pub mod block;
pub mod braille;
pub mod dither;
pub mod edge;
pub mod gradient;
pub mod halfblock;
pub mod luminance;
pub mod registry;
pub mod resample;
pub mod sobel;

pub use registry::{
    ConverterDescriptor, ConverterKind, convert, convert_with, find_converter, list_converters,
    options_schema,
};
pub use resample::{Layout, resample};
