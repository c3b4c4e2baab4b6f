//! Registre statique des convertisseurs.
//!
//! The five descriptors are fixed at compile time and never mutated, so the
//! registry can be read from any thread without synchronisation.

use std::time::Instant;

use serde::Serialize;

use gc_core::config::DEFAULT_CHAR_ASPECT;
use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{GlyphGrid, PixelGrid};
use gc_core::options::{OptionKind, OptionSpec, OptionValues, ResolvedOptions};

use crate::block::{self, BlockSettings};
use crate::dither::{self, DitherSettings};
use crate::edge::{self, EdgeSettings};
use crate::luminance::{self, BrightnessSettings};
use crate::sobel::{self, SobelSettings};

/// Output width in glyph columns, shared by every converter.
pub const WIDTH_OPTION: OptionSpec = OptionSpec {
    name: "width",
    label: "Width (columns)",
    kind: OptionKind::Integer {
        default: 100,
        min: 1,
        max: 1000,
    },
};

/// Validated `width` option.
///
/// # Errors
/// `InvalidOption` if the schema has no `width` or it is not positive.
pub fn width_of(options: &ResolvedOptions) -> GlyphResult<u32> {
    let width = options.integer("width")?;
    u32::try_from(width)
        .ok()
        .filter(|w| *w > 0)
        .ok_or_else(|| GlyphError::invalid_option("width", "entier dans [1, 1000]"))
}

/// Les cinq algorithmes de conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    Brightness,
    Edge,
    Sobel,
    Block,
    Dither,
}

impl ConverterKind {
    /// Run this converter on already validated options.
    ///
    /// # Errors
    /// Propagates the converter's own errors.
    pub fn run(
        self,
        grid: &PixelGrid,
        options: &ResolvedOptions,
        char_aspect: f32,
    ) -> GlyphResult<GlyphGrid> {
        match self {
            Self::Brightness => luminance::convert_brightness(
                grid,
                &BrightnessSettings::from_options(options)?,
                char_aspect,
            ),
            Self::Edge => {
                edge::convert_edges(grid, &EdgeSettings::from_options(options)?, char_aspect)
            }
            Self::Sobel => {
                sobel::convert_sobel(grid, &SobelSettings::from_options(options)?, char_aspect)
            }
            Self::Block => {
                block::convert_block(grid, &BlockSettings::from_options(options)?, char_aspect)
            }
            Self::Dither => {
                dither::convert_dither(grid, &DitherSettings::from_options(options)?, char_aspect)
            }
        }
    }
}

/// Identifier, display name and option schema of one converter.
#[derive(Debug, Serialize)]
pub struct ConverterDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub kind: ConverterKind,
    pub options: &'static [OptionSpec],
}

/// Every converter, in display order.
pub static CONVERTERS: [ConverterDescriptor; 5] = [
    ConverterDescriptor {
        id: "brightness",
        name: "Classic ASCII",
        description: "Luminance mapped onto a dark-to-light character ramp",
        kind: ConverterKind::Brightness,
        options: &luminance::OPTIONS,
    },
    ConverterDescriptor {
        id: "edge",
        name: "Edge Detection",
        description: "Canny edges drawn as glyphs on a blank background",
        kind: ConverterKind::Edge,
        options: &edge::OPTIONS,
    },
    ConverterDescriptor {
        id: "sobel",
        name: "Sobel Directional",
        description: "Gradient direction per cell drawn as | / - \\",
        kind: ConverterKind::Sobel,
        options: &sobel::OPTIONS,
    },
    ConverterDescriptor {
        id: "block",
        name: "Braille & Blocks",
        description: "Sub-cell resolution with braille dots, half blocks or shades",
        kind: ConverterKind::Block,
        options: &block::OPTIONS,
    },
    ConverterDescriptor {
        id: "dither",
        name: "Dithering",
        description: "Error-diffusion or ordered dithering onto a character ramp",
        kind: ConverterKind::Dither,
        options: &dither::OPTIONS,
    },
];

/// All registered converters.
///
/// # Example
/// ```
/// let ids: Vec<&str> = gc_ascii::list_converters().iter().map(|c| c.id).collect();
/// assert_eq!(ids, ["brightness", "edge", "sobel", "block", "dither"]);
/// ```
#[must_use]
pub fn list_converters() -> &'static [ConverterDescriptor] {
    &CONVERTERS
}

/// Look up a converter by identifier.
///
/// # Errors
/// `UnknownConverter` if `id` is not registered.
pub fn find_converter(id: &str) -> GlyphResult<&'static ConverterDescriptor> {
    CONVERTERS
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| GlyphError::UnknownConverter { id: id.to_string() })
}

/// Option schema of `id`.
///
/// # Errors
/// `UnknownConverter` if `id` is not registered.
pub fn options_schema(id: &str) -> GlyphResult<&'static [OptionSpec]> {
    Ok(find_converter(id)?.options)
}

/// Convert with the default glyph aspect correction.
///
/// # Errors
/// `UnknownConverter`, `InvalidOption` or `UnsupportedMode`; nothing is
/// produced on error.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_core::options::OptionValues;
/// let grid = PixelGrid::filled(20, 11, Channels::Rgb, &[0, 0, 0]).unwrap();
/// let mut values = OptionValues::new();
/// values.insert("width".into(), 20_i64.into());
/// let out = gc_ascii::convert("brightness", &grid, &values).unwrap();
/// assert_eq!((out.width(), out.height()), (20, 6));
/// ```
pub fn convert(id: &str, grid: &PixelGrid, values: &OptionValues) -> GlyphResult<GlyphGrid> {
    convert_with(id, grid, values, DEFAULT_CHAR_ASPECT)
}

/// Convert with an explicit glyph aspect (glyph height / glyph width).
///
/// # Errors
/// See [`convert`].
pub fn convert_with(
    id: &str,
    grid: &PixelGrid,
    values: &OptionValues,
    char_aspect: f32,
) -> GlyphResult<GlyphGrid> {
    let descriptor = find_converter(id)?;
    let options = ResolvedOptions::resolve(descriptor.options, values)?;
    let start = Instant::now();
    let out = descriptor.kind.run(grid, &options, char_aspect)?;
    log::debug!(
        "{id}: {}×{} → {}×{} en {:?}",
        grid.width(),
        grid.height(),
        out.width(),
        out.height(),
        start.elapsed()
    );
    Ok(out)
}
