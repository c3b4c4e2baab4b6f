/// Shared types and configuration for glyphcast.
///
/// This crate contains the pixel/glyph/mask grids, the error type, glyph
/// ramps, colour math and the option schema used across the workspace.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod options;

pub use charset::GlyphRamp;
pub use config::{Background, EngineConfig, GreenScreenSettings};
pub use error::{GlyphError, GlyphResult};
pub use frame::{Channels, Glyph, GlyphGrid, LumaPlane, Mask, PixelGrid};
pub use options::{OptionKind, OptionSpec, OptionValue, OptionValues, ResolvedOptions};
