//! Sub-cell converters: braille (2×4 dots per glyph), half blocks (1×2) and
//! shade blocks (one level per glyph).

use gc_core::charset::{GlyphRamp, RAMP_SHADE};
use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{Glyph, GlyphGrid, LumaPlane, PixelGrid};
use gc_core::options::{OptionKind, OptionSpec, ResolvedOptions};

use crate::braille::render_braille;
use crate::dither::{DitherAlgorithm, quantize};
use crate::halfblock::render_halfblock;
use crate::registry::{WIDTH_OPTION, width_of};
use crate::resample::{Layout, resample, resample_luma};

/// Sub-cell layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMode {
    /// 2×4 dots, U+2800–U+28FF.
    Braille,
    /// Upper/lower half blocks.
    Blocks,
    /// ░▒▓█ by cell luminance.
    Shade,
}

impl BlockMode {
    pub const NAMES: &'static [&'static str] = &["braille", "blocks", "shade"];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "braille" => Some(Self::Braille),
            "blocks" => Some(Self::Blocks),
            "shade" => Some(Self::Shade),
            _ => None,
        }
    }

    /// Sub-pixels per glyph, `(columns, rows)`.
    #[must_use]
    pub const fn subcells(self) -> (u32, u32) {
        match self {
            Self::Braille => (2, 4),
            Self::Blocks => (1, 2),
            Self::Shade => (1, 1),
        }
    }
}

/// Options of the `block` converter.
pub static OPTIONS: [OptionSpec; 6] = [
    WIDTH_OPTION,
    OptionSpec {
        name: "mode",
        label: "Mode",
        kind: OptionKind::Choice {
            default: "braille",
            choices: BlockMode::NAMES,
        },
    },
    OptionSpec {
        name: "threshold",
        label: "Threshold",
        kind: OptionKind::Integer {
            default: 128,
            min: 0,
            max: 255,
        },
    },
    OptionSpec {
        name: "invert",
        label: "Invert",
        kind: OptionKind::Toggle { default: false },
    },
    OptionSpec {
        name: "dither",
        label: "Dither sub-pixels",
        kind: OptionKind::Toggle { default: false },
    },
    OptionSpec {
        name: "color",
        label: "Colour",
        kind: OptionKind::Toggle { default: false },
    },
];

/// Paramètres validés du convertisseur braille / blocs.
#[derive(Clone, Debug)]
pub struct BlockSettings {
    pub width: u32,
    pub mode: BlockMode,
    /// A sub-pixel is on when its luminance is below this value.
    pub threshold: u8,
    pub invert: bool,
    pub dither: bool,
    pub color: bool,
}

impl BlockSettings {
    /// Read the validated options.
    ///
    /// # Errors
    /// `UnsupportedMode` if the mode has no implementation.
    pub fn from_options(options: &ResolvedOptions) -> GlyphResult<Self> {
        let name = options.choice("mode")?;
        let mode = BlockMode::from_name(name).ok_or_else(|| GlyphError::UnsupportedMode {
            option: "mode".to_string(),
            value: name.to_string(),
            supported: BlockMode::NAMES.join(", "),
        })?;
        Ok(Self {
            width: width_of(options)?,
            mode,
            threshold: options.integer("threshold")?.clamp(0, 255) as u8,
            invert: options.flag("invert")?,
            dither: options.flag("dither")?,
            color: options.flag("color")?,
        })
    }
}

/// Binary Floyd–Steinberg pass: every sample becomes 0 or 255.
fn binarize(plane: &LumaPlane) -> LumaPlane {
    let levels = quantize(plane, DitherAlgorithm::FloydSteinberg, 2);
    LumaPlane {
        width: plane.width,
        height: plane.height,
        data: levels.iter().map(|&l| if l == 0 { 0.0 } else { 255.0 }).collect(),
    }
}

/// Braille / half-block / shade conversion.
///
/// # Errors
/// `EmptyOrMalformedGrid` if the layout degenerates.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_ascii::block::{BlockMode, BlockSettings, convert_block};
/// let black = PixelGrid::filled(8, 16, Channels::Luma, &[0]).unwrap();
/// let settings = BlockSettings {
///     width: 4,
///     mode: BlockMode::Braille,
///     threshold: 128,
///     invert: false,
///     dither: false,
///     color: false,
/// };
/// let out = convert_block(&black, &settings, 2.0).unwrap();
/// assert!(out.cells().iter().all(|g| g.ch == '\u{28FF}'));
/// ```
pub fn convert_block(
    grid: &PixelGrid,
    settings: &BlockSettings,
    char_aspect: f32,
) -> GlyphResult<GlyphGrid> {
    let layout = Layout::fit(grid.width(), grid.height(), settings.width, char_aspect)?;
    let mut out = GlyphGrid::new(layout.cols, layout.rows);

    if settings.mode == BlockMode::Shade {
        let plane = resample_luma(grid, layout.cols, layout.rows)?;
        let colors = if settings.color {
            Some(resample(grid, layout.cols, layout.rows)?)
        } else {
            None
        };
        let ramp = GlyphRamp::new(RAMP_SHADE, settings.invert);
        for (y, row) in out.rows_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                let (x, y) = (x as u32, y as u32);
                *cell = Glyph {
                    ch: ramp.pick(plane.get(x, y)),
                    fg: colors.as_ref().map(|c| c.rgb(x, y)),
                    bg: None,
                };
            }
        }
        return Ok(out);
    }

    let (sx, sy) = settings.mode.subcells();
    let (pw, ph) = (layout.cols * sx, layout.rows * sy);
    let mut plane = resample_luma(grid, pw, ph)?;
    if settings.dither {
        plane = binarize(&plane);
    }
    let threshold = f32::from(settings.threshold);
    let invert = settings.invert;
    let is_on = move |l: f32| (l < threshold) != invert;

    match settings.mode {
        BlockMode::Braille => {
            let colors = if settings.color {
                Some(resample(grid, layout.cols, layout.rows)?)
            } else {
                None
            };
            render_braille(&plane, colors.as_ref(), is_on, &mut out);
        }
        BlockMode::Blocks => {
            let colors = if settings.color {
                Some(resample(grid, pw, ph)?)
            } else {
                None
            };
            render_halfblock(&plane, colors.as_ref(), is_on, &mut out);
        }
        BlockMode::Shade => {}
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::frame::Channels;

    fn settings(mode: BlockMode) -> BlockSettings {
        BlockSettings {
            width: 4,
            mode,
            threshold: 128,
            invert: false,
            dither: false,
            color: false,
        }
    }

    #[test]
    fn white_braille_is_empty_pattern() {
        let white = PixelGrid::filled(8, 16, Channels::Rgb, &[255, 255, 255]).unwrap();
        let out = convert_block(&white, &settings(BlockMode::Braille), 2.0).unwrap();
        assert!(out.cells().iter().all(|g| g.ch == '\u{2800}'));
        let mut inverted = settings(BlockMode::Braille);
        inverted.invert = true;
        let out = convert_block(&white, &inverted, 2.0).unwrap();
        assert!(out.cells().iter().all(|g| g.ch == '\u{28FF}'));
    }

    #[test]
    fn dark_top_half_gives_upper_blocks() {
        let grid = PixelGrid::from_fn_rgb(4, 4, |_, y| {
            if y < 2 { (0, 0, 0) } else { (255, 255, 255) }
        })
        .unwrap();
        let out = convert_block(&grid, &settings(BlockMode::Blocks), 2.0).unwrap();
        assert_eq!((out.width(), out.height()), (4, 2));
        assert!(out.row(0).iter().all(|g| g.ch == '█'));
        assert!(out.row(1).iter().all(|g| g.ch == ' '));
    }

    #[test]
    fn shade_spans_ramp() {
        let grid = PixelGrid::from_fn_rgb(4, 1, |x, _| {
            let v = (x * 85) as u8;
            (v, v, v)
        })
        .unwrap();
        let out = convert_block(&grid, &settings(BlockMode::Shade), 0.25).unwrap();
        assert_eq!(out.row(0)[0].ch, '█');
        assert_eq!(out.row(0)[3].ch, ' ');
    }

    #[test]
    fn color_attaches_cell_means() {
        let red = PixelGrid::filled(8, 8, Channels::Rgb, &[200, 0, 0]).unwrap();
        let mut s = settings(BlockMode::Braille);
        s.color = true;
        let out = convert_block(&red, &s, 1.0).unwrap();
        assert!(out.cells().iter().all(|g| g.fg == Some((200, 0, 0))));
    }

    #[test]
    fn dithered_mid_gray_raises_about_half_the_dots() {
        let gray = PixelGrid::filled(64, 64, Channels::Luma, &[128]).unwrap();
        let mut s = settings(BlockMode::Braille);
        s.width = 16;
        s.dither = true;
        let out = convert_block(&gray, &s, 2.0).unwrap();
        let dots: u32 = out
            .cells()
            .iter()
            .map(|g| (u32::from(g.ch) - 0x2800).count_ones())
            .sum();
        let total = out.cells().len() as f32 * 8.0;
        assert!(((dots as f32 / total) - 0.5).abs() < 0.1);
    }
}
