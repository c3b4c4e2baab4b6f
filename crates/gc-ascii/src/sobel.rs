use gc_core::charset::{GlyphRamp, RAMP_DETAILED};
use gc_core::error::GlyphResult;
use gc_core::frame::{Glyph, GlyphGrid, PixelGrid};
use gc_core::options::{OptionKind, OptionSpec, ResolvedOptions};

use crate::gradient::{Gradients, gaussian_blur};
use crate::registry::{WIDTH_OPTION, width_of};
use crate::resample::{Layout, block_span, resample_luma};

/// Fraction of the strongest cell above which bold glyphs are used.
pub const STRONG_RATIO: f32 = 0.7;

/// Options of the `sobel` converter.
pub static OPTIONS: [OptionSpec; 4] = [
    WIDTH_OPTION,
    OptionSpec {
        name: "magnitude_threshold",
        label: "Magnitude threshold",
        kind: OptionKind::Range {
            default: 30.0,
            min: 0.0,
            max: 255.0,
            step: 1.0,
        },
    },
    OptionSpec {
        name: "strong_glyphs",
        label: "Bold strong edges",
        kind: OptionKind::Toggle { default: true },
    },
    OptionSpec {
        name: "shade_background",
        label: "Shade background",
        kind: OptionKind::Toggle { default: false },
    },
];

/// Paramètres validés du convertisseur Sobel.
#[derive(Clone, Debug)]
pub struct SobelSettings {
    pub width: u32,
    /// Cut-off on the 0–255 normalised cell magnitude.
    pub magnitude_threshold: f32,
    pub strong_glyphs: bool,
    pub shade_background: bool,
}

impl SobelSettings {
    /// Read the validated options.
    ///
    /// # Errors
    /// `InvalidOption` if `options` was not resolved against [`OPTIONS`].
    pub fn from_options(options: &ResolvedOptions) -> GlyphResult<Self> {
        Ok(Self {
            width: width_of(options)?,
            magnitude_threshold: options.float("magnitude_threshold")? as f32,
            strong_glyphs: options.flag("strong_glyphs")?,
            shade_background: options.flag("shade_background")?,
        })
    }
}

/// Line glyph for a gradient vector. The drawn stroke runs perpendicular to
/// the gradient; angles are folded into [0°, 180°).
///
/// # Example
/// ```
/// use gc_ascii::sobel::direction_glyph;
/// assert_eq!(direction_glyph(1.0, 0.0), '|');
/// assert_eq!(direction_glyph(0.0, 1.0), '-');
/// assert_eq!(direction_glyph(0.0, 0.0), ' ');
/// ```
#[must_use]
pub fn direction_glyph(gx: f32, gy: f32) -> char {
    if gx.abs() < 1e-6 && gy.abs() < 1e-6 {
        return ' ';
    }

    let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);

    if !(22.5..157.5).contains(&angle) {
        '|'
    } else if angle < 67.5 {
        '/'
    } else if angle < 112.5 {
        '-'
    } else {
        '\\'
    }
}

/// Bold counterpart of a line glyph.
#[must_use]
pub fn strong_glyph(ch: char) -> char {
    match ch {
        '|' => '#',
        '-' => '=',
        '/' | '\\' => '%',
        other => other,
    }
}

/// Block-mean Gx/Gy per cell, magnitude normalised by the strongest cell.
///
/// # Errors
/// `EmptyOrMalformedGrid` if the layout degenerates.
pub fn convert_sobel(
    grid: &PixelGrid,
    settings: &SobelSettings,
    char_aspect: f32,
) -> GlyphResult<GlyphGrid> {
    let layout = Layout::fit(grid.width(), grid.height(), settings.width, char_aspect)?;
    let plane = gaussian_blur(&grid.luma_plane(), 3);
    let gradients = Gradients::compute(&plane);

    let cell_count = layout.cols as usize * layout.rows as usize;
    let mut cell_gx = vec![0.0f32; cell_count];
    let mut cell_gy = vec![0.0f32; cell_count];
    let mut cell_mag = vec![0.0f32; cell_count];

    for cy in 0..layout.rows {
        let (y0, y1) = block_span(cy, plane.height, layout.rows);
        for cx in 0..layout.cols {
            let (x0, x1) = block_span(cx, plane.width, layout.cols);
            let (mut sx, mut sy) = (0.0f64, 0.0f64);
            for y in y0..y1 {
                for x in x0..x1 {
                    let i = plane.index(x, y);
                    sx += f64::from(gradients.gx[i]);
                    sy += f64::from(gradients.gy[i]);
                }
            }
            let n = f64::from(x1 - x0) * f64::from(y1 - y0);
            let c = cy as usize * layout.cols as usize + cx as usize;
            cell_gx[c] = (sx / n) as f32;
            cell_gy[c] = (sy / n) as f32;
            cell_mag[c] = cell_gx[c].hypot(cell_gy[c]);
        }
    }

    let max = cell_mag.iter().copied().fold(0.0f32, f32::max);
    // Uniform image: nothing to normalise against.
    let scale = if max > 1e-3 { 255.0 / max } else { 0.0 };

    let shade = if settings.shade_background {
        Some((
            GlyphRamp::new(RAMP_DETAILED, false),
            resample_luma(grid, layout.cols, layout.rows)?,
        ))
    } else {
        None
    };

    let mut out = GlyphGrid::new(layout.cols, layout.rows);
    for (y, row) in out.rows_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            let c = y * layout.cols as usize + x;
            let norm = cell_mag[c] * scale;
            let ch = if norm > 0.0 && norm >= settings.magnitude_threshold {
                let ch = direction_glyph(cell_gx[c], cell_gy[c]);
                if settings.strong_glyphs && norm > STRONG_RATIO * 255.0 {
                    strong_glyph(ch)
                } else {
                    ch
                }
            } else if let Some((ramp, luma)) = &shade {
                // Fond estompé : les zones sombres restent clairsemées.
                ramp.pick(255.0 - luma.get(x as u32, y as u32))
            } else {
                ' '
            };
            *cell = Glyph::plain(ch);
        }
    }
    Ok(out)
}
