//! Canny edge detection rendered as glyphs.
//!
//! Detection runs at source resolution. Only the finished boolean edge map is
//! reduced to the glyph grid (OR per cell), so one-pixel lines survive any
//! downsampling factor.

use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{Glyph, GlyphGrid, LumaPlane, Mask, PixelGrid};
use gc_core::options::{OptionKind, OptionSpec, ResolvedOptions};

use crate::gradient::{Gradients, gaussian_blur};
use crate::registry::{WIDTH_OPTION, width_of};
use crate::resample::{Layout, reduce_any};

/// Glyph drawn on edge cells.
pub const EDGE_GLYPH: char = '#';

/// Options of the `edge` converter.
pub static OPTIONS: [OptionSpec; 6] = [
    WIDTH_OPTION,
    OptionSpec {
        name: "low_threshold",
        label: "Low threshold",
        kind: OptionKind::Range {
            default: 50.0,
            min: 0.0,
            max: 1000.0,
            step: 1.0,
        },
    },
    OptionSpec {
        name: "high_threshold",
        label: "High threshold",
        kind: OptionKind::Range {
            default: 150.0,
            min: 0.0,
            max: 1000.0,
            step: 1.0,
        },
    },
    OptionSpec {
        name: "blur_kernel",
        label: "Blur kernel",
        kind: OptionKind::Integer {
            default: 5,
            min: 1,
            max: 15,
        },
    },
    OptionSpec {
        name: "invert",
        label: "Invert",
        kind: OptionKind::Toggle { default: false },
    },
    OptionSpec {
        name: "thicken",
        label: "Thicken edges",
        kind: OptionKind::Toggle { default: false },
    },
];

/// Paramètres validés du détecteur de contours.
#[derive(Clone, Debug)]
pub struct EdgeSettings {
    pub width: u32,
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Odd Gaussian kernel size, 1 = no smoothing.
    pub blur_kernel: usize,
    pub invert: bool,
    pub thicken: bool,
}

impl EdgeSettings {
    /// Read the validated options.
    ///
    /// # Errors
    /// `InvalidOption` when `high_threshold < low_threshold`.
    pub fn from_options(options: &ResolvedOptions) -> GlyphResult<Self> {
        let low = options.float("low_threshold")? as f32;
        let high = options.float("high_threshold")? as f32;
        if high < low {
            return Err(GlyphError::invalid_option(
                "high_threshold",
                format!("nombre ≥ low_threshold ({low})"),
            ));
        }
        let kernel = options.integer("blur_kernel")? as usize;
        Ok(Self {
            width: width_of(options)?,
            low_threshold: low,
            high_threshold: high,
            blur_kernel: kernel | 1,
            invert: options.flag("invert")?,
            thicken: options.flag("thicken")?,
        })
    }
}

/// Neighbour offsets `(behind, ahead)` along the quantised gradient direction.
#[inline(always)]
fn nms_offsets(gx: f32, gy: f32) -> ((i64, i64), (i64, i64)) {
    let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);
    if !(22.5..157.5).contains(&angle) {
        ((-1, 0), (1, 0))
    } else if angle < 67.5 {
        ((-1, -1), (1, 1))
    } else if angle < 112.5 {
        ((0, -1), (0, 1))
    } else {
        ((1, -1), (-1, 1))
    }
}

/// Full Canny pipeline at source resolution: blur, Sobel, non-maximum
/// suppression, double threshold with 8-connected hysteresis.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_ascii::edge::detect_edges;
/// let flat = PixelGrid::filled(16, 16, Channels::Luma, &[128]).unwrap();
/// assert_eq!(detect_edges(&flat, 50.0, 150.0, 5).count(), 0);
/// ```
#[must_use]
pub fn detect_edges(grid: &PixelGrid, low: f32, high: f32, blur_kernel: usize) -> Mask {
    let plane = gaussian_blur(&grid.luma_plane(), blur_kernel);
    let gradients = Gradients::compute(&plane);
    let (w, h) = (plane.width, plane.height);

    let magnitude: Vec<f32> = (0..gradients.gx.len())
        .map(|i| gradients.magnitude(i))
        .collect();
    let mag_at = |x: i64, y: i64| {
        let cx = x.clamp(0, i64::from(w) - 1) as usize;
        let cy = y.clamp(0, i64::from(h) - 1) as usize;
        magnitude[cy * w as usize + cx]
    };

    // Non-maximum suppression.
    let mut thin = LumaPlane::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let i = plane.index(x, y);
            let m = magnitude[i];
            if m <= 0.0 {
                continue;
            }
            let ((bx, by), (ax, ay)) = nms_offsets(gradients.gx[i], gradients.gy[i]);
            let (xi, yi) = (i64::from(x), i64::from(y));
            if m >= mag_at(xi + bx, yi + by) && m > mag_at(xi + ax, yi + ay) {
                thin.data[i] = m;
            }
        }
    }

    hysteresis(&thin, low, high)
}

/// Double threshold: pixels above `high` seed the map, then the map grows
/// through 8-connected pixels above `low`, however long the chain.
#[must_use]
pub fn hysteresis(thin: &LumaPlane, low: f32, high: f32) -> Mask {
    let (w, h) = (thin.width, thin.height);
    let mut edges = Mask::new(w, h, false);
    let mut stack: Vec<(u32, u32)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if thin.get(x, y) > high {
                edges.set(x, y, true);
                stack.push((x, y));
            }
        }
    }
    while let Some((x, y)) = stack.pop() {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let (nx, ny) = (i64::from(x) + dx, i64::from(y) + dy);
                if edges.get_checked(nx, ny) != Some(false) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if thin.get(nx, ny) > low {
                    edges.set(nx, ny, true);
                    stack.push((nx, ny));
                }
            }
        }
    }
    edges
}

/// 3×3 dilation; out-of-bounds neighbours are ignored.
#[must_use]
pub fn dilate(mask: &Mask) -> Mask {
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let (xi, yi) = (i64::from(x), i64::from(y));
        (-1..=1).any(|dy| (-1..=1).any(|dx| mask.get_checked(xi + dx, yi + dy) == Some(true)))
    })
}

/// Edge converter entry point.
///
/// # Errors
/// `EmptyOrMalformedGrid` if the layout degenerates.
pub fn convert_edges(
    grid: &PixelGrid,
    settings: &EdgeSettings,
    char_aspect: f32,
) -> GlyphResult<GlyphGrid> {
    let mut edges = detect_edges(
        grid,
        settings.low_threshold,
        settings.high_threshold,
        settings.blur_kernel,
    );
    if settings.thicken {
        edges = dilate(&edges);
    }
    log::debug!(
        "edge: {} pixels de contour sur {}×{}",
        edges.count(),
        grid.width(),
        grid.height()
    );

    let layout = Layout::fit(grid.width(), grid.height(), settings.width, char_aspect)?;
    let cells = reduce_any(&edges, layout.cols, layout.rows)?;
    let (on, off) = if settings.invert {
        (' ', EDGE_GLYPH)
    } else {
        (EDGE_GLYPH, ' ')
    };

    let mut out = GlyphGrid::new(layout.cols, layout.rows);
    for (y, row) in out.rows_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            let ch = if cells.get(x as u32, y as u32) { on } else { off };
            *cell = Glyph::plain(ch);
        }
    }
    Ok(out)
}
