//! Grid resampling by area averaging.
//!
//! Destination cell `i` of `n_dst` covers source samples
//! `[i·n_src/n_dst, (i+1)·n_src/n_dst)`, widened to at least one sample, so
//! downsampling averages whole blocks and upsampling replicates.

use gc_core::config::DEFAULT_CHAR_ASPECT;
use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{LumaPlane, Mask, PixelGrid};

/// Output glyph grid size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Glyph columns.
    pub cols: u32,
    /// Glyph rows.
    pub rows: u32,
}

/// Upper bound on `cols × rows` for one output grid.
pub const MAX_CELLS: u64 = 1 << 20;

impl Layout {
    /// `cols` columns, rows derived from the source aspect ratio and the
    /// glyph aspect correction.
    ///
    /// # Errors
    /// `EmptyOrMalformedGrid` when the grid would exceed [`MAX_CELLS`]
    /// (very tall sources at large widths).
    ///
    /// # Example
    /// ```
    /// use gc_ascii::resample::Layout;
    /// let layout = Layout::fit(200, 100, 80, 2.0).unwrap();
    /// assert_eq!((layout.cols, layout.rows), (80, 20));
    /// assert!(Layout::fit(1, 400, 100, 2.0).is_err());
    /// ```
    pub fn fit(src_w: u32, src_h: u32, cols: u32, char_aspect: f32) -> GlyphResult<Self> {
        let cols = cols.max(1);
        let rows = target_rows(src_w, src_h, cols, char_aspect);
        let cells = u64::from(cols) * u64::from(rows);
        if cells > MAX_CELLS {
            return Err(GlyphError::malformed(format!(
                "grille de sortie trop grande : {cols}×{rows} cellules (max {MAX_CELLS})"
            )));
        }
        Ok(Self { cols, rows })
    }
}

/// `round(cols · h / w / aspect)`, never below 1.
///
/// A non-finite or non-positive aspect falls back to the default glyph aspect.
#[must_use]
pub fn target_rows(src_w: u32, src_h: u32, cols: u32, char_aspect: f32) -> u32 {
    let aspect = if char_aspect.is_finite() && char_aspect > 0.0 {
        char_aspect
    } else {
        DEFAULT_CHAR_ASPECT
    };
    let rows = f64::from(cols) * f64::from(src_h) / f64::from(src_w.max(1)) / f64::from(aspect);
    rows.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Source index range `[start, end)` covered by destination index `i`.
#[inline(always)]
#[must_use]
pub fn block_span(i: u32, n_src: u32, n_dst: u32) -> (u32, u32) {
    let start = (u64::from(i) * u64::from(n_src) / u64::from(n_dst)) as u32;
    let end = ((u64::from(i) + 1) * u64::from(n_src) / u64::from(n_dst)) as u32;
    let start = start.min(n_src - 1);
    (start, end.max(start + 1).min(n_src))
}

fn check_target(cols: u32, rows: u32) -> GlyphResult<()> {
    if cols == 0 || rows == 0 {
        return Err(GlyphError::malformed(format!(
            "cible de rééchantillonnage nulle {cols}×{rows}"
        )));
    }
    Ok(())
}

/// Area-average `grid` down (or up) to `cols × rows`, per channel.
///
/// # Errors
/// `EmptyOrMalformedGrid` when the target has a zero dimension.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_ascii::resample::resample;
/// let grid = PixelGrid::from_raw(2, 1, Channels::Luma, vec![0, 100]).unwrap();
/// let cell = resample(&grid, 1, 1).unwrap();
/// assert_eq!(cell.as_raw(), &[50]);
/// ```
pub fn resample(grid: &PixelGrid, cols: u32, rows: u32) -> GlyphResult<PixelGrid> {
    check_target(cols, rows)?;
    let channels = grid.channels().count();
    let src = grid.as_raw();
    let src_w = grid.width() as usize;
    let mut out = Vec::with_capacity(cols as usize * rows as usize * channels);
    let mut sums = vec![0u64; channels];

    for cy in 0..rows {
        let (y0, y1) = block_span(cy, grid.height(), rows);
        for cx in 0..cols {
            let (x0, x1) = block_span(cx, grid.width(), cols);
            sums.iter_mut().for_each(|s| *s = 0);
            for y in y0..y1 {
                let row = y as usize * src_w;
                for x in x0..x1 {
                    let i = (row + x as usize) * channels;
                    for (c, sum) in sums.iter_mut().enumerate() {
                        *sum += u64::from(src[i + c]);
                    }
                }
            }
            let count = u64::from(x1 - x0) * u64::from(y1 - y0);
            out.extend(sums.iter().map(|s| ((s + count / 2) / count) as u8));
        }
    }

    PixelGrid::from_raw(cols, rows, grid.channels(), out)
}

/// Mean Rec. 601 luminance of every cell, kept in floating point.
///
/// # Errors
/// `EmptyOrMalformedGrid` when the target has a zero dimension.
pub fn resample_luma(grid: &PixelGrid, cols: u32, rows: u32) -> GlyphResult<LumaPlane> {
    check_target(cols, rows)?;
    resample_plane(&grid.luma_plane(), cols, rows)
}

/// Area-average a luminance plane.
///
/// # Errors
/// `EmptyOrMalformedGrid` when the target has a zero dimension.
pub fn resample_plane(plane: &LumaPlane, cols: u32, rows: u32) -> GlyphResult<LumaPlane> {
    check_target(cols, rows)?;
    let mut out = LumaPlane::new(cols, rows);
    for cy in 0..rows {
        let (y0, y1) = block_span(cy, plane.height, rows);
        for cx in 0..cols {
            let (x0, x1) = block_span(cx, plane.width, cols);
            let mut sum = 0.0f64;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += f64::from(plane.get(x, y));
                }
            }
            let count = f64::from(x1 - x0) * f64::from(y1 - y0);
            out.set(cx, cy, (sum / count) as f32);
        }
    }
    Ok(out)
}

/// OR-reduce a mask: a cell is set if any covered sample is set. Thin
/// features survive any downsampling factor.
///
/// # Errors
/// `EmptyOrMalformedGrid` when the target has a zero dimension.
pub fn reduce_any(mask: &Mask, cols: u32, rows: u32) -> GlyphResult<Mask> {
    check_target(cols, rows)?;
    let mut out = Mask::new(cols, rows, false);
    for cy in 0..rows {
        let (y0, y1) = block_span(cy, mask.height(), rows);
        for cx in 0..cols {
            let (x0, x1) = block_span(cx, mask.width(), cols);
            let hit = (y0..y1).any(|y| (x0..x1).any(|x| mask.get(x, y)));
            out.set(cx, cy, hit);
        }
    }
    Ok(out)
}
