use std::fmt;
use std::fmt::Write as _;

use crate::error::{GlyphError, GlyphResult};

/// Sample layout of a [`PixelGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// One luminance sample per pixel.
    Luma,
    /// R, G, B.
    Rgb,
    /// R, G, B, A.
    Rgba,
}

impl Channels {
    /// Bytes per pixel.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Grille de pixels immuable, row-major, 8 bits par échantillon.
///
/// Dimensions always ≥ 1×1 and `data.len() == width * height * channels`;
/// both are checked at construction so converters never see a malformed grid.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// let grid = PixelGrid::filled(4, 2, Channels::Rgb, &[10, 20, 30]).unwrap();
/// assert_eq!(grid.rgb(3, 1), (10, 20, 30));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a raw sample buffer.
    ///
    /// # Errors
    /// `EmptyOrMalformedGrid` if a dimension is zero or the buffer length
    /// does not match `width × height × channels`.
    pub fn from_raw(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> GlyphResult<Self> {
        if width == 0 || height == 0 {
            return Err(GlyphError::malformed(format!(
                "dimensions nulles {width}×{height}"
            )));
        }
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(GlyphError::malformed(format!(
                "{} octets pour {width}×{height}×{} (attendu {expected})",
                data.len(),
                channels.count()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Grid where every pixel holds `sample` (one value per channel).
    ///
    /// # Errors
    /// `EmptyOrMalformedGrid` on zero dimensions or when `sample` does not
    /// have exactly one value per channel.
    pub fn filled(width: u32, height: u32, channels: Channels, sample: &[u8]) -> GlyphResult<Self> {
        if sample.len() != channels.count() {
            return Err(GlyphError::malformed(format!(
                "échantillon de {} valeurs pour {} canaux",
                sample.len(),
                channels.count()
            )));
        }
        let data = sample.repeat(width as usize * height as usize);
        Self::from_raw(width, height, channels, data)
    }

    /// Build an RGB grid by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    /// `EmptyOrMalformedGrid` on zero dimensions.
    pub fn from_fn_rgb(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> (u8, u8, u8),
    ) -> GlyphResult<Self> {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = f(x, y);
                data.extend_from_slice(&[r, g, b]);
            }
        }
        Self::from_raw(width, height, Channels::Rgb, data)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample layout.
    #[must_use]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw row-major samples.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize * self.width as usize + x as usize) * self.channels.count()
    }

    /// Accès au pixel (x, y) → (r, g, b). Luma grids expand to gray.
    #[inline(always)]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let i = self.offset(x, y);
        match self.channels {
            Channels::Luma => (self.data[i], self.data[i], self.data[i]),
            Channels::Rgb | Channels::Rgba => (self.data[i], self.data[i + 1], self.data[i + 2]),
        }
    }

    /// Alpha at (x, y); 255 for grids without an alpha channel.
    #[inline(always)]
    #[must_use]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        match self.channels {
            Channels::Rgba => self.data[self.offset(x, y) + 3],
            Channels::Luma | Channels::Rgb => 255,
        }
    }

    /// Luminance perceptuelle Rec. 601 (`0.299 R + 0.587 G + 0.114 B`), 0.0–255.0.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::{Channels, PixelGrid};
    /// let white = PixelGrid::filled(1, 1, Channels::Rgb, &[255, 255, 255]).unwrap();
    /// assert!((white.luminance(0, 0) - 255.0).abs() < 1e-3);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> f32 {
        match self.channels {
            Channels::Luma => f32::from(self.data[self.offset(x, y)]),
            Channels::Rgb | Channels::Rgba => {
                let (r, g, b) = self.rgb(x, y);
                luminance(r, g, b)
            }
        }
    }

    /// Full-resolution luminance plane.
    #[must_use]
    pub fn luma_plane(&self) -> LumaPlane {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(self.luminance(x, y));
            }
        }
        LumaPlane {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Rec. 601 luma of an RGB triple, 0.0–255.0.
#[inline(always)]
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

/// Mutable working plane of luminance values (0.0–255.0, unclamped while
/// error diffusion is running).
#[derive(Clone, Debug, PartialEq)]
pub struct LumaPlane {
    /// Width in samples.
    pub width: u32,
    /// Height in samples.
    pub height: u32,
    /// Row-major samples.
    pub data: Vec<f32>,
}

impl LumaPlane {
    /// Zero-filled plane.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Plane where every sample equals `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Sample with border replication for out-of-range coordinates.
    #[inline(always)]
    #[must_use]
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, i64::from(self.width) - 1) as u32;
        let cy = y.clamp(0, i64::from(self.height) - 1) as u32;
        self.get(cx, cy)
    }
}

/// Packed RGB triple attached to a glyph.
pub type Rgb = (u8, u8, u8);

/// Single output cell.
///
/// # Example
/// ```
/// use gc_core::frame::Glyph;
/// assert_eq!(Glyph::default().ch, ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Caractère à afficher.
    pub ch: char,
    /// Optional foreground colour (ANSI output only).
    pub fg: Option<Rgb>,
    /// Optional background colour (ANSI output only).
    pub bg: Option<Rgb>,
}

impl Glyph {
    /// Uncoloured glyph.
    #[must_use]
    pub const fn plain(ch: char) -> Self {
        Self {
            ch,
            fg: None,
            bg: None,
        }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::plain(' ')
    }
}

/// Grille de sortie, row-major. Serialises to one text line per row.
///
/// # Example
/// ```
/// use gc_core::frame::{Glyph, GlyphGrid};
/// let mut grid = GlyphGrid::new(3, 2);
/// grid.set(1, 0, Glyph::plain('#'));
/// assert_eq!(grid.to_text(), " # \n   ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    width: u32,
    height: u32,
    cells: Vec<Glyph>,
}

impl GlyphGrid {
    /// Blank grid (all spaces).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Glyph::default(); width as usize * height as usize],
        }
    }

    /// Width in glyphs.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in glyphs.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Glyph] {
        &self.cells
    }

    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, glyph: Glyph) {
        let i = y as usize * self.width as usize + x as usize;
        self.cells[i] = glyph;
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &Glyph {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Row `y` as a slice of cells.
    #[must_use]
    pub fn row(&self, y: u32) -> &[Glyph] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Mutable row slices, for converters that fill the grid row by row.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, Glyph> {
        self.cells.chunks_mut(self.width.max(1) as usize)
    }

    /// Plain UTF-8 text: rows joined by `\n`, no trailing newline, trailing
    /// spaces kept.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            out.extend(self.row(y).iter().map(|g| g.ch));
        }
        out
    }

    /// Text with 24-bit ANSI colour escapes for cells that carry colours.
    /// Uncoloured grids produce the same output as [`GlyphGrid::to_text`].
    #[must_use]
    pub fn to_ansi(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 4);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            let mut styled = false;
            for g in self.row(y) {
                if let Some((r, gr, b)) = g.fg {
                    let _ = write!(out, "\x1b[38;2;{r};{gr};{b}m");
                    styled = true;
                }
                if let Some((r, gr, b)) = g.bg {
                    let _ = write!(out, "\x1b[48;2;{r};{gr};{b}m");
                    styled = true;
                }
                out.push(g.ch);
            }
            if styled {
                out.push_str("\x1b[0m");
            }
        }
        out
    }
}

impl fmt::Display for GlyphGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Boolean per-pixel mask. `true` = foreground (kept).
///
/// # Example
/// ```
/// use gc_core::frame::Mask;
/// let mut m = Mask::new(2, 2, false);
/// m.set(1, 1, true);
/// assert_eq!(m.count(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Mask filled with `value`.
    #[must_use]
    pub fn new(width: u32, height: u32, value: bool) -> Self {
        Self {
            width,
            height,
            bits: vec![value; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)`.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = y as usize * self.width as usize + x as usize;
        self.bits[i] = value;
    }

    /// In-bounds neighbour test used by the morphology passes.
    #[inline(always)]
    #[must_use]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<bool> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            None
        } else {
            Some(self.get(x as u32, y as u32))
        }
    }

    /// Number of `true` entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Logical NOT of every entry.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_grid_rejects_zero_dimensions() {
        let err = PixelGrid::from_raw(0, 4, Channels::Rgb, Vec::new()).unwrap_err();
        assert!(matches!(err, GlyphError::EmptyOrMalformedGrid { .. }));
    }

    #[test]
    fn pixel_grid_rejects_short_buffer() {
        let err = PixelGrid::from_raw(2, 2, Channels::Rgb, vec![0; 11]).unwrap_err();
        assert!(matches!(err, GlyphError::EmptyOrMalformedGrid { .. }));
    }

    #[test]
    fn luma_grid_expands_to_gray() {
        let g = PixelGrid::from_raw(2, 1, Channels::Luma, vec![7, 200]).unwrap();
        assert_eq!(g.rgb(1, 0), (200, 200, 200));
        assert!((g.luminance(0, 0) - 7.0).abs() < f32::EPSILON);
        assert_eq!(g.alpha(0, 0), 255);
    }

    #[test]
    fn luminance_uses_rec601_weights() {
        assert!((luminance(255, 0, 0) - 76.245).abs() < 1e-3);
        assert!((luminance(0, 255, 0) - 149.685).abs() < 1e-3);
        assert!((luminance(0, 0, 255) - 29.07).abs() < 1e-3);
    }

    #[test]
    fn glyph_grid_keeps_trailing_spaces() {
        let mut grid = GlyphGrid::new(3, 2);
        grid.set(0, 0, Glyph::plain('@'));
        grid.set(0, 1, Glyph::plain('⣿'));
        assert_eq!(grid.to_text(), "@  \n⣿  ");
        assert_eq!(grid.to_string(), grid.to_text());
    }

    #[test]
    fn ansi_output_resets_colored_rows() {
        let mut grid = GlyphGrid::new(1, 1);
        grid.set(
            0,
            0,
            Glyph {
                ch: '▀',
                fg: Some((1, 2, 3)),
                bg: None,
            },
        );
        assert_eq!(grid.to_ansi(), "\x1b[38;2;1;2;3m▀\x1b[0m");
    }

    #[test]
    fn plane_clamps_out_of_range() {
        let mut p = LumaPlane::new(2, 2);
        p.set(1, 1, 9.0);
        assert!((p.get_clamped(5, 5) - 9.0).abs() < f32::EPSILON);
        assert!(p.get_clamped(-3, 0).abs() < f32::EPSILON);
    }
}
