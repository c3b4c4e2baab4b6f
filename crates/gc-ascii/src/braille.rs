use gc_core::frame::{Glyph, GlyphGrid, LumaPlane, PixelGrid};

/// Braille base codepoint (U+2800).
pub const BRAILLE_BASE: u32 = 0x2800;

/// Bit of each sub-pixel, indexed `[row][column]` inside the 2×4 cell.
///
/// Dot numbering of the Unicode Braille Patterns block:
/// ```text
///  1 4      bit0 bit3
///  2 5  →   bit1 bit4
///  3 6      bit2 bit5
///  7 8      bit6 bit7
/// ```
pub const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Encode a 2×4 block, given as `dots[row][column]`, into one braille glyph.
///
/// # Example
/// ```
/// use gc_ascii::braille::encode_braille;
/// assert_eq!(encode_braille([[false; 2]; 4]), '\u{2800}'); // empty
/// assert_eq!(encode_braille([[true; 2]; 4]), '\u{28FF}'); // full
/// ```
#[must_use]
pub fn encode_braille(dots: [[bool; 2]; 4]) -> char {
    let mut code = 0u32;
    for (row, bits) in dots.iter().zip(DOT_BITS.iter()) {
        for (&on, &bit) in row.iter().zip(bits.iter()) {
            if on {
                code |= u32::from(bit);
            }
        }
    }
    char::from_u32(BRAILLE_BASE + code).unwrap_or(' ')
}

/// Render braille glyphs from a `2·cols × 4·rows` sub-pixel plane.
///
/// A dot is raised when `is_on(luminance)` holds. `colors`, when given, is
/// the `cols × rows` cell-mean grid used as foreground colour.
pub fn render_braille(
    plane: &LumaPlane,
    colors: Option<&PixelGrid>,
    is_on: impl Fn(f32) -> bool,
    out: &mut GlyphGrid,
) {
    for (cy, row) in out.rows_mut().enumerate() {
        for (cx, cell) in row.iter_mut().enumerate() {
            let mut dots = [[false; 2]; 4];
            for (dy, dot_row) in dots.iter_mut().enumerate() {
                for (dx, dot) in dot_row.iter_mut().enumerate() {
                    let px = (cx * 2 + dx) as u32;
                    let py = (cy * 4 + dy) as u32;
                    *dot = is_on(plane.get(px, py));
                }
            }
            *cell = Glyph {
                ch: encode_braille(dots),
                fg: colors.map(|c| c.rgb(cx as u32, cy as u32)),
                bg: None,
            };
        }
    }
}
