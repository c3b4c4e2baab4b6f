use gc_core::frame::{Glyph, GlyphGrid, LumaPlane, PixelGrid};

/// Glyph for a cell whose top/bottom halves are on/off.
///
/// # Example
/// ```
/// use gc_ascii::halfblock::halfblock_glyph;
/// assert_eq!(halfblock_glyph(true, false), '▀');
/// assert_eq!(halfblock_glyph(false, true), '▄');
/// ```
#[must_use]
pub const fn halfblock_glyph(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (true, true) => '█',
        (true, false) => '▀',
        (false, true) => '▄',
        (false, false) => ' ',
    }
}

/// Render half blocks from a `cols × 2·rows` plane.
///
/// Each cell covers 2 vertical samples. `colors`, when given, has the same
/// `cols × 2·rows` shape: the top sample's colour goes to fg, the bottom
/// sample's to bg.
pub fn render_halfblock(
    plane: &LumaPlane,
    colors: Option<&PixelGrid>,
    is_on: impl Fn(f32) -> bool,
    out: &mut GlyphGrid,
) {
    for (cy, row) in out.rows_mut().enumerate() {
        for (cx, cell) in row.iter_mut().enumerate() {
            let x = cx as u32;
            let (top_y, bottom_y) = (cy as u32 * 2, cy as u32 * 2 + 1);
            let ch = halfblock_glyph(is_on(plane.get(x, top_y)), is_on(plane.get(x, bottom_y)));
            *cell = match colors {
                Some(c) => Glyph {
                    ch,
                    fg: Some(c.rgb(x, top_y)),
                    bg: Some(c.rgb(x, bottom_y)),
                },
                None => Glyph::plain(ch),
            };
        }
    }
}
