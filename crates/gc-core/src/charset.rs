//! Glyph ramps. Every ramp is ordered darkest → brightest: a black cell maps
//! to the first glyph, a white cell to the last.

/// 10 caractères, rampe par défaut, bon contraste.
pub const RAMP_DETAILED: &str = "@%#*+=-:. ";

/// 70 caractères (Paul Bourke), résolution maximale.
pub const RAMP_EXTENDED: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// 11 caractères, minimal, sans espace final.
pub const RAMP_SIMPLE: &str = "@#S%?*+;:,.";

/// Blocs Unicode de remplissage, plein → vide.
pub const RAMP_SHADE: &str = "█▓▒░ ";

/// Names accepted by the `ramp` option, in schema order.
pub const RAMP_NAMES: &[&str] = &["detailed", "extended", "simple"];

/// Resolve a ramp option value.
///
/// # Example
/// ```
/// use gc_core::charset::{ramp_by_name, RAMP_SIMPLE};
/// assert_eq!(ramp_by_name("simple"), Some(RAMP_SIMPLE));
/// assert_eq!(ramp_by_name("nope"), None);
/// ```
#[must_use]
pub fn ramp_by_name(name: &str) -> Option<&'static str> {
    match name {
        "detailed" => Some(RAMP_DETAILED),
        "extended" => Some(RAMP_EXTENDED),
        "simple" => Some(RAMP_SIMPLE),
        _ => None,
    }
}

/// Ramp ready for per-cell lookups.
///
/// # Example
/// ```
/// use gc_core::charset::GlyphRamp;
/// let ramp = GlyphRamp::new("@. ", false);
/// assert_eq!(ramp.pick(0.0), '@');
/// assert_eq!(ramp.pick(255.0), ' ');
/// ```
#[derive(Clone, Debug)]
pub struct GlyphRamp {
    glyphs: Vec<char>,
}

impl GlyphRamp {
    /// Build from a dark → light string; `invert` reverses it.
    /// An empty string falls back to `"@ "`.
    #[must_use]
    pub fn new(ramp: &str, invert: bool) -> Self {
        let mut glyphs: Vec<char> = ramp.chars().collect();
        if glyphs.is_empty() {
            glyphs = vec!['@', ' '];
        }
        if invert {
            glyphs.reverse();
        }
        Self { glyphs }
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// `floor(L / 256 · len)` clamped to the last glyph. NaN maps to the
    /// first glyph.
    #[inline(always)]
    #[must_use]
    pub fn pick(&self, luminance: f32) -> char {
        let len = self.glyphs.len();
        let l = if luminance.is_nan() {
            0.0
        } else {
            luminance.clamp(0.0, 255.0)
        };
        let idx = ((l / 256.0 * len as f32) as usize).min(len - 1);
        self.glyphs[idx]
    }

    /// Glyph for quantisation level `level` out of `levels`, spread evenly
    /// over the ramp: `ramp[round(level · (len − 1) / (levels − 1))]`.
    #[inline(always)]
    #[must_use]
    pub fn level(&self, level: usize, levels: usize) -> char {
        let len = self.glyphs.len();
        if levels < 2 {
            return self.glyphs[0];
        }
        let level = level.min(levels - 1);
        let idx = ((level * (len - 1)) as f32 / (levels - 1) as f32).round() as usize;
        self.glyphs[idx.min(len - 1)]
    }

    /// First (darkest) glyph.
    #[must_use]
    pub fn first(&self) -> char {
        self.glyphs[0]
    }

    /// Last (brightest) glyph.
    #[must_use]
    pub fn last(&self) -> char {
        self.glyphs[self.glyphs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_maps_extremes() {
        let ramp = GlyphRamp::new(RAMP_DETAILED, false);
        assert_eq!(ramp.pick(0.0), '@');
        assert_eq!(ramp.pick(255.0), ' ');
    }

    #[test]
    fn inverted_ramp_swaps_extremes() {
        let ramp = GlyphRamp::new(RAMP_DETAILED, true);
        assert_eq!(ramp.pick(0.0), ' ');
        assert_eq!(ramp.pick(255.0), '@');
        assert_eq!((ramp.first(), ramp.last()), (' ', '@'));
    }

    #[test]
    fn ramp_monotonic() {
        let chars: Vec<char> = RAMP_EXTENDED.chars().collect();
        let ramp = GlyphRamp::new(RAMP_EXTENDED, false);
        let mut prev_idx = 0usize;
        for i in 0..=255u8 {
            let ch = ramp.pick(f32::from(i));
            let idx = chars.iter().position(|&c| c == ch).unwrap();
            assert!(idx >= prev_idx, "rampe non monotone à luminance {i}");
            prev_idx = idx;
        }
    }

    #[test]
    fn nan_degrades_to_first_glyph() {
        let ramp = GlyphRamp::new(RAMP_SIMPLE, false);
        assert_eq!(ramp.pick(f32::NAN), '@');
    }

    #[test]
    fn levels_span_whole_ramp() {
        let ramp = GlyphRamp::new(RAMP_DETAILED, false);
        assert_eq!(ramp.level(0, 2), '@');
        assert_eq!(ramp.level(1, 2), ' ');
        assert_eq!(ramp.level(9, 10), ' ');
        assert_eq!(ramp.level(1, 10), '%');
    }
}
