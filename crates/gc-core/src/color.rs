/// Convertit RGB [0,255] → HSV. H ∈ [0.0, 360.0), S ∈ [0.0, 1.0], V ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use gc_core::color::rgb_to_hsv;
/// let (h, s, v) = rgb_to_hsv(0, 255, 0);
/// assert!((h - 120.0).abs() < 0.01);
/// assert!((s - 1.0).abs() < 0.01);
/// assert!((v - 1.0).abs() < 0.01);
/// ```
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

/// Distance angulaire entre deux teintes, en degrés, ∈ [0, 180].
///
/// # Example
/// ```
/// use gc_core::color::hue_distance;
/// assert!((hue_distance(350.0, 10.0) - 20.0).abs() < 1e-4);
/// ```
#[inline(always)]
#[must_use]
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}
