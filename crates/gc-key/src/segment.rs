//! Segmentation fond vert : seuillage HSV puis nettoyage morphologique.
//!
//! Thresholding runs on the background (green) mask. Cleanup is a majority
//! filter, then erosion, then dilation, all 3×3-based and restricted to
//! in-bounds neighbours so frame borders are never treated as foreground.
//! The returned mask is inverted: `true` = foreground, kept.

use gc_core::GreenScreenSettings;
use gc_core::color::{hue_distance, rgb_to_hsv};
use gc_core::error::GlyphResult;
use gc_core::frame::{Mask, PixelGrid};

/// Outcome of [`detect`].
#[derive(Clone, Debug, PartialEq)]
pub struct KeyReport {
    /// `true` = foreground.
    pub mask: Mask,
    /// Fraction of pixels classified as background, 0.0–1.0.
    pub background_ratio: f32,
    /// `background_ratio > coverage_threshold`.
    pub has_green_screen: bool,
}

/// Raw per-pixel test: `true` where the pixel falls inside the key range.
///
/// # Example
/// ```
/// use gc_core::GreenScreenSettings;
/// use gc_key::segment::is_key_color;
/// let settings = GreenScreenSettings::default();
/// assert!(is_key_color((0, 255, 0), &settings));
/// assert!(!is_key_color((255, 0, 0), &settings));
/// ```
#[inline(always)]
#[must_use]
pub fn is_key_color((r, g, b): (u8, u8, u8), settings: &GreenScreenSettings) -> bool {
    let (h, s, v) = rgb_to_hsv(r, g, b);
    let s = s * 255.0;
    let v = v * 255.0;
    hue_distance(h, settings.hue_center) <= settings.hue_tolerance
        && s >= f32::from(settings.saturation_min)
        && s <= f32::from(settings.saturation_max)
        && v >= f32::from(settings.value_min)
        && v <= f32::from(settings.value_max)
}

/// Background candidates before cleanup.
#[must_use]
pub fn key_candidates(frame: &PixelGrid, settings: &GreenScreenSettings) -> Mask {
    Mask::from_fn(frame.width(), frame.height(), |x, y| {
        is_key_color(frame.rgb(x, y), settings)
    })
}

/// Majority vote over a `size × size` window (odd, clipped to the frame).
/// Ties keep the centre value. `size < 3` returns the mask unchanged.
#[must_use]
pub fn majority_filter(mask: &Mask, size: u32) -> Mask {
    if size < 3 {
        return mask.clone();
    }
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let half = (size | 1) as usize / 2;

    // Table de sommes cumulées, (w + 1) × (h + 1).
    let stride = w + 1;
    let mut sums = vec![0u32; stride * (h + 1)];
    for y in 0..h {
        let mut row = 0u32;
        for x in 0..w {
            row += u32::from(mask.get(x as u32, y as u32));
            sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
        }
    }

    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let (x, y) = (x as usize, y as usize);
        let (x0, x1) = (x.saturating_sub(half), (x + half + 1).min(w));
        let (y0, y1) = (y.saturating_sub(half), (y + half + 1).min(h));
        let on = sums[y1 * stride + x1] + sums[y0 * stride + x0]
            - sums[y0 * stride + x1]
            - sums[y1 * stride + x0];
        let total = ((x1 - x0) * (y1 - y0)) as u32;
        match (on * 2).cmp(&total) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => mask.get(x as u32, y as u32),
        }
    })
}

fn morph_pass(mask: &Mask, erode: bool) -> Mask {
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let (xi, yi) = (i64::from(x), i64::from(y));
        let mut neighbours = (-1..=1).flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)));
        if erode {
            neighbours.all(|(dx, dy)| mask.get_checked(xi + dx, yi + dy) != Some(false))
        } else {
            neighbours.any(|(dx, dy)| mask.get_checked(xi + dx, yi + dy) == Some(true))
        }
    })
}

/// 3×3 erosion, `iterations` times.
#[must_use]
pub fn erode(mask: &Mask, iterations: u32) -> Mask {
    (0..iterations).fold(mask.clone(), |m, _| morph_pass(&m, true))
}

/// 3×3 dilation, `iterations` times.
#[must_use]
pub fn dilate(mask: &Mask, iterations: u32) -> Mask {
    (0..iterations).fold(mask.clone(), |m, _| morph_pass(&m, false))
}

/// Cleaned background mask (`true` = green).
#[must_use]
pub fn background_mask(frame: &PixelGrid, settings: &GreenScreenSettings) -> Mask {
    let raw = key_candidates(frame, settings);
    let filtered = majority_filter(&raw, settings.median_size);
    let eroded = erode(&filtered, settings.erode_iterations);
    dilate(&eroded, settings.dilate_iterations)
}

/// Foreground mask of `frame`: `true` = keep.
///
/// # Errors
/// Never fails for a well-formed grid; the `Result` keeps the signature in
/// line with the other core operations.
///
/// # Example
/// ```
/// use gc_core::GreenScreenSettings;
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_key::segment::segment;
/// let green = PixelGrid::filled(8, 8, Channels::Rgb, &[0, 255, 0]).unwrap();
/// let mask = segment(&green, &GreenScreenSettings::default()).unwrap();
/// assert_eq!(mask.count(), 0);
/// ```
pub fn segment(frame: &PixelGrid, settings: &GreenScreenSettings) -> GlyphResult<Mask> {
    Ok(background_mask(frame, settings).inverted())
}

/// Segment and measure how much of the frame is green.
///
/// # Errors
/// See [`segment`].
pub fn detect(frame: &PixelGrid, settings: &GreenScreenSettings) -> GlyphResult<KeyReport> {
    let mask = segment(frame, settings)?;
    let total = mask.width() as usize * mask.height() as usize;
    let background = total - mask.count();
    let background_ratio = background as f32 / total as f32;
    let has_green_screen = background_ratio > settings.coverage_threshold;
    log::debug!(
        "fond vert : {:.1} % de l'image ({}×{})",
        background_ratio * 100.0,
        frame.width(),
        frame.height()
    );
    Ok(KeyReport {
        mask,
        background_ratio,
        has_green_screen,
    })
}
