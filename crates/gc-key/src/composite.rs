use gc_core::config::{Background, GreenScreenSettings};
use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{Channels, Mask, PixelGrid, luminance};

use crate::segment::{KeyReport, detect};

fn check_dimensions(frame: &PixelGrid, mask: &Mask) -> GlyphResult<()> {
    if frame.width() != mask.width() || frame.height() != mask.height() {
        return Err(GlyphError::DimensionMismatch {
            left_w: frame.width(),
            left_h: frame.height(),
            right_w: mask.width(),
            right_h: mask.height(),
        });
    }
    Ok(())
}

/// Solid colour written over background pixels, `None` for transparency.
#[must_use]
pub fn fill_color(background: Background, bg_color: [u8; 3]) -> Option<[u8; 3]> {
    match background {
        Background::Transparent => None,
        Background::White => Some([255, 255, 255]),
        Background::Black => Some([0, 0, 0]),
        Background::Color => Some(bg_color),
    }
}

/// Replace background pixels (`mask == false`) of `frame`.
///
/// * `Transparent`: output is RGBA, alpha 0 on background, foreground keeps
///   its own alpha (255 for opaque inputs), RGB untouched.
/// * `White` / `Black` / `Color`: background pixels are overwritten, the
///   channel layout of `frame` is kept.
///
/// The input frame is never modified.
///
/// # Errors
/// `DimensionMismatch` if `mask` and `frame` differ in size.
///
/// # Example
/// ```
/// use gc_core::config::Background;
/// use gc_core::frame::{Channels, Mask, PixelGrid};
/// use gc_key::composite::composite;
/// let frame = PixelGrid::filled(2, 1, Channels::Rgb, &[0, 255, 0]).unwrap();
/// let mut mask = Mask::new(2, 1, false);
/// mask.set(1, 0, true);
/// let out = composite(&frame, &mask, Background::Transparent, [0; 3]).unwrap();
/// assert_eq!(out.as_raw(), &[0, 255, 0, 0, 0, 255, 0, 255]);
/// ```
pub fn composite(
    frame: &PixelGrid,
    mask: &Mask,
    background: Background,
    bg_color: [u8; 3],
) -> GlyphResult<PixelGrid> {
    check_dimensions(frame, mask)?;
    let (w, h) = (frame.width(), frame.height());

    let Some(fill) = fill_color(background, bg_color) else {
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for y in 0..h {
            for x in 0..w {
                let (r, g, b) = frame.rgb(x, y);
                let a = if mask.get(x, y) { frame.alpha(x, y) } else { 0 };
                data.extend_from_slice(&[r, g, b, a]);
            }
        }
        return PixelGrid::from_raw(w, h, Channels::Rgba, data);
    };

    let channels = frame.channels();
    let n = channels.count();
    let sample: Vec<u8> = match channels {
        Channels::Luma => vec![luminance(fill[0], fill[1], fill[2]).round() as u8],
        Channels::Rgb => fill.to_vec(),
        Channels::Rgba => vec![fill[0], fill[1], fill[2], 255],
    };
    let mut data = frame.as_raw().to_vec();
    for y in 0..h {
        for x in 0..w {
            if !mask.get(x, y) {
                let i = (y as usize * w as usize + x as usize) * n;
                data[i..i + n].copy_from_slice(&sample);
            }
        }
    }
    PixelGrid::from_raw(w, h, channels, data)
}

/// Alpha-blend `frame` over a solid colour, producing RGB. Opaque inputs
/// only change layout.
///
/// # Errors
/// Never fails for a well-formed grid.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_key::composite::flatten;
/// let clear = PixelGrid::filled(1, 1, Channels::Rgba, &[9, 9, 9, 0]).unwrap();
/// assert_eq!(flatten(&clear, [255, 255, 255]).unwrap().rgb(0, 0), (255, 255, 255));
/// ```
pub fn flatten(frame: &PixelGrid, bg: [u8; 3]) -> GlyphResult<PixelGrid> {
    let blend = |c: u8, under: u8, a: u8| -> u8 {
        let (c, under, a) = (u32::from(c), u32::from(under), u32::from(a));
        ((c * a + under * (255 - a) + 127) / 255) as u8
    };
    PixelGrid::from_fn_rgb(frame.width(), frame.height(), |x, y| {
        let (r, g, b) = frame.rgb(x, y);
        let a = frame.alpha(x, y);
        (blend(r, bg[0], a), blend(g, bg[1], a), blend(b, bg[2], a))
    })
}

/// A frame after keying, with the detection report.
#[derive(Clone, Debug)]
pub struct KeyedFrame {
    pub frame: PixelGrid,
    pub report: KeyReport,
}

/// Detect, then composite when the frame really has a green screen.
///
/// Frames below the coverage threshold pass through unchanged, except that
/// transparent output still gains an (opaque) alpha channel so every frame
/// of a sequence shares one layout.
///
/// # Errors
/// See [`composite`].
pub fn key_frame(frame: &PixelGrid, settings: &GreenScreenSettings) -> GlyphResult<KeyedFrame> {
    let report = detect(frame, settings)?;
    let keyed = if report.has_green_screen {
        composite(frame, &report.mask, settings.background, settings.bg_color)?
    } else if settings.background == Background::Transparent {
        let opaque = Mask::new(frame.width(), frame.height(), true);
        composite(frame, &opaque, Background::Transparent, settings.bg_color)?
    } else {
        log::debug!("pas de fond vert détecté, image inchangée");
        frame.clone()
    };
    Ok(KeyedFrame {
        frame: keyed,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_mask() -> Mask {
        Mask::from_fn(4, 2, |x, _| x < 2)
    }

    #[test]
    fn white_and_black_overwrite_background_only() {
        let frame = PixelGrid::filled(4, 2, Channels::Rgb, &[10, 20, 30]).unwrap();
        let white = composite(&frame, &half_mask(), Background::White, [0; 3]).unwrap();
        assert_eq!(white.rgb(0, 0), (10, 20, 30));
        assert_eq!(white.rgb(3, 1), (255, 255, 255));
        let black = composite(&frame, &half_mask(), Background::Black, [0; 3]).unwrap();
        assert_eq!(black.rgb(2, 0), (0, 0, 0));
        assert_eq!(black.channels(), Channels::Rgb);
    }

    #[test]
    fn custom_color_is_used() {
        let frame = PixelGrid::filled(4, 2, Channels::Rgb, &[1, 1, 1]).unwrap();
        let out = composite(&frame, &half_mask(), Background::Color, [12, 34, 56]).unwrap();
        assert_eq!(out.rgb(3, 0), (12, 34, 56));
    }

    #[test]
    fn transparent_adds_alpha_and_keeps_rgb() {
        let frame = PixelGrid::filled(4, 2, Channels::Rgb, &[0, 255, 0]).unwrap();
        let out = composite(&frame, &half_mask(), Background::Transparent, [0; 3]).unwrap();
        assert_eq!(out.channels(), Channels::Rgba);
        assert_eq!(out.alpha(0, 0), 255);
        assert_eq!(out.alpha(3, 0), 0);
        assert_eq!(out.rgb(3, 0), (0, 255, 0));
    }

    #[test]
    fn input_frame_is_untouched() {
        let frame = PixelGrid::filled(4, 2, Channels::Rgb, &[7, 7, 7]).unwrap();
        let before = frame.clone();
        let _ = composite(&frame, &half_mask(), Background::Black, [0; 3]).unwrap();
        assert_eq!(frame, before);
    }

    #[test]
    fn mismatched_mask_is_rejected() {
        let frame = PixelGrid::filled(3, 2, Channels::Rgb, &[0, 0, 0]).unwrap();
        let err = composite(&frame, &half_mask(), Background::White, [0; 3]).unwrap_err();
        assert!(matches!(err, GlyphError::DimensionMismatch { .. }));
    }

    #[test]
    fn luma_frames_get_gray_fill() {
        let frame = PixelGrid::filled(4, 2, Channels::Luma, &[50]).unwrap();
        let out = composite(&frame, &half_mask(), Background::White, [0; 3]).unwrap();
        assert_eq!(out.as_raw()[3], 255);
        assert_eq!(out.as_raw()[0], 50);
    }

    #[test]
    fn flatten_blends_half_alpha() {
        let frame = PixelGrid::filled(1, 1, Channels::Rgba, &[0, 0, 0, 128]).unwrap();
        let out = flatten(&frame, [255, 255, 255]).unwrap();
        assert_eq!(out.rgb(0, 0), (127, 127, 127));
    }

    #[test]
    fn key_frame_passes_through_frames_without_green() {
        let gray = PixelGrid::filled(6, 6, Channels::Rgb, &[90, 90, 90]).unwrap();
        let settings = GreenScreenSettings {
            background: Background::Black,
            ..GreenScreenSettings::default()
        };
        let keyed = key_frame(&gray, &settings).unwrap();
        assert_eq!(keyed.frame, gray);
        let transparent = key_frame(&gray, &GreenScreenSettings::default()).unwrap();
        assert_eq!(transparent.frame.channels(), Channels::Rgba);
        assert_eq!(transparent.frame.alpha(5, 5), 255);
    }
}
