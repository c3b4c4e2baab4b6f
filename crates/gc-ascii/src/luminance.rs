use gc_core::charset::{GlyphRamp, RAMP_NAMES, ramp_by_name};
use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{Glyph, GlyphGrid, LumaPlane, PixelGrid};
use gc_core::options::{OptionKind, OptionSpec, ResolvedOptions};

use crate::registry::{WIDTH_OPTION, width_of};
use crate::resample::{Layout, resample_luma};

/// Options of the `brightness` converter.
pub static OPTIONS: [OptionSpec; 5] = [
    WIDTH_OPTION,
    OptionSpec {
        name: "invert",
        label: "Invert",
        kind: OptionKind::Toggle { default: false },
    },
    OptionSpec {
        name: "ramp",
        label: "Character set",
        kind: OptionKind::Choice {
            default: "detailed",
            choices: RAMP_NAMES,
        },
    },
    OptionSpec {
        name: "contrast",
        label: "Contrast",
        kind: OptionKind::Range {
            default: 1.0,
            min: 0.5,
            max: 2.0,
            step: 0.1,
        },
    },
    OptionSpec {
        name: "brightness",
        label: "Brightness",
        kind: OptionKind::Range {
            default: 1.0,
            min: 0.5,
            max: 2.0,
            step: 0.1,
        },
    },
];

/// Paramètres validés du convertisseur de luminance.
#[derive(Clone, Debug)]
pub struct BrightnessSettings {
    pub width: u32,
    pub invert: bool,
    pub ramp: &'static str,
    pub contrast: f32,
    pub brightness: f32,
}

impl BrightnessSettings {
    /// Read the validated options.
    ///
    /// # Errors
    /// `InvalidOption` if `options` was not resolved against [`OPTIONS`].
    pub fn from_options(options: &ResolvedOptions) -> GlyphResult<Self> {
        let name = options.choice("ramp")?;
        let ramp = ramp_by_name(name).ok_or_else(|| GlyphError::UnsupportedMode {
            option: "ramp".to_string(),
            value: name.to_string(),
            supported: RAMP_NAMES.join(", "),
        })?;
        Ok(Self {
            width: width_of(options)?,
            invert: options.flag("invert")?,
            ramp,
            contrast: options.float("contrast")? as f32,
            brightness: options.float("brightness")? as f32,
        })
    }
}

/// Point pivot du contraste (gris moyen).
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Contrast around mid-gray, then a brightness gain, clamped to 0–255.
/// Neutral settings leave the plane untouched.
pub fn adjust_levels(plane: &mut LumaPlane, contrast: f32, brightness: f32) {
    let neutral = (contrast - 1.0).abs() < f32::EPSILON && (brightness - 1.0).abs() < f32::EPSILON;
    if neutral {
        return;
    }
    for v in &mut plane.data {
        let contrasted = (*v - CONTRAST_PIVOT) * contrast + CONTRAST_PIVOT;
        *v = (contrasted * brightness).clamp(0.0, 255.0);
    }
}

/// Classic luminance → ramp conversion.
///
/// # Errors
/// `EmptyOrMalformedGrid` if the layout degenerates.
///
/// # Example
/// ```
/// use gc_core::frame::{Channels, PixelGrid};
/// use gc_ascii::luminance::{BrightnessSettings, convert_brightness};
/// let black = PixelGrid::filled(8, 8, Channels::Rgb, &[0, 0, 0]).unwrap();
/// let settings = BrightnessSettings {
///     width: 4,
///     invert: false,
///     ramp: "@. ",
///     contrast: 1.0,
///     brightness: 1.0,
/// };
/// let out = convert_brightness(&black, &settings, 1.0).unwrap();
/// assert!(out.cells().iter().all(|g| g.ch == '@'));
/// ```
pub fn convert_brightness(
    grid: &PixelGrid,
    settings: &BrightnessSettings,
    char_aspect: f32,
) -> GlyphResult<GlyphGrid> {
    let layout = Layout::fit(grid.width(), grid.height(), settings.width, char_aspect)?;
    let mut plane = resample_luma(grid, layout.cols, layout.rows)?;
    adjust_levels(&mut plane, settings.contrast, settings.brightness);

    let ramp = GlyphRamp::new(settings.ramp, settings.invert);
    let mut out = GlyphGrid::new(layout.cols, layout.rows);
    for (y, row) in out.rows_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = Glyph::plain(ramp.pick(plane.get(x as u32, y as u32)));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::charset::RAMP_DETAILED;
    use gc_core::frame::Channels;

    fn settings(invert: bool) -> BrightnessSettings {
        BrightnessSettings {
            width: 10,
            invert,
            ramp: RAMP_DETAILED,
            contrast: 1.0,
            brightness: 1.0,
        }
    }

    #[test]
    fn white_maps_to_last_glyph_and_inverts() {
        let white = PixelGrid::filled(20, 20, Channels::Rgb, &[255, 255, 255]).unwrap();
        let plain = convert_brightness(&white, &settings(false), 2.0).unwrap();
        assert!(plain.cells().iter().all(|g| g.ch == ' '));
        let inverted = convert_brightness(&white, &settings(true), 2.0).unwrap();
        assert!(inverted.cells().iter().all(|g| g.ch == '@'));
    }

    #[test]
    fn horizontal_ramp_is_monotonic() {
        let grid = PixelGrid::from_fn_rgb(256, 4, |x, _| (x as u8, x as u8, x as u8)).unwrap();
        let out = convert_brightness(&grid, &settings(false), 64.0).unwrap();
        let ramp: Vec<char> = RAMP_DETAILED.chars().collect();
        let idx: Vec<usize> = out
            .row(0)
            .iter()
            .map(|g| ramp.iter().position(|c| *c == g.ch).unwrap())
            .collect();
        assert!(idx.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(idx[0], 0);
        assert_eq!(*idx.last().unwrap(), ramp.len() - 1);
    }

    #[test]
    fn contrast_spreads_around_mid_gray() {
        let mut plane = LumaPlane::new(2, 1);
        plane.set(0, 0, 100.0);
        plane.set(1, 0, 150.0);
        adjust_levels(&mut plane, 2.0, 1.0);
        assert!((plane.get(0, 0) - 72.0).abs() < 1e-3);
        assert!((plane.get(1, 0) - 172.0).abs() < 1e-3);
    }

    #[test]
    fn contrast_applies_to_uniform_images() {
        let gray = PixelGrid::filled(16, 16, Channels::Rgb, &[200, 200, 200]).unwrap();
        let neutral = convert_brightness(&gray, &settings(false), 2.0).unwrap();
        assert!(neutral.cells().iter().all(|g| g.ch != ' '));
        let boosted = BrightnessSettings {
            contrast: 2.0,
            ..settings(false)
        };
        let out = convert_brightness(&gray, &boosted, 2.0).unwrap();
        assert!(out.cells().iter().all(|g| g.ch == ' '));
    }

    #[test]
    fn brightness_gain_clamps() {
        let mut plane = LumaPlane::filled(3, 3, 200.0);
        adjust_levels(&mut plane, 1.0, 2.0);
        assert!(plane.data.iter().all(|v| (*v - 255.0).abs() < f32::EPSILON));
    }
}
