//! Quantisation par diffusion d'erreur et tramage ordonné.
//!
//! Error diffusion visits cells strictly row-major, left to right, top to
//! bottom: each cell reads error pushed by cells already visited, so the
//! loop cannot be split across threads without changing the output.

use gc_core::charset::{GlyphRamp, RAMP_NAMES, ramp_by_name};
use gc_core::error::{GlyphError, GlyphResult};
use gc_core::frame::{Glyph, GlyphGrid, LumaPlane, PixelGrid};
use gc_core::options::{OptionKind, OptionSpec, ResolvedOptions};

use crate::registry::{WIDTH_OPTION, width_of};
use crate::resample::{Layout, resample_luma};

/// Matrice de Bayer 4x4. Normalisée sur 16 niveaux (0-15).
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Error-diffusion kernel: `(dx, dy, weight)` taps, weights over `divisor`.
#[derive(Clone, Copy, Debug)]
pub struct DiffusionKernel {
    pub taps: &'static [(i32, i32, f32)],
    pub divisor: f32,
}

/// 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right.
pub const FLOYD_STEINBERG: DiffusionKernel = DiffusionKernel {
    taps: &[(1, 0, 7.0), (-1, 1, 3.0), (0, 1, 5.0), (1, 1, 1.0)],
    divisor: 16.0,
};

/// Atkinson pushes only 6/8 of the error; the rest is dropped.
pub const ATKINSON: DiffusionKernel = DiffusionKernel {
    taps: &[
        (1, 0, 1.0),
        (2, 0, 1.0),
        (-1, 1, 1.0),
        (0, 1, 1.0),
        (1, 1, 1.0),
        (0, 2, 1.0),
    ],
    divisor: 8.0,
};

pub const JARVIS_JUDICE_NINKE: DiffusionKernel = DiffusionKernel {
    taps: &[
        (1, 0, 7.0),
        (2, 0, 5.0),
        (-2, 1, 3.0),
        (-1, 1, 5.0),
        (0, 1, 7.0),
        (1, 1, 5.0),
        (2, 1, 3.0),
        (-2, 2, 1.0),
        (-1, 2, 3.0),
        (0, 2, 5.0),
        (1, 2, 3.0),
        (2, 2, 1.0),
    ],
    divisor: 48.0,
};

pub const STUCKI: DiffusionKernel = DiffusionKernel {
    taps: &[
        (1, 0, 8.0),
        (2, 0, 4.0),
        (-2, 1, 2.0),
        (-1, 1, 4.0),
        (0, 1, 8.0),
        (1, 1, 4.0),
        (2, 1, 2.0),
        (-2, 2, 1.0),
        (-1, 2, 2.0),
        (0, 2, 4.0),
        (1, 2, 2.0),
        (2, 2, 1.0),
    ],
    divisor: 42.0,
};

/// Algorithme de tramage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DitherAlgorithm {
    FloydSteinberg,
    Atkinson,
    JarvisJudiceNinke,
    Stucki,
    /// Bayer 4×4 threshold map, no carried state.
    Ordered,
}

impl DitherAlgorithm {
    /// Identifiers accepted by the `algorithm` option.
    pub const NAMES: &'static [&'static str] = &[
        "floyd-steinberg",
        "atkinson",
        "jarvis-judice-ninke",
        "stucki",
        "ordered",
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "floyd-steinberg" => Some(Self::FloydSteinberg),
            "atkinson" => Some(Self::Atkinson),
            "jarvis-judice-ninke" => Some(Self::JarvisJudiceNinke),
            "stucki" => Some(Self::Stucki),
            "ordered" => Some(Self::Ordered),
            _ => None,
        }
    }

    /// Diffusion kernel, `None` for ordered dithering.
    #[must_use]
    pub fn kernel(self) -> Option<DiffusionKernel> {
        match self {
            Self::FloydSteinberg => Some(FLOYD_STEINBERG),
            Self::Atkinson => Some(ATKINSON),
            Self::JarvisJudiceNinke => Some(JARVIS_JUDICE_NINKE),
            Self::Stucki => Some(STUCKI),
            Self::Ordered => None,
        }
    }
}

/// Nearest of `levels` evenly spaced levels over 0–255.
#[inline(always)]
fn nearest_level(value: f32, step: f32, levels: usize) -> usize {
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 255.0) };
    ((v / step).round() as usize).min(levels - 1)
}

/// Quantise every sample of `plane` to a level index in `0..levels`.
///
/// The plane is copied into a local working buffer; the caller's plane is
/// left untouched.
///
/// # Example
/// ```
/// use gc_core::frame::LumaPlane;
/// use gc_ascii::dither::{DitherAlgorithm, quantize};
/// let plane = LumaPlane::filled(4, 1, 255.0);
/// assert_eq!(quantize(&plane, DitherAlgorithm::FloydSteinberg, 2), vec![1; 4]);
/// ```
#[must_use]
pub fn quantize(plane: &LumaPlane, algorithm: DitherAlgorithm, levels: usize) -> Vec<usize> {
    let levels = levels.max(2);
    let step = 255.0 / (levels - 1) as f32;

    let Some(kernel) = algorithm.kernel() else {
        return quantize_ordered(plane, step, levels);
    };

    let (w, h) = (i64::from(plane.width), i64::from(plane.height));
    let mut buffer = plane.data.clone();
    let mut out = vec![0usize; buffer.len()];

    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            let old = buffer[i];
            let level = nearest_level(old, step, levels);
            out[i] = level;
            let error = if old.is_finite() { old - level as f32 * step } else { 0.0 };
            if error.abs() < f32::EPSILON {
                continue;
            }
            for &(dx, dy, weight) in kernel.taps {
                let (nx, ny) = (x + i64::from(dx), y + i64::from(dy));
                if nx < 0 || nx >= w || ny >= h {
                    continue;
                }
                buffer[(ny * w + nx) as usize] += error * weight / kernel.divisor;
            }
        }
    }
    out
}

fn quantize_ordered(plane: &LumaPlane, step: f32, levels: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(plane.data.len());
    for y in 0..plane.height {
        for x in 0..plane.width {
            let bayer = f32::from(BAYER_4X4[(y % 4) as usize][(x % 4) as usize]);
            // Centre la pondération entre -0.5 et +0.5 d'un palier.
            let offset = ((bayer + 0.5) / 16.0 - 0.5) * step;
            out.push(nearest_level(plane.get(x, y) + offset, step, levels));
        }
    }
    out
}

/// Options of the `dither` converter.
pub static OPTIONS: [OptionSpec; 5] = [
    WIDTH_OPTION,
    OptionSpec {
        name: "algorithm",
        label: "Algorithm",
        kind: OptionKind::Choice {
            default: "floyd-steinberg",
            choices: DitherAlgorithm::NAMES,
        },
    },
    OptionSpec {
        name: "levels",
        label: "Levels",
        kind: OptionKind::Integer {
            default: 10,
            min: 2,
            max: 20,
        },
    },
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
];

/// Paramètres validés du convertisseur de tramage.
#[derive(Clone, Debug)]
pub struct DitherSettings {
    pub width: u32,
    pub algorithm: DitherAlgorithm,
    pub levels: usize,
    pub invert: bool,
    pub ramp: &'static str,
}

impl DitherSettings {
    /// Read the validated options.
    ///
    /// # Errors
    /// `UnsupportedMode` if the algorithm or ramp has no implementation.
    pub fn from_options(options: &ResolvedOptions) -> GlyphResult<Self> {
        let name = options.choice("algorithm")?;
        let algorithm =
            DitherAlgorithm::from_name(name).ok_or_else(|| GlyphError::UnsupportedMode {
                option: "algorithm".to_string(),
                value: name.to_string(),
                supported: DitherAlgorithm::NAMES.join(", "),
            })?;
        let ramp_name = options.choice("ramp")?;
        let ramp = ramp_by_name(ramp_name).ok_or_else(|| GlyphError::UnsupportedMode {
            option: "ramp".to_string(),
            value: ramp_name.to_string(),
            supported: RAMP_NAMES.join(", "),
        })?;
        Ok(Self {
            width: width_of(options)?,
            algorithm,
            levels: options.integer("levels")? as usize,
            invert: options.flag("invert")?,
            ramp,
        })
    }
}

/// Dither the resampled luminance and map each level onto the ramp.
///
/// # Errors
/// `EmptyOrMalformedGrid` if the layout degenerates.
pub fn convert_dither(
    grid: &PixelGrid,
    settings: &DitherSettings,
    char_aspect: f32,
) -> GlyphResult<GlyphGrid> {
    let layout = Layout::fit(grid.width(), grid.height(), settings.width, char_aspect)?;
    let plane = resample_luma(grid, layout.cols, layout.rows)?;
    let levels = quantize(&plane, settings.algorithm, settings.levels);
    let ramp = GlyphRamp::new(settings.ramp, settings.invert);

    let mut out = GlyphGrid::new(layout.cols, layout.rows);
    for (cell, &level) in out.rows_mut().flatten().zip(&levels) {
        *cell = Glyph::plain(ramp.level(level, settings.levels));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_fraction(levels: &[usize]) -> f32 {
        levels.iter().filter(|&&l| l == 1).count() as f32 / levels.len() as f32
    }

    #[test]
    fn kernels_sum_to_divisor_except_atkinson() {
        for k in [FLOYD_STEINBERG, JARVIS_JUDICE_NINKE, STUCKI] {
            let sum: f32 = k.taps.iter().map(|t| t.2).sum();
            assert!((sum - k.divisor).abs() < f32::EPSILON);
        }
        let atkinson: f32 = ATKINSON.taps.iter().map(|t| t.2).sum();
        assert!((atkinson - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mid_gray_binary_density_tracks_luminance() {
        let plane = LumaPlane::filled(64, 32, 128.0);
        for algorithm in [
            DitherAlgorithm::FloydSteinberg,
            DitherAlgorithm::JarvisJudiceNinke,
            DitherAlgorithm::Stucki,
            DitherAlgorithm::Ordered,
        ] {
            let levels = quantize(&plane, algorithm, 2);
            let density = on_fraction(&levels);
            assert!((density - 0.5).abs() < 0.05, "{algorithm:?}: {density}");
        }
    }

    #[test]
    fn floyd_steinberg_alternates_on_mid_gray() {
        let plane = LumaPlane::filled(16, 1, 128.0);
        let levels = quantize(&plane, DitherAlgorithm::FloydSteinberg, 2);
        assert!(levels.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn extremes_never_dither() {
        let black = LumaPlane::filled(8, 8, 0.0);
        assert!(quantize(&black, DitherAlgorithm::Atkinson, 4).iter().all(|&l| l == 0));
        let white = LumaPlane::filled(8, 8, 255.0);
        assert!(quantize(&white, DitherAlgorithm::Ordered, 4).iter().all(|&l| l == 3));
    }

    #[test]
    fn caller_plane_is_not_mutated() {
        let plane = LumaPlane::filled(5, 5, 100.0);
        let before = plane.clone();
        let _ = quantize(&plane, DitherAlgorithm::Stucki, 3);
        assert_eq!(plane, before);
    }

    #[test]
    fn unknown_algorithm_name() {
        assert_eq!(DitherAlgorithm::from_name("riemersma"), None);
        assert_eq!(
            DitherAlgorithm::from_name("atkinson"),
            Some(DitherAlgorithm::Atkinson)
        );
    }
}
