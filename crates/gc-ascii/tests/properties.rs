use gc_ascii::{convert, convert_with, list_converters, options_schema};
use gc_core::GlyphError;
use gc_core::frame::{Channels, PixelGrid};
use gc_core::options::{OptionValue, OptionValues};

fn values(pairs: &[(&str, OptionValue)]) -> OptionValues {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn noise(w: u32, h: u32) -> PixelGrid {
    let mut state = 0x2545_f491_u32;
    PixelGrid::from_fn_rgb(w, h, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let b = state.to_le_bytes();
        (b[0], b[1], b[2])
    })
    .unwrap()
}

#[test]
fn output_dimensions_match_layout_for_every_converter() {
    let grid = noise(123, 77);
    for (width, aspect) in [(1, 2.0), (7, 1.0), (40, 1.0 / 0.55), (333, 0.5)] {
        let expected_rows = gc_ascii::resample::target_rows(123, 77, width, aspect);
        for c in list_converters() {
            let out = convert_with(
                c.id,
                &grid,
                &values(&[("width", i64::from(width).into())]),
                aspect,
            )
            .unwrap();
            assert_eq!(out.width(), width, "{} width {width}", c.id);
            assert_eq!(out.height(), expected_rows, "{} width {width}", c.id);
            assert_eq!(out.to_text().lines().count(), expected_rows as usize);
        }
    }
}

#[test]
fn black_and_white_hit_ramp_ends() {
    let black = PixelGrid::filled(30, 30, Channels::Rgb, &[0, 0, 0]).unwrap();
    let white = PixelGrid::filled(30, 30, Channels::Rgb, &[255, 255, 255]).unwrap();
    let w = values(&[("width", 10_i64.into())]);
    let inv = values(&[("width", 10_i64.into()), ("invert", true.into())]);

    let text = convert("brightness", &black, &w).unwrap().to_text();
    assert!(text.chars().filter(|c| *c != '\n').all(|c| c == '@'));
    let text = convert("brightness", &white, &w).unwrap().to_text();
    assert!(text.chars().filter(|c| *c != '\n').all(|c| c == ' '));
    let text = convert("brightness", &white, &inv).unwrap().to_text();
    assert!(text.chars().filter(|c| *c != '\n').all(|c| c == '@'));
    let text = convert("brightness", &black, &inv).unwrap().to_text();
    assert!(text.chars().filter(|c| *c != '\n').all(|c| c == ' '));
}

#[test]
fn blank_image_has_no_edges() {
    let flat = PixelGrid::filled(50, 50, Channels::Rgb, &[120, 60, 200]).unwrap();
    let out = convert("edge", &flat, &values(&[("width", 25_i64.into())])).unwrap();
    assert!(out.cells().iter().all(|g| g.ch == ' '));
}

#[test]
fn vertical_split_draws_a_vertical_line() {
    let split = PixelGrid::from_fn_rgb(40, 20, |x, _| {
        if x < 22 { (0, 0, 0) } else { (255, 255, 255) }
    })
    .unwrap();
    let out = convert("edge", &split, &values(&[("width", 10_i64.into())])).unwrap();
    assert!(out.height() >= 1);
    for y in 0..out.height() {
        let hits: Vec<usize> = out
            .row(y)
            .iter()
            .enumerate()
            .filter(|(_, g)| g.ch == '#')
            .map(|(x, _)| x)
            .collect();
        assert_eq!(hits, vec![5], "row {y}");
    }
}

#[test]
fn binary_dither_of_mid_gray_averages_out() {
    let gray = PixelGrid::filled(80, 80, Channels::Luma, &[128]).unwrap();
    let out = convert_with(
        "dither",
        &gray,
        &values(&[("width", 40_i64.into()), ("levels", 2_i64.into())]),
        1.0,
    )
    .unwrap();
    // Every 10×10 window tracks the source luminance.
    for wy in 0..4 {
        for wx in 0..4 {
            let mut dark = 0;
            for y in wy * 10..wy * 10 + 10 {
                for x in wx * 10..wx * 10 + 10 {
                    if out.get(x, y).ch == '@' {
                        dark += 1;
                    }
                }
            }
            assert!((35..=65).contains(&dark), "window ({wx},{wy}): {dark}");
        }
    }
}

#[test]
fn braille_extremes() {
    let black = PixelGrid::filled(16, 32, Channels::Luma, &[0]).unwrap();
    let white = PixelGrid::filled(16, 32, Channels::Luma, &[255]).unwrap();
    let w = values(&[("width", 8_i64.into())]);
    let full = convert("block", &black, &w).unwrap();
    assert!(full.cells().iter().all(|g| g.ch == '\u{28FF}'));
    let empty = convert("block", &white, &w).unwrap();
    assert!(empty.cells().iter().all(|g| g.ch == '\u{2800}'));
}

#[test]
fn negative_width_is_invalid_option() {
    let grid = noise(10, 10);
    for c in list_converters() {
        let err = convert(c.id, &grid, &values(&[("width", (-5_i64).into())])).unwrap_err();
        assert!(
            matches!(err, GlyphError::InvalidOption { ref name, .. } if name == "width"),
            "{}: {err}",
            c.id
        );
    }
}

#[test]
fn unknown_dither_variant_is_unsupported_mode() {
    let grid = noise(10, 10);
    let err = convert("dither", &grid, &values(&[("algorithm", "riemersma".into())])).unwrap_err();
    assert!(matches!(err, GlyphError::UnsupportedMode { .. }));
}

#[test]
fn unknown_converter_everywhere() {
    let grid = noise(4, 4);
    assert!(matches!(
        options_schema("halftone"),
        Err(GlyphError::UnknownConverter { .. })
    ));
    assert!(matches!(
        convert("halftone", &grid, &OptionValues::new()),
        Err(GlyphError::UnknownConverter { .. })
    ));
}

#[test]
fn conversion_is_deterministic() {
    let grid = noise(64, 48);
    for c in list_converters() {
        let a = convert(c.id, &grid, &values(&[("width", 30_i64.into())])).unwrap();
        let b = convert(c.id, &grid, &values(&[("width", 30_i64.into())])).unwrap();
        assert_eq!(a, b, "{}", c.id);
    }
}

#[test]
fn oversized_output_is_rejected_by_every_converter() {
    let tall = PixelGrid::filled(1, 400, Channels::Rgb, &[90, 90, 90]).unwrap();
    let w = values(&[("width", 100_i64.into())]);
    for c in list_converters() {
        let err = convert(c.id, &tall, &w).unwrap_err();
        assert!(
            matches!(err, GlyphError::EmptyOrMalformedGrid { .. }),
            "{}: {err}",
            c.id
        );
    }
}
