use gc_core::config::{Background, GreenScreenSettings};
use gc_core::frame::{Channels, PixelGrid};
use gc_key::{composite_background, detect, flatten, key_frame, segment_green_screen};

/// Green backdrop with a red disc in the middle, plus salt noise on the
/// backdrop that the cleanup passes must absorb.
fn studio_frame() -> PixelGrid {
    PixelGrid::from_fn_rgb(64, 48, |x, y| {
        let (dx, dy) = (x as i32 - 32, y as i32 - 24);
        if dx * dx + dy * dy < 144 {
            (210, 40, 40)
        } else if (x * 7 + y * 13) % 97 == 0 {
            (255, 255, 255)
        } else {
            (30, 220, 50)
        }
    })
    .unwrap()
}

#[test]
fn pure_green_is_background_and_red_is_not() {
    let settings = GreenScreenSettings::default();
    let green = PixelGrid::filled(1, 1, Channels::Rgb, &[0, 255, 0]).unwrap();
    let red = PixelGrid::filled(1, 1, Channels::Rgb, &[255, 0, 0]).unwrap();
    assert!(!segment_green_screen(&green, &settings).unwrap().get(0, 0));
    assert!(segment_green_screen(&red, &settings).unwrap().get(0, 0));
}

#[test]
fn speckles_on_backdrop_are_cleaned() {
    let frame = studio_frame();
    let mask = segment_green_screen(&frame, &GreenScreenSettings::default()).unwrap();
    assert_eq!((mask.width(), mask.height()), (64, 48));
    assert!(mask.get(32, 24));
    // Only the disc (shrunk by the background dilation) survives.
    for y in 0..48 {
        for x in 0..64 {
            let (dx, dy) = (x as i32 - 32, y as i32 - 24);
            if dx * dx + dy * dy >= 144 {
                assert!(!mask.get(x, y), "({x},{y}) kept");
            }
        }
    }
}

#[test]
fn keyed_frame_to_white_then_flatten_is_stable() {
    let frame = studio_frame();
    let settings = GreenScreenSettings {
        background: Background::White,
        ..GreenScreenSettings::default()
    };
    let keyed = key_frame(&frame, &settings).unwrap();
    assert!(keyed.report.has_green_screen);
    assert!(keyed.report.background_ratio > 0.8);
    assert_eq!(keyed.frame.rgb(0, 0), (255, 255, 255));
    assert_eq!(keyed.frame.rgb(32, 24), (210, 40, 40));
    assert_eq!(flatten(&keyed.frame, [0, 0, 0]).unwrap(), keyed.frame);
}

#[test]
fn transparent_then_flatten_matches_solid_fill() {
    let frame = studio_frame();
    let settings = GreenScreenSettings::default();
    let report = detect(&frame, &settings).unwrap();
    let rgba = composite_background(&frame, &report.mask, Background::Transparent, [0; 3]).unwrap();
    let white = composite_background(&frame, &report.mask, Background::White, [0; 3]).unwrap();
    assert_eq!(flatten(&rgba, [255, 255, 255]).unwrap(), white);
}
