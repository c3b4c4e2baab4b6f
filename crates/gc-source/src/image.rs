use std::path::Path;

use anyhow::{Context, Result};
use gc_core::frame::{Channels, PixelGrid};
use image::{DynamicImage, ImageFormat};

/// Convert a decoded image: RGBA when the source carries alpha, RGB otherwise.
///
/// # Errors
/// Returns an error if the image has a zero dimension.
pub fn grid_from_image(img: &DynamicImage) -> Result<PixelGrid> {
    let grid = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        PixelGrid::from_raw(w, h, Channels::Rgba, rgba.into_raw())
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        PixelGrid::from_raw(w, h, Channels::Rgb, rgb.into_raw())
    };
    Ok(grid?)
}

/// Charge une image fixe depuis le disque.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use gc_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("test.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<PixelGrid> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let grid = grid_from_image(&img)
        .with_context(|| format!("Image vide : {}", path.display()))?;
    log::debug!(
        "image chargée {}×{} ({:?}) : {}",
        grid.width(),
        grid.height(),
        grid.channels(),
        path.display()
    );
    Ok(grid)
}

/// Écrit une grille en PNG (gris, RGB ou RGBA selon ses canaux).
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_png(grid: &PixelGrid, path: &Path) -> Result<()> {
    let (w, h) = (grid.width(), grid.height());
    let data = grid.as_raw().to_vec();
    let img = match grid.channels() {
        Channels::Luma => image::GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        Channels::Rgb => image::RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        Channels::Rgba => image::RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
    }
    .context("Tampon de pixels incohérent")?;
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::debug!("PNG écrit : {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyed.png");
        let grid = PixelGrid::filled(3, 2, Channels::Rgba, &[1, 2, 3, 0]).unwrap();
        save_png(&grid, &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn opaque_images_load_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let grid =
            PixelGrid::from_fn_rgb(4, 4, |x, y| ((x * 60) as u8, (y * 60) as u8, 7)).unwrap();
        save_png(&grid, &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back.channels(), Channels::Rgb);
        assert_eq!(back.rgb(3, 2), (180, 120, 7));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_image(Path::new("/nonexistent/frame.png")).unwrap_err();
        assert!(err.to_string().contains("Impossible de charger"));
    }
}
