use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gc_ascii::{list_converters, options_schema};
use gc_core::config::{Background, EngineConfig};
use gc_key::key_frame;
use gc_source::image::{load_image, save_png};

use crate::cli::ConverterArgs;
use crate::pipeline::ConvertJob;

/// `list` : une ligne par convertisseur, ou les descripteurs en JSON.
///
/// # Errors
/// Returns an error if stdout is closed.
pub fn list(json: bool) -> Result<()> {
    let text = if json {
        serde_json::to_string_pretty(list_converters())?
    } else {
        list_converters()
            .iter()
            .map(|c| format!("{:<12}{:<22}{}", c.id, c.name, c.description))
            .collect::<Vec<_>>()
            .join("\n")
    };
    write_output(None, &text)
}

/// `options <id>` : schéma JSON.
///
/// # Errors
/// Unknown converter.
pub fn options(id: &str) -> Result<()> {
    let schema = options_schema(id)?;
    write_output(None, &serde_json::to_string_pretty(schema)?)
}

/// `convert <image>`.
///
/// # Errors
/// Image loading, option validation or output write failures.
pub fn convert(
    config: &EngineConfig,
    image: &Path,
    args: &ConverterArgs,
    out: Option<&Path>,
) -> Result<()> {
    let job = ConvertJob::resolve(config, args)?;
    let frame = load_image(image)?;
    let text = job
        .render(&frame)
        .with_context(|| format!("Conversion de {}", image.display()))?;
    write_output(out, &text)
}

/// `key <image>` : détourage vers PNG.
///
/// # Errors
/// Unknown background name, image I/O failures.
pub fn key(
    config: &EngineConfig,
    image: &Path,
    out: Option<&Path>,
    background: Option<&str>,
    bg_color: Option<[u8; 3]>,
) -> Result<()> {
    let mut settings = config.chroma.clone();
    if let Some(name) = background {
        settings.background = Background::from_name(name).with_context(|| {
            format!("Fond inconnu '{name}' (transparent, white, black, color)")
        })?;
    }
    if let Some(color) = bg_color {
        settings.bg_color = color;
        if background.is_none() {
            settings.background = Background::Color;
        }
    }

    let frame = load_image(image)?;
    let keyed = key_frame(&frame, &settings)?;
    if !keyed.report.has_green_screen {
        log::warn!(
            "{} : pas de fond vert détecté ({:.1} %), image recopiée.",
            image.display(),
            keyed.report.background_ratio * 100.0
        );
    }

    let target = out.map_or_else(|| keyed_path(image), Path::to_path_buf);
    save_png(&keyed.frame, &target)?;
    log::info!(
        "{} → {} (fond {:.1} %)",
        image.display(),
        target.display(),
        keyed.report.background_ratio * 100.0
    );
    Ok(())
}

/// `photo.jpg` → `photo_keyed.png`, same directory.
#[must_use]
pub fn keyed_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map_or_else(|| "frame".into(), |s| s.to_string_lossy());
    image.with_file_name(format!("{stem}_keyed.png"))
}

/// Write to `out`, or stdout when `None`. A trailing newline is added.
///
/// # Errors
/// I/O failures.
pub fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("Impossible d'écrire {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::frame::{Channels, PixelGrid};

    #[test]
    fn keyed_path_sits_next_to_source() {
        assert_eq!(
            keyed_path(Path::new("shots/take.jpg")),
            PathBuf::from("shots/take_keyed.png")
        );
    }

    #[test]
    fn convert_writes_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("white.png");
        let out = dir.path().join("white.txt");
        save_png(
            &PixelGrid::filled(10, 10, Channels::Rgb, &[255, 255, 255]).unwrap(),
            &image,
        )
        .unwrap();
        let args = ConverterArgs {
            width: Some(5),
            ..ConverterArgs::default()
        };
        convert(&EngineConfig::default(), &image, &args, Some(&out)).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().next(), Some("     "));
    }

    #[test]
    fn key_writes_png_with_custom_color() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("green.png");
        save_png(
            &PixelGrid::filled(12, 12, Channels::Rgb, &[0, 255, 0]).unwrap(),
            &image,
        )
        .unwrap();
        key(&EngineConfig::default(), &image, None, None, Some([10, 20, 30])).unwrap();
        let keyed = load_image(&dir.path().join("green_keyed.png")).unwrap();
        assert_eq!(keyed.channels(), Channels::Rgb);
        assert_eq!(keyed.rgb(6, 6), (10, 20, 30));
    }

    #[test]
    fn unknown_background_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("x.png");
        let err = key(&EngineConfig::default(), &image, None, Some("plaid"), None).unwrap_err();
        assert!(err.to_string().contains("plaid"));
    }
}
