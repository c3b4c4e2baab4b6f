use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use gc_core::config::EngineConfig;
use gc_core::frame::PixelGrid;
use gc_source::folder::scan_frames;
use gc_source::image::{load_image, save_png};
use rayon::prelude::*;

use crate::cli::ConverterArgs;
use crate::commands::write_output;
use crate::pipeline::ConvertJob;

/// Nom du fichier texte de l'image `index`.
#[must_use]
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:04}.txt")
}

/// Nom du PNG détouré de l'image `index`.
#[must_use]
pub fn frame_png_name(index: usize) -> String {
    format!("frame_{index:04}.png")
}

/// Convert a stream of `(index, frame)` into `frame_NNNN.txt` files in
/// `out_dir`. With `save_frames`, the keyed frame is also written as
/// `frame_NNNN.png` (transparent where the green screen was removed).
///
/// Returns the number of frames written.
///
/// # Errors
/// Stops at the first decoding, conversion or write error.
pub fn convert_frames<I>(
    frames: I,
    job: &ConvertJob,
    save_frames: bool,
    out_dir: &Path,
) -> Result<usize>
where
    I: IntoIterator<Item = Result<(usize, PixelGrid)>>,
{
    let mut written = 0usize;
    for item in frames {
        let (index, frame) = item?;
        let keyed = job
            .apply_key(&frame)
            .with_context(|| format!("Détourage de l'image {index}"))?;
        if save_frames {
            save_png(&keyed, &out_dir.join(frame_png_name(index)))?;
        }
        let glyphs = job
            .convert_keyed(&keyed)
            .with_context(|| format!("Conversion de l'image {index}"))?;
        write_output(Some(&out_dir.join(frame_file_name(index))), &job.format(&glyphs))?;
        written += 1;
    }
    Ok(written)
}

/// `video <file>` : extraction ffmpeg, détourage, conversion image par image.
///
/// `save_frames` écrit aussi chaque image détourée en PNG.
///
/// # Errors
/// Retourne une erreur si ffprobe/ffmpeg échouent, si une option est
/// invalide ou si le dossier de sortie n'est pas inscriptible.
pub fn run_video(
    config: &EngineConfig,
    file: &Path,
    fps: f64,
    max_frames: Option<usize>,
    args: &ConverterArgs,
    save_frames: bool,
    out: Option<&Path>,
) -> Result<()> {
    #[cfg(not(feature = "video"))]
    {
        let _ = (config, file, fps, max_frames, args, save_frames, out);
        anyhow::bail!("La conversion vidéo requiert la feature 'video' (ffmpeg).");
    }

    #[cfg(feature = "video")]
    {
        use gc_source::video::FrameExtractor;

        let job = ConvertJob::resolve(config, args)?;
        let out_dir = out.map_or_else(|| sibling_dir(file, "ascii"), Path::to_path_buf);
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Impossible de créer {}", out_dir.display()))?;

        let start = Instant::now();
        let frames = FrameExtractor::open(file, fps, max_frames)?;
        let written = convert_frames(frames, &job, save_frames, &out_dir)?;

        if written == 0 {
            log::warn!("Aucune image extraite de {}", file.display());
        }
        log::info!(
            "{written} image(s) écrite(s) dans {} en {:.1?}",
            out_dir.display(),
            start.elapsed()
        );
        Ok(())
    }
}

/// `bulk <dir>` : conversion parallèle (rayon) de toutes les images d'un dossier.
///
/// Les sorties sont rattachées à leur index d'origine ; une image illisible
/// est ignorée avec un avertissement.
///
/// # Errors
/// Retourne une erreur si le dossier est illisible, si une option est
/// invalide ou si aucune image n'a pu être convertie.
pub fn run_bulk(
    config: &EngineConfig,
    dir: &Path,
    args: &ConverterArgs,
    out: Option<&Path>,
) -> Result<()> {
    let job = ConvertJob::resolve(config, args)?;
    let files = scan_frames(dir)?;
    if files.is_empty() {
        anyhow::bail!("Aucune image trouvée dans {}", dir.display());
    }
    let out_dir = out.map_or_else(|| dir.join("ascii"), Path::to_path_buf);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Impossible de créer {}", out_dir.display()))?;

    let start = Instant::now();
    let results = convert_all(&job, &files);

    let mut written = 0usize;
    for (index, (path, result)) in files.iter().zip(results).enumerate() {
        match result {
            Ok(text) => {
                write_output(Some(&out_dir.join(output_name(path, index))), &text)?;
                written += 1;
            }
            Err(e) => log::warn!("{} ignorée : {e:#}", path.display()),
        }
    }

    if written == 0 {
        anyhow::bail!("Aucune image convertie dans {}", dir.display());
    }
    log::info!(
        "{written}/{} image(s) converties dans {} en {:.1?}",
        files.len(),
        out_dir.display(),
        start.elapsed()
    );
    Ok(())
}

/// Convert every file on the rayon pool; results keep the input order.
pub fn convert_all(job: &ConvertJob, files: &[PathBuf]) -> Vec<Result<String>> {
    let mut indexed: Vec<(usize, Result<String>)> = files
        .par_iter()
        .enumerate()
        .map(|(i, path)| (i, load_image(path).and_then(|frame| job.render(&frame))))
        .collect();
    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, r)| r).collect()
}

/// `<stem>.txt`, prefixed by the index so duplicate stems from
/// sub-folders do not collide.
fn output_name(path: &Path, index: usize) -> String {
    let stem = path
        .file_stem()
        .map_or_else(|| "frame".into(), |s| s.to_string_lossy());
    format!("{index:04}_{stem}.txt")
}

#[cfg(feature = "video")]
fn sibling_dir(file: &Path, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map_or_else(|| "video".into(), |s| s.to_string_lossy());
    file.with_file_name(format!("{stem}_{suffix}"))
}
