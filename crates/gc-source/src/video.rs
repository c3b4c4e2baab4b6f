// Décodage vidéo via ffmpeg/ffprobe en subprocess (std::process::Command).
// Prérequis : `ffmpeg` et `ffprobe` accessibles dans PATH.
//
//   - `probe_video`       : interroge ffprobe (width/height/fps/nb_frames)
//   - `spawn_ffmpeg_pipe` : lance ffmpeg → flux raw RGB24 sur stdout
//   - `FrameExtractor`    : itérateur qui garde une image sur `frame_step`

use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use gc_core::frame::{Channels, PixelGrid};

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0, 60.0).
    pub fps: f64,
    /// Nombre d'images annoncé par le conteneur, s'il est connu.
    pub frame_count: Option<u64>,
}

/// Parse la sortie `default=noprint_wrappers=1` de ffprobe.
///
/// # Errors
/// Retourne une erreur si la largeur ou la hauteur est absente ou nulle.
///
/// # Example
/// ```
/// use gc_source::video::parse_probe_output;
/// let info = parse_probe_output("width=640\nheight=360\nr_frame_rate=30000/1001\n").unwrap();
/// assert_eq!(info.width, 640);
/// assert!((info.fps - 29.97).abs() < 0.01);
/// ```
pub fn parse_probe_output(text: &str) -> Result<VideoInfo> {
    let mut width: u32 = 0;
    let mut height: u32 = 0;
    let mut fps: f64 = 30.0;
    let mut frame_count = None;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "24/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 && num > 0.0 {
                fps = num / den;
            }
        } else if let Some(val) = line.strip_prefix("nb_frames=") {
            // "N/A" pour certains conteneurs (mkv, flux).
            frame_count = val.trim().parse().ok().filter(|n: &u64| *n > 0);
        }
    }

    if width == 0 || height == 0 {
        bail!("Aucun flux vidéo décodable (dimensions {width}×{height})");
    }
    Ok(VideoInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier
/// ne contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context(
            "Impossible de lancer ffprobe. Vérifiez que ffprobe est installé et dans le PATH.",
        )?;

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("ffprobe : {}", path.display()))?;
    log::info!(
        "Vidéo : {}×{} @ {:.3} fps ({} images) : {}",
        info.width,
        info.height,
        info.fps,
        info.frame_count
            .map_or_else(|| "?".to_string(), |n| n.to_string()),
        path.display()
    );
    Ok(info)
}

/// Pas d'extraction : une image sur `max(1, floor(video_fps / target_fps))`.
///
/// A non-positive or non-finite target keeps every frame.
///
/// # Example
/// ```
/// use gc_source::video::frame_step;
/// assert_eq!(frame_step(30.0, 10.0), 3);
/// assert_eq!(frame_step(24.0, 10.0), 2);
/// assert_eq!(frame_step(10.0, 30.0), 1);
/// ```
#[must_use]
pub fn frame_step(video_fps: f64, target_fps: f64) -> usize {
    if !target_fps.is_finite() || target_fps <= 0.0 || !video_fps.is_finite() {
        return 1;
    }
    ((video_fps / target_fps).floor() as usize).max(1)
}

/// Lance ffmpeg en sortie raw RGB24 sur stdout, à la cadence native.
///
/// # Errors
/// Retourne une erreur si ffmpeg ne peut pas être lancé.
pub fn spawn_ffmpeg_pipe(path: &Path) -> Result<Child> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;
    Command::new("ffmpeg")
        .args([
            "-i",
            path_str,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez que ffmpeg est installé et dans le PATH.")
}

/// Lit exactement `buf.len()` octets, ou signale une fin de flux propre.
///
/// Retourne `Ok(true)` si le buffer est plein, `Ok(false)` à l'EOF
/// (y compris une image tronquée en fin de flux).
///
/// # Errors
/// Propage les erreurs d'I/O autres que `Interrupted`.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Itérateur d'images extraites d'un flux raw RGB24.
///
/// Yields `(index, frame)` with `index` counting kept frames from 0. The
/// ffmpeg child, if any, is killed when the extractor is dropped.
pub struct FrameExtractor<R: Read = ChildStdout> {
    reader: R,
    child: Option<Child>,
    width: u32,
    height: u32,
    step: usize,
    max_frames: Option<usize>,
    decoded: usize,
    kept: usize,
    buf: Vec<u8>,
    done: bool,
}

impl FrameExtractor<ChildStdout> {
    /// Probe `path` and start decoding it, keeping frames at `target_fps`.
    ///
    /// # Errors
    /// Retourne une erreur si ffprobe/ffmpeg échouent.
    pub fn open(path: &Path, target_fps: f64, max_frames: Option<usize>) -> Result<Self> {
        let info = probe_video(path)?;
        let step = frame_step(info.fps, target_fps);
        let mut child = spawn_ffmpeg_pipe(path)?;
        let stdout = child
            .stdout
            .take()
            .context("ffmpeg : stdout non disponible")?;
        log::info!(
            "extraction : 1 image sur {step} (cible {target_fps} fps, max {max_frames:?})"
        );
        let mut extractor = Self::from_reader(stdout, info.width, info.height, step, max_frames);
        extractor.child = Some(child);
        Ok(extractor)
    }
}

impl<R: Read> FrameExtractor<R> {
    /// Wrap any raw RGB24 stream of `width × height` frames.
    pub fn from_reader(
        reader: R,
        width: u32,
        height: u32,
        step: usize,
        max_frames: Option<usize>,
    ) -> Self {
        Self {
            reader,
            child: None,
            width,
            height,
            step: step.max(1),
            max_frames,
            decoded: 0,
            kept: 0,
            buf: vec![0u8; width as usize * height as usize * 3],
            done: false,
        }
    }

    /// Nombre d'images décodées jusqu'ici (gardées ou non).
    #[must_use]
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl<R: Read> Iterator for FrameExtractor<R> {
    type Item = Result<(usize, PixelGrid)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.max_frames.is_some_and(|max| self.kept >= max) {
            return None;
        }
        loop {
            match read_exact_or_eof(&mut self.reader, &mut self.buf) {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    log::debug!("fin du flux après {} images", self.decoded);
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.context("Lecture du flux ffmpeg")));
                }
            }
            let index = self.decoded;
            self.decoded += 1;
            if index % self.step != 0 {
                continue;
            }
            let frame = PixelGrid::from_raw(self.width, self.height, Channels::Rgb, self.buf.clone())
                .map_err(anyhow::Error::from);
            let kept = self.kept;
            self.kept += 1;
            return Some(frame.map(|f| (kept, f)));
        }
    }
}

impl<R: Read> Drop for FrameExtractor<R> {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn raw_stream(frames: u8, w: u32, h: u32) -> Vec<u8> {
        (0..frames)
            .flat_map(|i| std::iter::repeat_n(i, (w * h * 3) as usize))
            .collect()
    }

    #[test]
    fn probe_output_with_frame_count() {
        let info =
            parse_probe_output("width=1920\nheight=1080\nr_frame_rate=24/1\nnb_frames=240\n")
                .unwrap();
        assert_eq!(info.frame_count, Some(240));
        assert!((info.fps - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn probe_output_without_stream_fails() {
        assert!(parse_probe_output("").is_err());
        let info = parse_probe_output("width=8\nheight=8\nnb_frames=N/A\n").unwrap();
        assert_eq!(info.frame_count, None);
    }

    #[test]
    fn frame_step_edge_cases() {
        assert_eq!(frame_step(60.0, 24.0), 2);
        assert_eq!(frame_step(30.0, 0.0), 1);
        assert_eq!(frame_step(30.0, f64::NAN), 1);
    }

    #[test]
    fn read_exact_or_eof_reports_truncation() {
        let mut buf = [0u8; 4];
        let mut full = Cursor::new(vec![1, 2, 3, 4, 5]);
        assert!(read_exact_or_eof(&mut full, &mut buf).unwrap());
        assert!(!read_exact_or_eof(&mut full, &mut buf).unwrap());
    }

    #[test]
    fn extractor_keeps_every_step_th_frame() {
        let data = raw_stream(7, 2, 2);
        let frames: Vec<(usize, PixelGrid)> =
            FrameExtractor::from_reader(Cursor::new(data), 2, 2, 3, None)
                .collect::<Result<_>>()
                .unwrap();
        let firsts: Vec<(usize, u8)> = frames.iter().map(|(i, f)| (*i, f.as_raw()[0])).collect();
        assert_eq!(firsts, vec![(0, 0), (1, 3), (2, 6)]);
    }

    #[test]
    fn extractor_stops_at_max_frames() {
        let data = raw_stream(10, 2, 1);
        let mut it = FrameExtractor::from_reader(Cursor::new(data), 2, 1, 1, Some(4));
        assert_eq!(it.by_ref().count(), 4);
        assert_eq!(it.decoded(), 4);
    }
}
