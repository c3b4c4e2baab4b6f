/// Frame sources for glyphcast (still images, frame folders, video files).
///
/// Everything here does I/O and reports `anyhow` errors; the conversion
/// core only ever sees the decoded `PixelGrid`s.

pub mod folder;
pub mod image;

#[cfg(feature = "video")]
pub mod video;
