use std::borrow::Cow;

use anyhow::{Context, Result};
use gc_ascii::find_converter;
use gc_core::config::{EngineConfig, GreenScreenSettings};
use gc_core::frame::{Channels, GlyphGrid, PixelGrid};
use gc_core::options::{OptionValue, OptionValues, ResolvedOptions};
use gc_key::{flatten, key_frame};

use crate::cli::ConverterArgs;

/// Fond utilisé pour aplatir les images transparentes avant conversion.
pub const FLATTEN_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Everything needed to turn one frame into glyphs, resolved once per run.
#[derive(Clone, Debug)]
pub struct ConvertJob {
    pub converter: &'static str,
    pub options: OptionValues,
    pub char_aspect: f32,
    /// `Some` → green screen removed before conversion.
    pub key: Option<GreenScreenSettings>,
    pub ansi: bool,
}

impl ConvertJob {
    /// Merge config file values and CLI flags. The converter id and every
    /// option are checked here so a bad flag fails before any frame is read.
    ///
    /// Config-file options only apply when the CLI keeps the configured
    /// converter; they belong to that converter's schema.
    ///
    /// # Errors
    /// Unknown converter or invalid option value.
    pub fn resolve(config: &EngineConfig, args: &ConverterArgs) -> Result<Self> {
        let id = args
            .converter
            .as_deref()
            .unwrap_or(&config.convert.converter);
        let descriptor = find_converter(id)?;

        let mut options = if descriptor.id == config.convert.converter {
            config.convert.options.clone()
        } else {
            OptionValues::new()
        };
        for (name, value) in &args.options {
            options.insert(name.clone(), OptionValue::Text(value.clone()));
        }
        if let Some(width) = args.width {
            options.insert("width".to_string(), OptionValue::Int(width));
        }
        ResolvedOptions::resolve(descriptor.options, &options)
            .with_context(|| format!("Options invalides pour '{}'", descriptor.id))?;

        let job = Self {
            converter: descriptor.id,
            options,
            char_aspect: args.char_aspect.unwrap_or(config.convert.char_aspect),
            key: args.key.then(|| config.chroma.clone()),
            ansi: args.ansi,
        };
        log::info!(
            "convertisseur '{}' ({} option(s), aspect {:.2}, fond vert : {})",
            job.converter,
            job.options.len(),
            job.char_aspect,
            if job.key.is_some() { "oui" } else { "non" }
        );
        Ok(job)
    }

    /// Green-screen stage alone; borrows the frame when keying is off.
    ///
    /// # Errors
    /// Propagates keying errors.
    pub fn apply_key<'a>(&self, frame: &'a PixelGrid) -> Result<Cow<'a, PixelGrid>> {
        Ok(match &self.key {
            Some(settings) => Cow::Owned(key_frame(frame, settings)?.frame),
            None => Cow::Borrowed(frame),
        })
    }

    /// Flatten and convert a frame that already went through [`ConvertJob::apply_key`].
    ///
    /// # Errors
    /// Propagates core errors.
    pub fn convert_keyed(&self, keyed: &PixelGrid) -> Result<GlyphGrid> {
        let opaque = prepare_frame(keyed)?;
        let glyphs =
            gc_ascii::convert_with(self.converter, &opaque, &self.options, self.char_aspect)?;
        Ok(glyphs)
    }

    /// Key (optionally), flatten, convert.
    ///
    /// # Errors
    /// Propagates core errors.
    pub fn run(&self, frame: &PixelGrid) -> Result<GlyphGrid> {
        self.convert_keyed(&*self.apply_key(frame)?)
    }

    /// Plain text or ANSI, per the job.
    #[must_use]
    pub fn format(&self, glyphs: &GlyphGrid) -> String {
        if self.ansi {
            glyphs.to_ansi()
        } else {
            glyphs.to_text()
        }
    }

    /// Convert and render as plain text or ANSI.
    ///
    /// # Errors
    /// See [`ConvertJob::run`].
    pub fn render(&self, frame: &PixelGrid) -> Result<String> {
        Ok(self.format(&self.run(frame)?))
    }
}

/// Transparent frames are composited over white; others pass through.
///
/// # Errors
/// Never fails for a well-formed grid.
pub fn prepare_frame(frame: &PixelGrid) -> Result<Cow<'_, PixelGrid>> {
    if frame.channels() == Channels::Rgba {
        Ok(Cow::Owned(flatten(frame, FLATTEN_BACKGROUND)?))
    } else {
        Ok(Cow::Borrowed(frame))
    }
}
