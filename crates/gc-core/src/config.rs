use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::options::OptionValues;

/// Rapport hauteur/largeur d'un glyphe monospace (les lignes sont écrasées
/// d'un facteur 0.55).
pub const DEFAULT_CHAR_ASPECT: f32 = 1.0 / 0.55;

/// Configuration complète du moteur, chargée depuis TOML.
///
/// Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use gc_core::config::EngineConfig;
/// let config = EngineConfig::default();
/// assert_eq!(config.convert.converter, "brightness");
/// assert_eq!(config.chroma.hue_center, 120.0);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Conversion defaults.
    pub convert: ConvertConfig,
    /// Green-screen keying.
    pub chroma: GreenScreenSettings,
    /// Frame extraction.
    pub video: VideoConfig,
}

/// Conversion defaults.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConvertConfig {
    /// Identifiant du convertisseur par défaut.
    pub converter: String,
    /// Glyph height / glyph width; divides the row count.
    pub char_aspect: f32,
    /// Option values forwarded to the converter (still validated per call).
    pub options: OptionValues,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            converter: "brightness".to_string(),
            char_aspect: DEFAULT_CHAR_ASPECT,
            options: OptionValues::new(),
        }
    }
}

/// Substitution de fond après détourage.
///
/// # Example
/// ```
/// use gc_core::config::Background;
/// assert!(matches!(Background::default(), Background::Transparent));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Add an alpha channel, 0 on background pixels.
    #[default]
    Transparent,
    /// Solid white.
    White,
    /// Solid black.
    Black,
    /// Solid `bg_color`.
    Color,
}

impl Background {
    /// Parse a CLI/JSON identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "transparent" => Some(Self::Transparent),
            "white" => Some(Self::White),
            "black" => Some(Self::Black),
            "color" | "colour" => Some(Self::Color),
            _ => None,
        }
    }
}

/// Paramètres de détection et de suppression du fond vert.
///
/// Constructed per request, used once, discarded.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GreenScreenSettings {
    /// Teinte centrale en degrés [0, 360).
    pub hue_center: f32,
    /// Tolérance de teinte en degrés [0, 180].
    pub hue_tolerance: f32,
    /// Saturation minimale (0–255 scale).
    pub saturation_min: u8,
    /// Saturation maximale (0–255 scale).
    pub saturation_max: u8,
    /// Valeur minimale (0–255 scale).
    pub value_min: u8,
    /// Valeur maximale (0–255 scale).
    pub value_max: u8,
    /// Majority filter window (odd, 0 = off).
    pub median_size: u32,
    /// Erosion passes on the background mask (3×3).
    pub erode_iterations: u32,
    /// Dilation passes on the background mask (3×3).
    pub dilate_iterations: u32,
    /// What replaces background pixels.
    pub background: Background,
    /// RGB used when `background = "color"`.
    pub bg_color: [u8; 3],
    /// Background fraction above which a frame counts as green-screened.
    pub coverage_threshold: f32,
}

impl Default for GreenScreenSettings {
    fn default() -> Self {
        Self {
            hue_center: 120.0,
            hue_tolerance: 30.0,
            saturation_min: 40,
            saturation_max: 255,
            value_min: 40,
            value_max: 255,
            median_size: 5,
            erode_iterations: 1,
            dilate_iterations: 2,
            background: Background::Transparent,
            bg_color: [255, 255, 255],
            coverage_threshold: 0.10,
        }
    }
}

impl GreenScreenSettings {
    /// Clamp all numeric fields to their valid ranges.
    pub fn clamp_all(&mut self) {
        self.hue_center = self.hue_center.rem_euclid(360.0);
        self.hue_tolerance = self.hue_tolerance.clamp(0.0, 180.0);
        self.saturation_max = self.saturation_max.max(self.saturation_min);
        self.value_max = self.value_max.max(self.value_min);
        if self.median_size > 0 && self.median_size % 2 == 0 {
            self.median_size += 1;
        }
        self.median_size = self.median_size.min(15);
        self.erode_iterations = self.erode_iterations.min(10);
        self.dilate_iterations = self.dilate_iterations.min(10);
        self.coverage_threshold = self.coverage_threshold.clamp(0.0, 1.0);
    }
}

/// Frame extraction settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VideoConfig {
    /// Images par seconde extraites.
    pub fps: f64,
    /// Plafond d'images extraites (None = toutes).
    pub max_frames: Option<usize>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 12.0,
            max_frames: None,
        }
    }
}

impl EngineConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        if !self.convert.char_aspect.is_finite() {
            self.convert.char_aspect = DEFAULT_CHAR_ASPECT;
        }
        self.convert.char_aspect = self.convert.char_aspect.clamp(0.25, 4.0);
        self.chroma.clamp_all();
        if !self.video.fps.is_finite() {
            self.video.fps = 12.0;
        }
        self.video.fps = self.video.fps.clamp(0.1, 120.0);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    convert: Option<ConvertSection>,
    chroma: Option<GreenScreenSettings>,
    video: Option<VideoSection>,
}

/// Convert section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct ConvertSection {
    converter: Option<String>,
    char_aspect: Option<f32>,
    options: Option<OptionValues>,
}

#[derive(Deserialize)]
struct VideoSection {
    fps: Option<f64>,
    max_frames: Option<usize>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = EngineConfig::default();

    if let Some(c) = file.convert {
        if let Some(v) = c.converter {
            config.convert.converter = v;
        }
        if let Some(v) = c.char_aspect {
            config.convert.char_aspect = v;
        }
        if let Some(v) = c.options {
            config.convert.options = v;
        }
    }
    if let Some(chroma) = file.chroma {
        config.chroma = chroma;
    }
    if let Some(v) = file.video {
        if let Some(fps) = v.fps {
            config.video.fps = fps;
        }
        if v.max_frames.is_some() {
            config.video.max_frames = v.max_frames;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gc_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("glyphcast.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    log::debug!("config chargée depuis {}", path.display());
    Ok(config)
}
