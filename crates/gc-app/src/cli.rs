use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// glyphcast : convertit images et vidéos en art ASCII/Unicode.
#[derive(Parser, Debug)]
#[command(name = "glyphcast", version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Absent : valeurs par défaut.
    #[arg(short = 'C', long, default_value = "glyphcast.toml", global = true)]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Liste les convertisseurs disponibles.
    List {
        /// Sortie JSON (descripteurs + schémas d'options).
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Affiche le schéma d'options d'un convertisseur (JSON).
    Options {
        /// Identifiant du convertisseur (ex: brightness, edge, block).
        id: String,
    },
    /// Convertit une image fixe.
    Convert {
        /// Image source (PNG, JPEG, BMP, GIF, WebP).
        image: PathBuf,
        #[command(flatten)]
        job: ConverterArgs,
        /// Fichier de sortie. Défaut : stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Supprime le fond vert d'une image et écrit un PNG.
    Key {
        /// Image source.
        image: PathBuf,
        /// PNG de sortie. Défaut : `<nom>_keyed.png` à côté de la source.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Fond de remplacement : transparent, white, black, color.
        #[arg(long)]
        background: Option<String>,
        /// Couleur du fond pour `--background color` : "r,g,b" ou "#rrggbb".
        #[arg(long, value_parser = parse_rgb)]
        bg_color: Option<[u8; 3]>,
    },
    /// Extrait les images d'une vidéo, les détoure et les convertit.
    Video {
        /// Fichier vidéo (ffmpeg/ffprobe requis dans le PATH).
        file: PathBuf,
        /// Cadence d'extraction cible.
        #[arg(long)]
        fps: Option<f64>,
        /// Nombre maximal d'images extraites.
        #[arg(long)]
        max_frames: Option<usize>,
        /// Ne pas supprimer le fond vert.
        #[arg(long, default_value_t = false)]
        no_key: bool,
        /// Écrire aussi les images détourées en PNG (frame_0000.png, ...).
        #[arg(long, default_value_t = false)]
        frames: bool,
        #[command(flatten)]
        job: ConverterArgs,
        /// Dossier de sortie (frame_0000.txt, ...). Défaut : `<nom>_ascii/`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convertit toutes les images d'un dossier en parallèle.
    Bulk {
        /// Dossier source (parcouru récursivement).
        dir: PathBuf,
        #[command(flatten)]
        job: ConverterArgs,
        /// Dossier de sortie. Défaut : `<dir>/ascii/`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Conversion flags shared by `convert`, `video` and `bulk`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConverterArgs {
    /// Convertisseur : brightness, edge, sobel, block, dither.
    #[arg(short, long)]
    pub converter: Option<String>,

    /// Largeur de sortie en caractères.
    #[arg(short, long)]
    pub width: Option<i64>,

    /// Option du convertisseur, répétable : `-o ramp=simple -o invert=true`.
    #[arg(short = 'o', long = "option", value_parser = parse_option_pair)]
    pub options: Vec<(String, String)>,

    /// Ratio hauteur/largeur d'un caractère du terminal.
    #[arg(long)]
    pub char_aspect: Option<f32>,

    /// Supprimer le fond vert avant la conversion.
    #[arg(long, default_value_t = false)]
    pub key: bool,

    /// Sortie colorée (séquences ANSI 24 bits).
    #[arg(long, default_value_t = false)]
    pub ansi: bool,
}

/// Parse `name=value`.
///
/// # Errors
/// Returns a message when `=` is missing or the name is empty.
pub fn parse_option_pair(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("attendu nom=valeur, reçu '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("nom d'option vide dans '{s}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse `r,g,b` or `#rrggbb`.
///
/// # Errors
/// Returns a message for anything else.
pub fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return Ok([r, g, b]);
            }
        }
        return Err(format!("couleur hex invalide '{s}'"));
    }
    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("couleur invalide '{s}' (attendu r,g,b)"))?;
    match parts.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => Err(format!("couleur invalide '{s}' (attendu r,g,b)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_pairs() {
        assert_eq!(
            parse_option_pair("ramp = simple").unwrap(),
            ("ramp".to_string(), "simple".to_string())
        );
        assert_eq!(parse_option_pair("x=").unwrap().1, "");
        assert!(parse_option_pair("invert").is_err());
        assert!(parse_option_pair("=1").is_err());
    }

    #[test]
    fn colors() {
        assert_eq!(parse_rgb("12, 34,56").unwrap(), [12, 34, 56]);
        assert_eq!(parse_rgb("#ff8000").unwrap(), [255, 128, 0]);
        assert!(parse_rgb("#ff80").is_err());
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("300,0,0").is_err());
    }

    #[test]
    fn convert_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "glyphcast", "convert", "in.png", "-c", "edge", "-w", "80", "-o", "thicken=true",
            "--ansi",
        ])
        .unwrap();
        let Command::Convert { image, job, out } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(image, PathBuf::from("in.png"));
        assert_eq!(job.converter.as_deref(), Some("edge"));
        assert_eq!(job.width, Some(80));
        assert_eq!(job.options, vec![("thicken".to_string(), "true".to_string())]);
        assert!(job.ansi);
        assert!(out.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["glyphcast", "list", "--json", "--log-level", "debug"])
            .unwrap();
        assert!(matches!(cli.command, Command::List { json: true }));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn video_frames_flag() {
        let cli = Cli::try_parse_from(["glyphcast", "video", "clip.mp4", "--frames", "--fps", "5"])
            .unwrap();
        let Command::Video {
            frames, fps, no_key, ..
        } = cli.command
        else {
            panic!("expected video");
        };
        assert!(frames);
        assert!(!no_key);
        assert_eq!(fps, Some(5.0));
    }

    #[test]
    fn key_rejects_bad_color() {
        assert!(Cli::try_parse_from(["glyphcast", "key", "a.png", "--bg-color", "red"]).is_err());
    }
}
