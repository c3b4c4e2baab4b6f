use std::path::Path;

use anyhow::Result;
use clap::Parser;
use gc_core::config::{EngineConfig, load_config};

pub mod batch;
pub mod cli;
pub mod commands;
pub mod pipeline;

use cli::Command;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config
    let config = resolve_config(&cli.config)?;

    match cli.command {
        Command::List { json } => commands::list(json),
        Command::Options { id } => commands::options(&id),
        Command::Convert { image, job, out } => {
            commands::convert(&config, &image, &job, out.as_deref())
        }
        Command::Key {
            image,
            out,
            background,
            bg_color,
        } => commands::key(&config, &image, out.as_deref(), background.as_deref(), bg_color),
        Command::Video {
            file,
            fps,
            max_frames,
            no_key,
            frames,
            mut job,
            out,
        } => {
            job.key = !no_key;
            let fps = fps.unwrap_or(config.video.fps);
            let max_frames = max_frames.or(config.video.max_frames);
            batch::run_video(&config, &file, fps, max_frames, &job, frames, out.as_deref())
        }
        Command::Bulk { dir, job, out } => batch::run_bulk(&config, &dir, &job, out.as_deref()),
    }
}

/// Charge la config si le fichier existe, sinon les valeurs par défaut.
fn resolve_config(path: &Path) -> Result<EngineConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!(
            "Config {} introuvable, utilisation des valeurs par défaut.",
            path.display()
        );
        Ok(EngineConfig::default())
    }
}
