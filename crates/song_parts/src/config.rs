use crate::cli::Args;
use anyhow::{Result, bail};
use arranger::{
    Config, DEFAULT_BEATS_PER_MEASURE, OutputFormat, SectionCatalog, SectionKind, SongLength,
};
use log::warn;
use std::{
    env,
    path::{Path, PathBuf},
};

const ENV_CONFIG_PATH: &str = "SONG_PARTS_CONFIG";

/// Everything one run needs, after merging CLI > config file > defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub kinds: Vec<SectionKind>,
    pub length: Option<SongLength>,
    pub bpm: Option<f64>,
    pub beats_per_measure: f64,
    pub format: OutputFormat,
    pub catalog: SectionCatalog,
}

impl Settings {
    pub fn resolve(args: &Args) -> Result<Self> {
        let config = match config_path(args.config.clone(), env_config_value()) {
            Some(path) => load_config(&path)?,
            None => Config::default(),
        };
        Self::from_parts(args, &config)
    }

    fn from_parts(args: &Args, config: &Config) -> Result<Self> {
        let length = match &args.duration {
            Some(text) => Some(SongLength::parse(text)?),
            None => config.song_length()?,
        };

        let kinds = if args.sections.is_empty() {
            config.structure()?
        } else {
            args.sections
                .iter()
                .map(|name| SectionKind::parse(name))
                .collect::<arranger::Result<Vec<_>>>()?
        };

        let format = match &args.format {
            Some(name) => OutputFormat::parse(name)?,
            None => config.output.format,
        };

        Ok(Self {
            kinds,
            length,
            bpm: args.bpm.or(config.song.bpm),
            beats_per_measure: args
                .beats_per_measure
                .or(config.song.beats_per_measure)
                .unwrap_or(DEFAULT_BEATS_PER_MEASURE),
            format,
            catalog: config.catalog()?,
        })
    }

    /// Beat budget, or 0 when the length or tempo is unknown
    pub fn total_beats(&self) -> f64 {
        match (self.length, self.bpm) {
            (Some(length), Some(bpm)) => length.total_beats(bpm),
            _ => 0.0,
        }
    }
}

/// Catalog shown by `--list`.
///
/// Only `--config` is binding here. Positional sections and other flags are
/// ignored, and a config named by the environment falls back to the built-in
/// catalog when it cannot be loaded.
pub fn listing_catalog(args: &Args, env_value: Option<String>) -> Result<SectionCatalog> {
    if let Some(path) = &args.config {
        return Ok(load_config(path)?.catalog()?);
    }
    if let Some(path) = config_path(None, env_value) {
        match load_config(&path).and_then(|config| Ok(config.catalog()?)) {
            Ok(catalog) => return Ok(catalog),
            Err(e) => warn!("Ignoring {ENV_CONFIG_PATH} for --list: {e:#}"),
        }
    }
    Ok(SectionCatalog::builtin().clone())
}

pub fn env_config_value() -> Option<String> {
    env::var(ENV_CONFIG_PATH).ok()
}

fn load_config(path: &Path) -> Result<Config> {
    if !path.is_file() {
        bail!("Config file not found: {}", path.display());
    }
    Ok(Config::load_from_file(path)?)
}

/// CLI path first, then a non-blank environment value
fn config_path(cli: Option<PathBuf>, env_value: Option<String>) -> Option<PathBuf> {
    cli.or_else(|| {
        env_value
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    })
}
