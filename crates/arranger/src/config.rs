use crate::{
    duration::SongLength,
    error::{ArrangerError, Result},
    render::OutputFormat,
    sections::{SectionCatalog, SectionDef, SectionKind},
};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

/// Arrangement settings read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub song: SongConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Per-type overrides of the built-in catalog, keyed by section name
    #[serde(default)]
    pub sections: BTreeMap<String, SectionOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SongConfig {
    pub duration: Option<String>, // "4:30" | "4m30s" | "4.5"
    pub bpm: Option<f64>,
    pub beats_per_measure: Option<f64>,
    #[serde(default)]
    pub structure: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Fields left out keep the built-in value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionOverride {
    pub weight: Option<f64>,
    pub even: Option<bool>,
    pub rank: Option<u32>,
    pub balance: Option<bool>,
}

impl SectionOverride {
    fn apply(&self, base: &SectionDef) -> SectionDef {
        SectionDef {
            weight: self.weight.unwrap_or(base.weight),
            even: self.even.unwrap_or(base.even),
            rank: self.rank.unwrap_or(base.rank),
            balance: self.balance.unwrap_or(base.balance),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArrangerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            ArrangerError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let song = &self.song;
        if let Some(bpm) = song.bpm
            && !(bpm.is_finite() && bpm > 0.0)
        {
            return Err(ArrangerError::Config(format!(
                "song.bpm must be positive, got {}",
                bpm
            )));
        }
        if let Some(beats) = song.beats_per_measure
            && !(beats.is_finite() && beats > 0.0)
        {
            return Err(ArrangerError::Config(format!(
                "song.beats_per_measure must be positive, got {}",
                beats
            )));
        }
        self.song_length()?;
        self.structure()?;

        for (name, section) in &self.sections {
            SectionKind::parse(name)?;
            if let Some(weight) = section.weight
                && !(weight.is_finite() && weight > 0.0)
            {
                return Err(ArrangerError::Config(format!(
                    "sections.{}.weight must be positive, got {}",
                    name, weight
                )));
            }
            if section.rank == Some(0) {
                return Err(ArrangerError::Config(format!(
                    "sections.{}.rank must be at least 1",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn song_length(&self) -> Result<Option<SongLength>> {
        self.song
            .duration
            .as_deref()
            .map(SongLength::parse)
            .transpose()
    }

    pub fn structure(&self) -> Result<Vec<SectionKind>> {
        self.song
            .structure
            .iter()
            .map(|name| SectionKind::parse(name))
            .collect()
    }

    /// Built-in catalog with the `[sections.*]` overrides applied
    pub fn catalog(&self) -> Result<SectionCatalog> {
        let mut catalog = SectionCatalog::builtin().clone();
        for (name, section) in &self.sections {
            let kind = SectionKind::parse(name)?;
            let def = section.apply(catalog.get(kind));
            catalog = catalog.with_definition(kind, def);
        }
        Ok(catalog)
    }
}
