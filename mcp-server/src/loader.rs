use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use xoso_engine::{DrawResultMap, RateSettings, Region, Registry};

use crate::config::Config;
use crate::utils::draw_file_name;

/// Read-only inputs shared by every tool call.
pub struct Snapshots {
    pub registry: Registry,
    pub rates: RateSettings,
    draws_dir: PathBuf,
}

impl Snapshots {
    pub fn new(registry: Registry, rates: RateSettings, draws_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            rates,
            draws_dir: draws_dir.into(),
        }
    }

    /// Draw results published for `date` in `region`. A missing snapshot
    /// is an empty map: nothing has been drawn yet.
    pub fn draws(&self, date: NaiveDate, region: Region) -> Result<DrawResultMap> {
        let path = self.draws_dir.join(draw_file_name(date, region));
        if !path.exists() {
            tracing::warn!("No draw results at {}", path.display());
            return Ok(DrawResultMap::new());
        }
        let raw = read(&path)?;
        DrawResultMap::from_json(&raw)
            .with_context(|| format!("Invalid draw results in {}", path.display()))
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn open(config: &Config) -> Result<Snapshots> {
    let registry = Registry::from_json(&read(&config.registry_path)?)
        .with_context(|| format!("Invalid registry in {}", config.registry_path.display()))?;
    let rates = RateSettings::from_json(&read(&config.rates_path)?)
        .with_context(|| format!("Invalid rates in {}", config.rates_path.display()))?;

    tracing::info!(
        "Loaded {} provinces and {} bet types",
        registry.provinces().len(),
        registry.bet_types().len()
    );

    Ok(Snapshots::new(registry, rates, config.draws_dir.clone()))
}
