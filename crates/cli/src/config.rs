use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use supertrend_indicators::SuperTrendConfig;

/// Layout of the optional TOML config file.
///
/// ```toml
/// [supertrend]
/// period = 10
/// multiplier = 3
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub supertrend: SuperTrendConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Defaults, then the config file, then command-line overrides.
pub fn resolve(
    file: Option<FileConfig>,
    period: Option<usize>,
    multiplier: Option<Decimal>,
) -> SuperTrendConfig {
    let mut config = file.map(|f| f.supertrend).unwrap_or_default();
    if let Some(period) = period {
        config.period = period;
    }
    if let Some(multiplier) = multiplier {
        config.multiplier = multiplier;
    }
    config
}
