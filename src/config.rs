use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::region::DistanceUnit;

/// Continental US, (min_lon, min_lat, max_lon, max_lat)
pub const CONTINENTAL_US_BOUNDS: [f64; 4] = [-124.848974, 24.396308, -66.885444, 49.384358];

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub target: TargetConfig,
    pub map: MapConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// GeoJSON FeatureCollection of region polygons
    pub regions: PathBuf,
    /// JSON object of region id -> population
    pub populations: PathBuf,
    /// Feature property holding the region id
    pub id_property: String,
    /// Feature property holding the display name
    pub name_property: String,
    /// Plural noun used in the summary sentence
    pub region_noun: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            regions: PathBuf::from("data/counties.json"),
            populations: PathBuf::from("data/county-populations.json"),
            id_property: "id".to_string(),
            name_property: "name".to_string(),
            region_noun: "US counties".to_string(),
        }
    }
}

/// The reference city whose population the selection has to match
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TargetConfig {
    pub name: String,
    pub population: f64,
    pub unit: DistanceUnit,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: "NYC".to_string(),
            population: 8_336_817.0,
            unit: DistanceUnit::Miles,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    /// Bounds the initial view is fitted to
    pub initial_bounds: [f64; 4],
    /// Padding in braille pixels around the fitted bounds
    pub fit_padding: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_bounds: CONTINENTAL_US_BOUNDS,
            fit_padding: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    /// Used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("pop-map.log"),
            filter: "pop_map=info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let target = self.target.population;
        if !target.is_finite() || target <= 0.0 {
            bail!("target population must be a positive number, got {}", target);
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.map.initial_bounds;
        if min_lon >= max_lon || min_lat >= max_lat {
            bail!("initial bounds are inverted: {:?}", self.map.initial_bounds);
        }
        if min_lat < -85.0 || max_lat > 85.0 {
            bail!("initial bounds must stay within ±85° latitude");
        }
        Ok(())
    }
}
