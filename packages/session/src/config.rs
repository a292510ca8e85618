//! TOML application configuration.
//!
//! One config file names the dataset inputs, the geocoder endpoint and the
//! default weights. Missing keys fall back to the same defaults the
//! dashboard sliders start from, so a minimal config only needs the paths.

use std::path::{Path, PathBuf};

use food_access_map_dataset::DatasetPaths;
use food_access_map_models::{ConfigError, ScoreWeights, VehicleMode};
use serde::Deserialize;

/// Errors from reading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be parsed as TOML.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Dataset input file locations.
    pub paths: PathsConfig,
    /// Geocoder endpoint settings.
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    /// Default score weights.
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Dataset input file locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// MessagePack ACS snapshot.
    pub acs: PathBuf,
    /// Food-insecurity CSV.
    pub food_insecurity: PathBuf,
    /// County-seat reference CSV (county allow-list), optional.
    #[serde(default)]
    pub county_seats: Option<PathBuf>,
}

/// Geocoder endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Nominatim search endpoint.
    pub base_url: String,
    /// State abbreviation appended to every query.
    pub state: String,
    /// Pacing between lookups in milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            state: "NC".to_string(),
            rate_limit_ms: 1000,
        }
    }
}

/// Default score weights, as written in the config file.
///
/// `vehicle_mode` stays a string until [`WeightsConfig::score_weights`]
/// parses it, so an unknown mode fails loud instead of deserializing into
/// a silent default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// Poverty weight.
    pub poverty: f64,
    /// Vehicle-access weight.
    pub vehicle: f64,
    /// Food-insecurity weight.
    pub food: f64,
    /// Normalize indicators before combining.
    pub normalize: bool,
    /// `"no_vehicle"` or `"fewer_vehicles"`.
    pub vehicle_mode: String,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        let defaults = ScoreWeights::default();
        Self {
            poverty: defaults.poverty,
            vehicle: defaults.vehicle,
            food: defaults.food,
            normalize: defaults.normalize,
            vehicle_mode: "no_vehicle".to_string(),
        }
    }
}

impl WeightsConfig {
    /// Converts to validated [`ScoreWeights`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown vehicle mode or an invalid
    /// weight value.
    pub fn score_weights(&self) -> Result<ScoreWeights, ConfigError> {
        let weights = ScoreWeights {
            poverty: self.poverty,
            vehicle: self.vehicle,
            food: self.food,
            normalize: self.normalize,
            vehicle_mode: VehicleMode::parse(&self.vehicle_mode)?,
        };
        weights.validate()?;
        Ok(weights)
    }
}

impl AppConfig {
    /// Loads and parses the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// The dataset input paths in the loader's form.
    #[must_use]
    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths {
            acs: self.paths.acs.clone(),
            food_insecurity: self.paths.food_insecurity.clone(),
            county_seats: self.paths.county_seats.clone(),
        }
    }
}
