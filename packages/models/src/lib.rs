#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core value types shared across the food access map pipeline.
//!
//! The pipeline computes a composite "need" score per census tract from
//! three indicators (poverty, vehicle access, food insecurity) and overlays
//! uploaded client/program locations on the same map. Everything here is a
//! plain data type; the pipeline stages live in the `scoring`, `dataset`,
//! `geocoder` and `overlay` crates.

pub mod columns;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which vehicle-access measure feeds the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleMode {
    /// Households with no vehicle at all.
    #[default]
    NoVehicle,
    /// Households with fewer vehicles than members.
    FewerVehicles,
}

impl VehicleMode {
    /// Parses a mode name (`"no_vehicle"` / `"fewer_vehicles"`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownVehicleMode`] for any other value —
    /// an unknown mode indicates a caller bug and must not be silently
    /// defaulted.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "no_vehicle" => Ok(Self::NoVehicle),
            "fewer_vehicles" => Ok(Self::FewerVehicles),
            other => Err(ConfigError::UnknownVehicleMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Weights and flags that parameterize one score recomputation.
///
/// Passed by value into the score processor on every recomputation; the
/// session controller is the single owner that applies UI deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the poverty rate.
    pub poverty: f64,
    /// Weight of the vehicle-access rate.
    pub vehicle: f64,
    /// Weight of the food-insecurity rate.
    pub food: f64,
    /// Rescale each indicator to 0-100 before combining.
    pub normalize: bool,
    /// Which vehicle-access column feeds the score.
    pub vehicle_mode: VehicleMode,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            poverty: 1.0,
            vehicle: 0.33,
            food: 1.0,
            normalize: true,
            vehicle_mode: VehicleMode::NoVehicle,
        }
    }
}

impl ScoreWeights {
    /// Validates that every weight is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeight`] naming the offending factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("poverty", self.poverty),
            ("vehicle", self.vehicle),
            ("food", self.food),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    factor: name,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// One census tract with its indicators and derived score.
///
/// Created once at load time by the outer join of the geometry/ACS snapshot
/// with the food-insecurity table. `pct_vehicle` and `combined_pct` are
/// recomputed in place on every score refresh; `geometry` is carried
/// opaquely and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractRecord {
    /// County name (half of the composite natural key).
    pub county: String,
    /// Canonical tract identifier, `"<int>.<2-digit>"` form (e.g. "105.02").
    pub tract: String,
    /// Tract boundary, as delivered by the geometry snapshot.
    pub geometry: Option<geojson::Geometry>,
    /// Poverty rate percentage, if known.
    pub pct_poverty: Option<f64>,
    /// Percentage of households with no vehicle, if known.
    pub pct_no_vehicle: Option<f64>,
    /// Percentage of households with fewer vehicles than members, if known.
    pub pct_fewer_vehicles: Option<f64>,
    /// Food-insecurity rate percentage, if known.
    pub pct_food_insecure: Option<f64>,
    /// Derived: the selected vehicle measure, post-normalization.
    pub pct_vehicle: Option<f64>,
    /// Derived: the combined weighted score. Not persisted.
    pub combined_pct: f64,
}

impl TractRecord {
    /// Creates a record with no indicator data and a zero score.
    #[must_use]
    pub fn new(county: impl Into<String>, tract: impl Into<String>) -> Self {
        Self {
            county: county.into(),
            tract: tract.into(),
            geometry: None,
            pct_poverty: None,
            pct_no_vehicle: None,
            pct_fewer_vehicles: None,
            pct_food_insecure: None,
            pct_vehicle: None,
            combined_pct: 0.0,
        }
    }
}

/// A county-seat label row from the reference CSV.
///
/// Doubles as the county allow-list for the tract loader and as label
/// marker data for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountySeat {
    /// County name, as used in the tract key.
    #[serde(rename = "County")]
    pub county: String,
    /// County-seat city name.
    #[serde(rename = "CountySeat")]
    pub county_seat: String,
    /// Label latitude.
    pub lat: f64,
    /// Label longitude.
    pub lon: f64,
}

/// One canonicalized row from a user-uploaded location file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedLocation {
    /// Facility / program name, if supplied.
    pub facility: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Second address line.
    pub address_line_2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// ZIP code.
    pub zip: Option<String>,
    /// Program type; uploads without one default to `"Client"`.
    pub program_type: String,
    /// Latitude, from the upload or from geocoding.
    pub lat: Option<f64>,
    /// Longitude, from the upload or from geocoding.
    pub lon: Option<f64>,
    /// Name of the file this row came from (provenance key).
    pub source_file: String,
    /// Unrecognized columns, preserved for the failed-address export.
    pub extra: BTreeMap<String, String>,
}

impl Default for UploadedLocation {
    fn default() -> Self {
        Self {
            facility: None,
            address: None,
            address_line_2: None,
            city: None,
            zip: None,
            program_type: columns::DEFAULT_PROGRAM_TYPE.to_string(),
            lat: None,
            lon: None,
            source_file: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl UploadedLocation {
    /// Whether the row already carries both coordinates.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

/// A cluster of uploaded locations sharing one map position.
///
/// Derived and ephemeral: recomputed from scratch on every registry
/// mutation or filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressGroup {
    /// The grouping key (address fields or rounded coordinates).
    pub key: String,
    /// Mean latitude of the members.
    pub lat: f64,
    /// Mean longitude of the members.
    pub lon: f64,
    /// Sorted distinct program types present in the group.
    pub program_types: Vec<String>,
    /// Multi-line hover description listing every member program.
    pub description: String,
    /// Number of member rows.
    pub members: usize,
}

/// Configuration and parameter errors. These indicate caller bugs and
/// fail fast rather than being defaulted away.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A weight was negative, NaN or infinite.
    #[error("invalid {factor} weight: {value}")]
    InvalidWeight {
        /// Which factor the weight belongs to.
        factor: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An unknown vehicle-mode name was supplied.
    #[error("unknown vehicle mode: {value:?} (expected no_vehicle or fewer_vehicles)")]
    UnknownVehicleMode {
        /// The rejected value.
        value: String,
    },
}
