#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract dataset loading.
//!
//! Merges the ACS geometry/indicator snapshot (MessagePack) with the
//! food-insecurity CSV into the canonical per-tract record set, keyed by
//! (County, tract). Tracts present in only one source are kept with nulls
//! for the missing indicators so they still render, just with degraded
//! scores. Also provides content fingerprinting of the input files for the
//! session layer's recompute cache.

pub mod fingerprint;
pub mod loader;
pub mod tract_id;

use std::path::PathBuf;

pub use fingerprint::snapshot_fingerprint;
pub use loader::{load, load_county_seats};
pub use tract_id::canonical_tract_id;

/// Input file locations for one dataset load.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    /// MessagePack snapshot of the geometry + ACS indicator table.
    pub acs: PathBuf,
    /// Food-insecurity CSV (`County`, `tract`, `pct_food_insecure`).
    pub food_insecurity: PathBuf,
    /// County-seat reference CSV, used as a county allow-list when present.
    pub county_seats: Option<PathBuf>,
}

/// Errors from dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// An input file does not exist.
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    /// An input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV input could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The ACS snapshot could not be decoded.
    #[error("snapshot decode error: {0}")]
    Snapshot(#[from] rmp_serde::decode::Error),

    /// A tract identifier was not numeric on both sides of the decimal.
    #[error("malformed tract identifier: {value:?}")]
    ParseTract {
        /// The rejected identifier.
        value: String,
    },
}
