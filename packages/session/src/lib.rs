#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session controller for the food access map.
//!
//! Owns all mutable state for one logical session: the loaded tract
//! records, the upload registry, the geocode cache and the score cache.
//! Every interaction triggers a full synchronous recomputation of the
//! affected pipeline; caches are keyed on content (input file bytes,
//! weight values), never on call identity, so any change to the inputs
//! invalidates them. Sessions share nothing — a host running several
//! users gives each its own `Session`.

pub mod config;

use std::collections::BTreeSet;

use food_access_map_dataset::{DatasetError, DatasetPaths, snapshot_fingerprint};
use food_access_map_geocoder::{GeocodeCache, GeocodeService, ResolveOptions, resolve};
use food_access_map_models::{
    AddressGroup, ConfigError, ScoreWeights, TractRecord, UploadedLocation, VehicleMode,
};
use food_access_map_overlay::{
    OverlayError, UploadRegistry, available_program_types, group_locations, parse_upload,
    split_by_geocoded,
};

pub use config::{AppConfig, ConfigFileError};

/// Errors surfaced from session operations.
///
/// Structural failures abort the current render cycle only; session state
/// stays intact and the next interaction retries from scratch.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The config file was unreadable or unparseable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigFileError),

    /// Invalid weights or vehicle mode (a caller bug; fail fast).
    #[error("parameter error: {0}")]
    Params(#[from] ConfigError),

    /// Dataset loading failed.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Upload handling failed.
    #[error("upload error: {0}")]
    Overlay(#[from] OverlayError),
}

/// Cache key for one score computation: dataset content + parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoreKey {
    fingerprint: String,
    poverty_bits: u64,
    vehicle_bits: u64,
    food_bits: u64,
    normalize: bool,
    vehicle_mode: VehicleMode,
}

impl ScoreKey {
    fn new(fingerprint: &str, weights: &ScoreWeights) -> Self {
        Self {
            fingerprint: fingerprint.to_string(),
            poverty_bits: weights.poverty.to_bits(),
            vehicle_bits: weights.vehicle.to_bits(),
            food_bits: weights.food.to_bits(),
            normalize: weights.normalize,
            vehicle_mode: weights.vehicle_mode,
        }
    }
}

/// One user session's state and operations.
pub struct Session {
    config: AppConfig,
    tracts: Option<(String, Vec<TractRecord>)>,
    score_cache: Option<(ScoreKey, Vec<TractRecord>)>,
    registry: UploadRegistry,
    geocode_cache: GeocodeCache,
}

impl Session {
    /// Creates a session with no loaded data.
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self {
            config,
            tracts: None,
            score_cache: None,
            registry: UploadRegistry::new(),
            geocode_cache: GeocodeCache::new(),
        }
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    fn dataset_paths(&self) -> DatasetPaths {
        self.config.dataset_paths()
    }

    /// Loads (or re-uses) the tract records for the current input files.
    ///
    /// The records are cached against the content fingerprint of the input
    /// files; regenerating an input invalidates the cache on the next
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Dataset`] on load failure.
    pub fn load_tracts(&mut self) -> Result<&[TractRecord], SessionError> {
        let paths = self.dataset_paths();
        let fingerprint = snapshot_fingerprint(&paths)?;

        let stale = self
            .tracts
            .as_ref()
            .is_none_or(|(cached, _)| *cached != fingerprint);
        if stale {
            let records = food_access_map_dataset::load(&paths)?;
            log::info!("Loaded {} tracts (fingerprint {fingerprint:.12})", records.len());
            self.tracts = Some((fingerprint, records));
            self.score_cache = None;
        }

        match &self.tracts {
            Some((_, records)) => Ok(records),
            None => Ok(&[]),
        }
    }

    /// Returns the scored tract records for `weights`, computing only when
    /// the inputs or parameters changed since the last call.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Params`] for invalid weights and
    /// [`SessionError::Dataset`] if loading is needed and fails.
    pub fn scored(&mut self, weights: &ScoreWeights) -> Result<Vec<TractRecord>, SessionError> {
        self.load_tracts()?;
        let (fingerprint, records) = self
            .tracts
            .as_ref()
            .map_or(("", &[] as &[TractRecord]), |(f, r)| {
                (f.as_str(), r.as_slice())
            });

        let key = ScoreKey::new(fingerprint, weights);
        if let Some((cached_key, cached)) = &self.score_cache
            && *cached_key == key
        {
            return Ok(cached.clone());
        }

        let scored = food_access_map_scoring::process(records, weights)?;
        self.score_cache = Some((key, scored.clone()));
        Ok(scored)
    }

    /// Parses, validates and geocodes an uploaded file, then registers it.
    /// Re-uploading the same filename replaces the prior table.
    ///
    /// Returns `(row_count, geocoded_count)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Overlay`] when the upload lacks both
    /// coordinate columns and complete address columns; the registry is
    /// untouched in that case.
    pub async fn ingest_upload(
        &mut self,
        source_file: &str,
        bytes: &[u8],
        service: &dyn GeocodeService,
    ) -> Result<(usize, usize), SessionError> {
        let mut table = parse_upload(source_file, bytes)?;

        let options = ResolveOptions {
            state: self.config.geocoder.state.clone(),
            rate_limit_ms: self.config.geocoder.rate_limit_ms,
        };
        let geocoded = resolve(
            &mut table.rows,
            service,
            &options,
            &mut self.geocode_cache,
        )
        .await;

        let rows = table.rows.len();
        self.registry.add_or_replace(table);
        Ok((rows, geocoded))
    }

    /// Removes an uploaded table by filename. Returns whether one existed.
    pub fn remove_upload(&mut self, source_file: &str) -> bool {
        self.registry.remove(source_file)
    }

    /// All uploaded rows across every registered file.
    #[must_use]
    pub fn overlay_rows(&self) -> Vec<UploadedLocation> {
        self.registry.combined()
    }

    /// Program types available for filtering (excludes `"Client"`).
    #[must_use]
    pub fn program_types(&self) -> Vec<String> {
        available_program_types(&self.registry.combined())
    }

    /// Marker groups for the current uploads and filter selection.
    #[must_use]
    pub fn markers(&self, selected_program_types: &BTreeSet<String>) -> Vec<AddressGroup> {
        group_locations(&self.registry.combined(), selected_program_types)
    }

    /// The geocoded / failed split of the current uploads, for export.
    #[must_use]
    pub fn export_split(&self) -> (Vec<UploadedLocation>, Vec<UploadedLocation>) {
        split_by_geocoded(&self.registry.combined())
    }
}
