#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding adapter for uploaded address files.
//!
//! Uploaded rows that already carry both coordinates are passed through
//! untouched — no network call. Rows lacking them are resolved through
//! Nominatim / OpenStreetMap (1 request per second maximum on the public
//! instance; pacing is applied between lookups). A row whose address
//! cannot be resolved keeps null coordinates rather than failing the
//! batch; the failed rows surface later through the failed-address export.
//!
//! Results — hits and misses both — are cached per session keyed on the
//! query string, so re-uploading a corrected file only re-queries the rows
//! that changed.

pub mod nominatim;
pub mod query;
pub mod resolve;

use std::collections::BTreeMap;

use thiserror::Error;

pub use query::build_query;
pub use resolve::{ResolveOptions, resolve};

/// A resolved coordinate pair (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// A geocoding backend resolving one free-form query to coordinates.
///
/// `Ok(None)` means the service answered but found no match; errors are
/// transport or protocol failures.
#[async_trait::async_trait]
pub trait GeocodeService: Send + Sync {
    /// Resolves a free-form address query.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response handling fails.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Session-scoped geocode cache keyed on the query string.
///
/// Caches misses as well as hits so known-bad addresses are not
/// re-queried on every registry mutation.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: BTreeMap<String, Option<Coordinates>>,
}

impl GeocodeCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Looks up a query. The outer `Option` is hit/miss on the cache; the
    /// inner one is the cached geocoding outcome.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<Option<Coordinates>> {
        self.entries.get(query).copied()
    }

    /// Records a geocoding outcome.
    pub fn insert(&mut self, query: String, outcome: Option<Coordinates>) {
        self.entries.insert(query, outcome);
    }

    /// Number of cached queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_distinguishes_misses_from_unknowns() {
        let mut cache = GeocodeCache::new();
        assert_eq!(cache.lookup("q"), None);

        cache.insert("q".to_string(), None);
        assert_eq!(cache.lookup("q"), Some(None));

        let hit = Coordinates {
            lat: 36.1,
            lon: -80.2,
        };
        cache.insert("r".to_string(), Some(hit));
        assert_eq!(cache.lookup("r"), Some(Some(hit)));
        assert_eq!(cache.len(), 2);
    }
}
