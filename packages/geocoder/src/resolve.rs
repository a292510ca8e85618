//! Batch resolution of uploaded rows lacking coordinates.

use std::time::Duration;

use food_access_map_models::UploadedLocation;

use crate::{GeocodeCache, GeocodeService, build_query};

/// Batch resolution parameters.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// State abbreviation appended to every query (the tool serves one
    /// state's service area).
    pub state: String,
    /// Delay between network lookups, in milliseconds. Zero disables
    /// pacing (tests, self-hosted instances).
    pub rate_limit_ms: u64,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            state: "NC".to_string(),
            rate_limit_ms: 1000,
        }
    }
}

/// Fills in coordinates for rows that lack them.
///
/// Rows that already have both `lat` and `lon` are passed through with no
/// network call. For the rest, the cache is consulted first (hits and
/// known misses alike); only genuinely new queries reach the service.
/// Failure is per-row: an unresolvable or erroring row keeps null
/// coordinates and the batch continues.
///
/// Returns the number of rows that received coordinates.
pub async fn resolve(
    rows: &mut [UploadedLocation],
    service: &dyn GeocodeService,
    options: &ResolveOptions,
    cache: &mut GeocodeCache,
) -> usize {
    let mut resolved = 0_usize;
    let mut queried = false;

    for row in rows.iter_mut() {
        if row.has_coordinates() {
            continue;
        }

        let Some(query) = build_query(row, &options.state) else {
            log::warn!(
                "Row from {} has no coordinates and incomplete address fields; leaving unmapped",
                row.source_file
            );
            continue;
        };

        let outcome = if let Some(cached) = cache.lookup(&query) {
            cached
        } else {
            if queried && options.rate_limit_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.rate_limit_ms)).await;
            }
            queried = true;

            match service.geocode(&query).await {
                Ok(outcome) => {
                    cache.insert(query.clone(), outcome);
                    outcome
                }
                Err(err) => {
                    // Transport errors are not cached; the next upload
                    // retries the lookup.
                    log::warn!("Geocoding failed for {query:?}: {err}");
                    None
                }
            }
        };

        match outcome {
            Some(coords) => {
                row.lat = Some(coords.lat);
                row.lon = Some(coords.lon);
                resolved += 1;
            }
            None => log::warn!("No geocoding match for {query:?}"),
        }
    }

    resolved
}
