//! Nominatim / OpenStreetMap geocoder client.
//!
//! Free-form search against a configurable base URL. The public instance
//! enforces a strict rate limit of **1 request per second**; pacing
//! between lookups is the resolve loop's responsibility (see
//! `rate_limit_ms` in the geocoder configuration).
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use crate::{Coordinates, GeocodeError, GeocodeService};

/// Nominatim client over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct Nominatim {
    client: reqwest::Client,
    base_url: String,
}

impl Nominatim {
    /// Creates a client for the given search endpoint
    /// (e.g. `https://nominatim.openstreetmap.org/search`).
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl GeocodeService for Nominatim {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("countrycodes", "us"),
                ("format", "jsonv2"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim JSON response into coordinates.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(Coordinates { lat, lon }))
}
