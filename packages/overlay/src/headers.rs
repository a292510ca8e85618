//! Upload header canonicalization.
//!
//! Files arrive with headers like `" LATITUDE "`, `"Zip Code"` or
//! `"program type"`. Matching is whitespace-trimmed and case-insensitive
//! against a fixed variant table; unknown headers keep their trimmed name
//! and ride along as extra columns.

use food_access_map_models::columns;

/// Known header variants, lower-cased, and their canonical targets.
const VARIANTS: &[(&str, &str)] = &[
    ("lat", columns::LAT),
    ("latitude", columns::LAT),
    ("lon", columns::LON),
    ("lng", columns::LON),
    ("long", columns::LON),
    ("longitude", columns::LON),
    ("address", columns::ADDRESS),
    ("street address", columns::ADDRESS),
    ("address line 2", columns::ADDRESS_LINE_2),
    ("address 2", columns::ADDRESS_LINE_2),
    ("address2", columns::ADDRESS_LINE_2),
    ("city", columns::CITY),
    ("zip", columns::ZIP),
    ("zip code", columns::ZIP),
    ("zipcode", columns::ZIP),
    ("postal code", columns::ZIP),
    ("program type", columns::PROGRAM_TYPE),
    ("facility", columns::FACILITY),
    ("name", columns::FACILITY),
    ("program name", columns::FACILITY),
    ("source_file", columns::SOURCE_FILE),
];

/// Maps one raw header to its canonical name, if it is a known variant.
#[must_use]
pub fn canonical_header(raw: &str) -> Option<&'static str> {
    let needle = raw.trim().to_lowercase();
    VARIANTS
        .iter()
        .find(|(variant, _)| *variant == needle)
        .map(|(_, canonical)| *canonical)
}

/// Resolves a full header row.
///
/// Each header becomes its canonical name when recognized, otherwise its
/// trimmed original. When two headers map to the same canonical target the
/// first keeps it and later ones fall back to their trimmed originals
/// (first-seen-wins; an existing canonical column is never overwritten).
#[must_use]
pub fn resolve_headers<'a>(raw_headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::new();

    for raw in raw_headers {
        let trimmed = raw.trim();
        let name = match canonical_header(trimmed) {
            Some(canonical) if !resolved.iter().any(|r| r == canonical) => canonical.to_string(),
            _ => trimmed.to_string(),
        };
        resolved.push(name);
    }

    resolved
}
