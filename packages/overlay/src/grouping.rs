//! Clustering of overlay rows into one marker per location.
//!
//! Several programs often share a building, and re-geocoding the same
//! address can produce near-duplicate coordinates. Rows are therefore
//! grouped by a fuzzy address key (or rounded coordinates when no address
//! fields exist) and each group renders as a single marker at the mean
//! coordinate with a composed description.

use std::collections::{BTreeMap, BTreeSet};

use food_access_map_models::{AddressGroup, UploadedLocation, columns};

/// Groups mappable rows into one [`AddressGroup`] per location.
///
/// Rows without both coordinates are dropped (they cannot be placed on a
/// map). When `selected_program_types` is non-empty, only rows whose
/// program type is selected are kept. The grouping key is the lower-cased
/// pipe-join of the non-null address fields (Address, Address Line 2,
/// City, Zip, in that order), falling back to coordinates rounded to six
/// decimal places. Groups preserve first-appearance order.
#[must_use]
pub fn group_locations(
    rows: &[UploadedLocation],
    selected_program_types: &BTreeSet<String>,
) -> Vec<AddressGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Vec<&UploadedLocation>> = BTreeMap::new();

    for row in rows {
        let (Some(lat), Some(lon)) = (row.lat, row.lon) else {
            continue;
        };
        if !selected_program_types.is_empty()
            && !selected_program_types.contains(&row.program_type)
        {
            continue;
        }

        let key = address_key(row).unwrap_or_else(|| format!("{lat:.6}_{lon:.6}"));
        let members = groups.entry(key.clone()).or_default();
        if members.is_empty() {
            order.push(key);
        }
        members.push(row);
    }

    order
        .into_iter()
        .map(|key| {
            let members = &groups[&key];
            build_group(key, members)
        })
        .collect()
}

/// Sorted distinct program types present in the rows, excluding the
/// default `"Client"` type (clients are always shown; the filter controls
/// program markers only).
#[must_use]
pub fn available_program_types(rows: &[UploadedLocation]) -> Vec<String> {
    let types: BTreeSet<&str> = rows
        .iter()
        .map(|r| r.program_type.as_str())
        .filter(|t| *t != columns::DEFAULT_PROGRAM_TYPE)
        .collect();
    types.into_iter().map(String::from).collect()
}

fn address_key(row: &UploadedLocation) -> Option<String> {
    let parts: Vec<String> = [
        row.address.as_deref(),
        row.address_line_2.as_deref(),
        row.city.as_deref(),
        row.zip.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|part| part.trim().to_lowercase())
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}

#[allow(clippy::cast_precision_loss)]
fn build_group(key: String, members: &[&UploadedLocation]) -> AddressGroup {
    let count = members.len();
    let lat = members.iter().filter_map(|m| m.lat).sum::<f64>() / count as f64;
    let lon = members.iter().filter_map(|m| m.lon).sum::<f64>() / count as f64;

    let program_types: BTreeSet<&str> =
        members.iter().map(|m| m.program_type.as_str()).collect();

    let description = members
        .iter()
        .map(|m| describe(m))
        .collect::<Vec<_>>()
        .join("\n");

    AddressGroup {
        key,
        lat,
        lon,
        program_types: program_types.into_iter().map(String::from).collect(),
        description,
        members: count,
    }
}

fn describe(row: &UploadedLocation) -> String {
    row.facility.as_ref().map_or_else(
        || row.program_type.clone(),
        |facility| format!("{facility} ({})", row.program_type),
    )
}
