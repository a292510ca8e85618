//! Free-form query construction from an uploaded row's address fields.

use food_access_map_models::UploadedLocation;

/// Builds the Nominatim query for a row:
/// `"{address} {line2} {city}, {state} {zip}"`.
///
/// Returns `None` when address, city or zip is missing or blank — such a
/// row cannot be geocoded and keeps null coordinates.
#[must_use]
pub fn build_query(row: &UploadedLocation, state: &str) -> Option<String> {
    let address = non_blank(row.address.as_deref())?;
    let city = non_blank(row.city.as_deref())?;
    let zip = non_blank(row.zip.as_deref())?;

    let mut query = address.to_string();
    if let Some(line2) = non_blank(row.address_line_2.as_deref()) {
        query.push(' ');
        query.push_str(line2);
    }
    query.push(' ');
    query.push_str(city);
    query.push_str(", ");
    query.push_str(state);
    query.push(' ');
    query.push_str(zip);
    Some(query)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
