//! Upload parsing and required-field validation.

use std::io::Cursor;

use calamine::{Reader, Xlsx};
use food_access_map_models::{UploadedLocation, columns};

use crate::OverlayError;
use crate::headers::resolve_headers;

/// One parsed upload: the canonicalized rows of a single source file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedTable {
    /// Filename the rows came from (registry key).
    pub source_file: String,
    /// Canonicalized rows.
    pub rows: Vec<UploadedLocation>,
}

/// Parses an uploaded file (CSV or XLSX) into canonical rows.
///
/// The format is picked from the filename extension, falling back to the
/// ZIP magic for an XLSX uploaded under another name. Headers are
/// canonicalized (case/whitespace-insensitive, first-seen-wins on
/// collisions). The upload must provide either `lat`/`lon` columns or
/// `Address`, `City` and `Zip` columns; otherwise it is rejected whole
/// before any row processing — there is no partial ingest of an invalid
/// file. Unparseable coordinate values become nulls (the geocoder gets a
/// chance at the address fields instead), a missing program type defaults
/// to `"Client"`, and unrecognized columns are preserved verbatim for the
/// exports.
///
/// # Errors
///
/// Returns [`OverlayError::MissingRequiredFields`] for an invalid schema
/// and [`OverlayError::Csv`] / [`OverlayError::Xlsx`] for undecodable
/// content.
pub fn parse_upload(source_file: &str, bytes: &[u8]) -> Result<UploadedTable, OverlayError> {
    let table = if is_xlsx(source_file, bytes) {
        parse_xlsx(source_file, bytes)?
    } else {
        parse_csv(source_file, bytes)?
    };

    log::info!("Parsed {} rows from upload {source_file:?}", table.rows.len());
    Ok(table)
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

fn is_xlsx(source_file: &str, bytes: &[u8]) -> bool {
    std::path::Path::new(source_file)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
        || bytes.starts_with(ZIP_MAGIC)
}

fn parse_csv(source_file: &str, bytes: &[u8]) -> Result<UploadedTable, OverlayError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = resolve_headers(reader.headers()?.iter());
    require_schema(source_file, &headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(materialize_row(source_file, &headers, record.iter()));
    }

    Ok(UploadedTable {
        source_file: source_file.to_string(),
        rows,
    })
}

fn parse_xlsx(source_file: &str, bytes: &[u8]) -> Result<UploadedTable, OverlayError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| OverlayError::MissingRequiredFields {
            source_file: source_file.to_string(),
        })??;

    let mut sheet_rows = range.rows();
    let header_cells: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| OverlayError::MissingRequiredFields {
            source_file: source_file.to_string(),
        })?
        .iter()
        .map(ToString::to_string)
        .collect();
    let headers = resolve_headers(header_cells.iter().map(String::as_str));
    require_schema(source_file, &headers)?;

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let cells: Vec<String> = sheet_row.iter().map(ToString::to_string).collect();
        // The used range can trail off into blank rows; skip them.
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(materialize_row(
            source_file,
            &headers,
            cells.iter().map(String::as_str),
        ));
    }

    Ok(UploadedTable {
        source_file: source_file.to_string(),
        rows,
    })
}

fn require_schema(source_file: &str, headers: &[String]) -> Result<(), OverlayError> {
    let has = |name: &str| headers.iter().any(|h| h == name);
    let has_coordinates = has(columns::LAT) && has(columns::LON);
    let has_address = has(columns::ADDRESS) && has(columns::CITY) && has(columns::ZIP);
    if !has_coordinates && !has_address {
        return Err(OverlayError::MissingRequiredFields {
            source_file: source_file.to_string(),
        });
    }
    Ok(())
}

fn materialize_row<'a>(
    source_file: &str,
    headers: &[String],
    cells: impl Iterator<Item = &'a str>,
) -> UploadedLocation {
    let mut row = UploadedLocation {
        source_file: source_file.to_string(),
        ..UploadedLocation::default()
    };

    for (header, value) in headers.iter().zip(cells) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match header.as_str() {
            columns::LAT => row.lat = parse_coordinate(value, columns::LAT, source_file),
            columns::LON => row.lon = parse_coordinate(value, columns::LON, source_file),
            columns::ADDRESS => row.address = Some(value.to_string()),
            columns::ADDRESS_LINE_2 => row.address_line_2 = Some(value.to_string()),
            columns::CITY => row.city = Some(value.to_string()),
            columns::ZIP => row.zip = Some(value.to_string()),
            columns::FACILITY => row.facility = Some(value.to_string()),
            columns::PROGRAM_TYPE => row.program_type = value.to_string(),
            columns::SOURCE_FILE => {} // provenance is assigned here, not inherited
            other => {
                row.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    row
}

fn parse_coordinate(value: &str, column: &str, source_file: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("Unparseable {column} value {value:?} in {source_file:?}; treating as null");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_upload_with_messy_headers() {
        let csv = " LATITUDE , LONGITUDE , Program Type \n35.0,-80.0,Pantry\n";
        let table = parse_upload("sites.csv", csv.as_bytes()).unwrap();

        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.lat, Some(35.0));
        assert_eq!(row.lon, Some(-80.0));
        assert_eq!(row.program_type, "Pantry");
        assert_eq!(row.source_file, "sites.csv");
    }

    #[test]
    fn parses_address_upload() {
        let csv = "Address,City,Zip\n438 W 30th St,Winston-Salem,27105\n";
        let table = parse_upload("clients.csv", csv.as_bytes()).unwrap();

        let row = &table.rows[0];
        assert_eq!(row.address.as_deref(), Some("438 W 30th St"));
        assert_eq!(row.city.as_deref(), Some("Winston-Salem"));
        assert_eq!(row.zip.as_deref(), Some("27105"));
        assert!(!row.has_coordinates());
    }

    #[test]
    fn missing_program_type_defaults_to_client() {
        let csv = "lat,lon\n35.0,-80.0\n";
        let table = parse_upload("clients.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].program_type, "Client");
    }

    #[test]
    fn empty_program_type_cell_defaults_to_client() {
        let csv = "lat,lon,Program Type\n35.0,-80.0,\n";
        let table = parse_upload("clients.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].program_type, "Client");
    }

    #[test]
    fn rejects_uploads_without_required_fields() {
        let csv = "Name,Notes\nSomewhere,hello\n";
        assert!(matches!(
            parse_upload("bad.csv", csv.as_bytes()),
            Err(OverlayError::MissingRequiredFields { .. })
        ));
    }

    #[test]
    fn address_only_subset_is_rejected() {
        // City without Address/Zip is not enough to geocode.
        let csv = "City\nWinston-Salem\n";
        assert!(parse_upload("bad.csv", csv.as_bytes()).is_err());
    }

    #[test]
    fn unknown_columns_are_preserved() {
        let csv = "lat,lon,Case Worker\n35.0,-80.0,J. Doe\n";
        let table = parse_upload("clients.csv", csv.as_bytes()).unwrap();
        assert_eq!(
            table.rows[0].extra.get("Case Worker").map(String::as_str),
            Some("J. Doe")
        );
    }

    #[test]
    fn unparseable_coordinates_become_nulls() {
        let csv = "lat,lon,Address,City,Zip\nnot-a-number,-80.0,438 W 30th St,Winston-Salem,27105\n";
        let table = parse_upload("clients.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].lat, None);
        assert_eq!(table.rows[0].lon, Some(-80.0));
    }

    #[test]
    fn name_column_maps_to_facility() {
        let csv = "Name,lat,lon\nHope Pantry,35.0,-80.0\n";
        let table = parse_upload("sites.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].facility.as_deref(), Some("Hope Pantry"));
    }

    const XLSX_SITES: &[u8] = include_bytes!("../testdata/sites.xlsx");
    const XLSX_NOTES: &[u8] = include_bytes!("../testdata/notes.xlsx");

    #[test]
    fn parses_xlsx_upload_with_numeric_cells() {
        let table = parse_upload("sites.xlsx", XLSX_SITES).unwrap();

        assert_eq!(table.rows.len(), 2);
        let coords = &table.rows[0];
        assert_eq!(coords.facility.as_deref(), Some("Hope Pantry"));
        assert_eq!(coords.lat, Some(36.095));
        assert_eq!(coords.lon, Some(-80.244));
        assert_eq!(coords.program_type, "Pantry");

        // Numeric zip cells come through as their text form.
        let address = &table.rows[1];
        assert_eq!(address.address.as_deref(), Some("438 W 30th St"));
        assert_eq!(address.zip.as_deref(), Some("27105"));
        assert_eq!(address.program_type, "Meal Site");
        assert!(!address.has_coordinates());
    }

    #[test]
    fn xlsx_without_required_fields_is_rejected() {
        assert!(matches!(
            parse_upload("notes.xlsx", XLSX_NOTES),
            Err(OverlayError::MissingRequiredFields { .. })
        ));
    }

    #[test]
    fn xlsx_is_detected_by_magic_when_the_extension_lies() {
        let table = parse_upload("sites.bin", XLSX_SITES).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn xlsx_extension_match_is_case_insensitive() {
        assert!(is_xlsx("SITES.XLSX", b""));
        assert!(!is_xlsx("sites.csv", b"lat,lon\n"));
    }
}
