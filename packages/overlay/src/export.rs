//! Two-way CSV export of upload rows: geocoded vs failed.
//!
//! The mapped export carries coordinates for use outside the dashboard;
//! the failed export drops the (empty) coordinate columns so users can fix
//! the addresses and re-upload the file as-is.

use std::collections::BTreeSet;
use std::io::Write;

use food_access_map_models::{UploadedLocation, columns};

use crate::OverlayError;

/// Splits rows on coordinate presence: `(mapped, failed)`.
#[must_use]
pub fn split_by_geocoded(
    rows: &[UploadedLocation],
) -> (Vec<UploadedLocation>, Vec<UploadedLocation>) {
    rows.iter()
        .cloned()
        .partition(UploadedLocation::has_coordinates)
}

/// Writes the geocoded rows, coordinates included.
///
/// # Errors
///
/// Returns [`OverlayError`] if serialization or the underlying write fails.
pub fn write_mapped_csv<W: Write>(rows: &[UploadedLocation], writer: W) -> Result<(), OverlayError> {
    write_rows(rows, writer, true)
}

/// Writes the failed rows without the lat/lon columns.
///
/// # Errors
///
/// Returns [`OverlayError`] if serialization or the underlying write fails.
pub fn write_failed_csv<W: Write>(rows: &[UploadedLocation], writer: W) -> Result<(), OverlayError> {
    write_rows(rows, writer, false)
}

fn write_rows<W: Write>(
    rows: &[UploadedLocation],
    writer: W,
    include_coordinates: bool,
) -> Result<(), OverlayError> {
    let extra_columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![
        columns::FACILITY,
        columns::ADDRESS,
        columns::ADDRESS_LINE_2,
        columns::CITY,
        columns::ZIP,
        columns::PROGRAM_TYPE,
    ];
    if include_coordinates {
        header.push(columns::LAT);
        header.push(columns::LON);
    }
    header.push(columns::SOURCE_FILE);
    header.extend(extra_columns.iter());
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = vec![
            row.facility.clone().unwrap_or_default(),
            row.address.clone().unwrap_or_default(),
            row.address_line_2.clone().unwrap_or_default(),
            row.city.clone().unwrap_or_default(),
            row.zip.clone().unwrap_or_default(),
            row.program_type.clone(),
        ];
        if include_coordinates {
            record.push(row.lat.map(|v| v.to_string()).unwrap_or_default());
            record.push(row.lon.map(|v| v.to_string()).unwrap_or_default());
        }
        record.push(row.source_file.clone());
        for column in &extra_columns {
            record.push(row.extra.get(*column).cloned().unwrap_or_default());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
