#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Uploaded client/program location handling.
//!
//! Users upload CSV or XLSX files with either coordinates or address fields
//! under loosely spelled headers. This crate canonicalizes the headers, validates
//! the required fields, keeps one table per source filename (re-upload
//! replaces, never appends), and derives the per-address marker groups the
//! map renderer consumes. It also produces the two-way geocoded /
//! failed-address CSV export.

pub mod export;
pub mod grouping;
pub mod headers;
pub mod registry;
pub mod upload;

pub use export::{split_by_geocoded, write_failed_csv, write_mapped_csv};
pub use grouping::{available_program_types, group_locations};
pub use registry::UploadRegistry;
pub use upload::{UploadedTable, parse_upload};

/// Errors from upload handling.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// The upload has neither coordinate columns nor complete address
    /// columns. Rejected before any row is processed.
    #[error(
        "upload {source_file:?} must contain either lat/lon columns \
         or Address, City and Zip columns"
    )]
    MissingRequiredFields {
        /// The offending upload's filename.
        source_file: String,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX reading failed.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
