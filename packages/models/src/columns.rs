//! Canonical column names shared by every pipeline stage.
//!
//! Several historical versions of this tool coupled stages together through
//! bare string column names; keeping the names in one place prevents silent
//! mismatches between the loader, the score processor and the exports.

/// County name column (tract key, part 1).
pub const COUNTY: &str = "County";
/// Tract identifier column (tract key, part 2).
pub const TRACT: &str = "tract";
/// Poverty rate column.
pub const PCT_POVERTY: &str = "pct_poverty";
/// No-vehicle household rate column.
pub const PCT_NO_VEHICLE: &str = "pct_no_vehicle";
/// Fewer-vehicles-than-members household rate column.
pub const PCT_FEWER_VEHICLES: &str = "pct_fewer_vehicles";
/// Food-insecurity rate column.
pub const PCT_FOOD_INSECURE: &str = "pct_food_insecure";
/// Selected vehicle measure column (derived).
pub const PCT_VEHICLE: &str = "pct_vehicle";
/// Combined weighted score column (derived).
pub const COMBINED_PCT: &str = "combined_pct";

/// Latitude column in uploads and exports.
pub const LAT: &str = "lat";
/// Longitude column in uploads and exports.
pub const LON: &str = "lon";
/// Street address column.
pub const ADDRESS: &str = "Address";
/// Second address line column.
pub const ADDRESS_LINE_2: &str = "Address Line 2";
/// City column.
pub const CITY: &str = "City";
/// ZIP code column.
pub const ZIP: &str = "Zip";
/// Facility / program name column.
pub const FACILITY: &str = "Facility";
/// Program type column.
pub const PROGRAM_TYPE: &str = "Program Type";
/// Upload provenance column.
pub const SOURCE_FILE: &str = "source_file";

/// Program type assigned to rows that do not carry one.
pub const DEFAULT_PROGRAM_TYPE: &str = "Client";
