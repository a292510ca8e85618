//! Loading and merging of the tract-level input tables.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use food_access_map_models::{CountySeat, TractRecord};
use serde::Deserialize;

use crate::tract_id::canonical_tract_id;
use crate::{DatasetError, DatasetPaths};

/// One row of the MessagePack ACS snapshot.
///
/// Field names match the snapshot producer's column names exactly; see
/// the `columns` module in the models crate.
#[derive(Debug, Deserialize)]
struct AcsRow {
    #[serde(rename = "County")]
    county: String,
    tract: String,
    geometry: Option<geojson::Geometry>,
    pct_poverty: Option<f64>,
    pct_no_vehicle: Option<f64>,
    pct_fewer_vehicles: Option<f64>,
}

/// One row of the food-insecurity CSV.
#[derive(Debug, Deserialize)]
struct FoodInsecurityRow {
    #[serde(rename = "County")]
    county: String,
    tract: String,
    pct_food_insecure: Option<f64>,
}

fn require_exists(path: &Path) -> Result<(), DatasetError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DatasetError::FileNotFound(path.to_path_buf()))
    }
}

/// Loads, joins and filters the per-tract record set.
///
/// The ACS snapshot and the food-insecurity CSV are outer-joined on
/// (County, tract): a tract present in only one source is retained with
/// nulls for the other source's indicators. Duplicate keys are collapsed
/// last-wins. When a county-seats path is configured, tracts outside its
/// county list are dropped.
///
/// # Errors
///
/// Returns [`DatasetError::FileNotFound`] for a missing input,
/// [`DatasetError::ParseTract`] for a malformed tract id, and decode
/// errors for unreadable snapshot or CSV content.
pub fn load(paths: &DatasetPaths) -> Result<Vec<TractRecord>, DatasetError> {
    require_exists(&paths.acs)?;
    require_exists(&paths.food_insecurity)?;

    let snapshot = fs::read(&paths.acs)?;
    let acs_rows: Vec<AcsRow> = rmp_serde::from_slice(&snapshot)?;
    log::info!(
        "Loaded {} ACS tract rows from {}",
        acs_rows.len(),
        paths.acs.display()
    );

    // Insertion order is preserved; the index map makes the join and the
    // last-wins dedupe one pass each.
    let mut records: Vec<TractRecord> = Vec::with_capacity(acs_rows.len());
    let mut index: BTreeMap<(String, String), usize> = BTreeMap::new();

    for row in acs_rows {
        let record = TractRecord {
            geometry: row.geometry,
            pct_poverty: row.pct_poverty,
            pct_no_vehicle: row.pct_no_vehicle,
            pct_fewer_vehicles: row.pct_fewer_vehicles,
            ..TractRecord::new(row.county, row.tract)
        };
        let key = (record.county.clone(), record.tract.clone());
        if let Some(&i) = index.get(&key) {
            records[i] = record;
        } else {
            index.insert(key, records.len());
            records.push(record);
        }
    }

    let mut reader = csv::Reader::from_path(&paths.food_insecurity)?;
    let mut food_rows = 0_usize;
    for result in reader.deserialize() {
        let row: FoodInsecurityRow = result?;
        let tract = canonical_tract_id(&row.tract)?;
        let key = (row.county.clone(), tract.clone());
        food_rows += 1;

        if let Some(&i) = index.get(&key) {
            records[i].pct_food_insecure = row.pct_food_insecure;
        } else {
            let mut record = TractRecord::new(row.county, tract);
            record.pct_food_insecure = row.pct_food_insecure;
            index.insert(key, records.len());
            records.push(record);
        }
    }
    log::info!(
        "Merged {food_rows} food-insecurity rows; {} tracts after outer join",
        records.len()
    );

    if let Some(county_seats) = &paths.county_seats {
        let allowed: BTreeSet<String> = load_county_seats(county_seats)?
            .into_iter()
            .map(|seat| seat.county)
            .collect();
        let before = records.len();
        records.retain(|record| allowed.contains(&record.county));
        log::info!(
            "County filter kept {} of {before} tracts ({} counties)",
            records.len(),
            allowed.len()
        );
    }

    Ok(records)
}

/// Loads the county-seat reference CSV.
///
/// # Errors
///
/// Returns [`DatasetError::FileNotFound`] or a CSV decode error.
pub fn load_county_seats(path: &Path) -> Result<Vec<CountySeat>, DatasetError> {
    require_exists(path)?;
    let mut reader = csv::Reader::from_path(path)?;
    let mut seats = Vec::new();
    for result in reader.deserialize() {
        seats.push(result?);
    }
    Ok(seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::io::Write;

    #[derive(Serialize)]
    struct SnapshotRow<'a> {
        #[serde(rename = "County")]
        county: &'a str,
        tract: &'a str,
        geometry: Option<geojson::Geometry>,
        pct_poverty: Option<f64>,
        pct_no_vehicle: Option<f64>,
        pct_fewer_vehicles: Option<f64>,
    }

    fn snapshot_row<'a>(county: &'a str, tract: &'a str, poverty: f64) -> SnapshotRow<'a> {
        SnapshotRow {
            county,
            tract,
            geometry: None,
            pct_poverty: Some(poverty),
            pct_no_vehicle: Some(5.0),
            pct_fewer_vehicles: Some(3.0),
        }
    }

    fn write_snapshot(dir: &Path, rows: &[SnapshotRow<'_>]) -> std::path::PathBuf {
        let path = dir.join("acs.msgpack");
        let bytes = rmp_serde::to_vec_named(rows).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("food_access_loader_{tag}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn outer_join_retains_one_sided_tracts() {
        let dir = temp_dir("outer");
        let acs = write_snapshot(&dir, &[snapshot_row("Forsyth", "1.00", 10.0)]);
        let food = write_file(
            &dir,
            "food.csv",
            "County,tract,pct_food_insecure\nForsyth,1,12.5\nSurry,9.02,20.0\n",
        );

        let records = load(&DatasetPaths {
            acs,
            food_insecurity: food,
            county_seats: None,
        })
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pct_food_insecure, Some(12.5));
        assert_eq!(records[0].pct_poverty, Some(10.0));
        // Insecurity-only tract keeps nulls for the ACS indicators.
        assert_eq!(records[1].county, "Surry");
        assert_eq!(records[1].tract, "9.02");
        assert_eq!(records[1].pct_poverty, None);
        assert_eq!(records[1].pct_food_insecure, Some(20.0));
    }

    #[test]
    fn canonicalizes_food_insecurity_tract_ids() {
        let dir = temp_dir("canon");
        let acs = write_snapshot(&dir, &[snapshot_row("Forsyth", "5.10", 10.0)]);
        let food = write_file(
            &dir,
            "food.csv",
            "County,tract,pct_food_insecure\nForsyth,5.1,33.0\n",
        );

        let records = load(&DatasetPaths {
            acs,
            food_insecurity: food,
            county_seats: None,
        })
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pct_food_insecure, Some(33.0));
    }

    #[test]
    fn duplicate_keys_collapse_last_wins() {
        let dir = temp_dir("dedupe");
        let acs = write_snapshot(
            &dir,
            &[
                snapshot_row("Forsyth", "1.00", 10.0),
                snapshot_row("Forsyth", "1.00", 40.0),
            ],
        );
        let food = write_file(&dir, "food.csv", "County,tract,pct_food_insecure\n");

        let records = load(&DatasetPaths {
            acs,
            food_insecurity: food,
            county_seats: None,
        })
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pct_poverty, Some(40.0));
    }

    #[test]
    fn county_allow_list_filters_tracts() {
        let dir = temp_dir("filter");
        let acs = write_snapshot(
            &dir,
            &[
                snapshot_row("Forsyth", "1.00", 10.0),
                snapshot_row("Mecklenburg", "2.00", 20.0),
            ],
        );
        let food = write_file(&dir, "food.csv", "County,tract,pct_food_insecure\n");
        let seats = write_file(
            &dir,
            "seats.csv",
            "County,CountySeat,lat,lon\nForsyth,Winston-Salem,36.09,-80.24\n",
        );

        let records = load(&DatasetPaths {
            acs,
            food_insecurity: food,
            county_seats: Some(seats),
        })
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].county, "Forsyth");
    }

    #[test]
    fn missing_snapshot_is_file_not_found() {
        let dir = temp_dir("missing");
        let food = write_file(&dir, "food.csv", "County,tract,pct_food_insecure\n");

        let err = load(&DatasetPaths {
            acs: dir.join("nope.msgpack"),
            food_insecurity: food,
            county_seats: None,
        })
        .unwrap_err();

        assert!(matches!(err, DatasetError::FileNotFound(_)));
    }

    #[test]
    fn malformed_tract_id_propagates() {
        let dir = temp_dir("badtract");
        let acs = write_snapshot(&dir, &[snapshot_row("Forsyth", "1.00", 10.0)]);
        let food = write_file(
            &dir,
            "food.csv",
            "County,tract,pct_food_insecure\nForsyth,not-a-tract,1.0\n",
        );

        let err = load(&DatasetPaths {
            acs,
            food_insecurity: food,
            county_seats: None,
        })
        .unwrap_err();

        assert!(matches!(err, DatasetError::ParseTract { .. }));
    }

    #[test]
    fn loads_county_seats() {
        let dir = temp_dir("seats");
        let seats = write_file(
            &dir,
            "seats.csv",
            "County,CountySeat,lat,lon\nForsyth,Winston-Salem,36.09,-80.24\n",
        );
        let rows = load_county_seats(&seats).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].county_seat, "Winston-Salem");
        assert!((rows[0].lat - 36.09).abs() < 1e-9);
    }
}
