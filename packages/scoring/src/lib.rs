#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Combined-score computation for census tracts.
//!
//! Three indicator columns (poverty, vehicle access, food insecurity) are
//! optionally rescaled to a common 0-100 range, then combined per tract
//! with a zero-aware weighted mean. The processor is a pure function over
//! the loaded tract records: it clones, annotates and returns, so the
//! caller's copy is never mutated.

pub mod normalize;
pub mod weighted;

use food_access_map_models::{ConfigError, ScoreWeights, TractRecord, VehicleMode};

pub use normalize::normalize_column;
pub use weighted::weighted_mean;

/// Computes `pct_vehicle` and `combined_pct` for every record.
///
/// Steps: select the vehicle measure per `weights.vehicle_mode`, normalize
/// the three indicator columns per `weights.normalize` (remaining nulls are
/// zero-filled so every tract still renders), then combine with
/// [`weighted_mean`]. When `weights.normalize` is true the combined score
/// is a convex combination of values in `[0, 100]` and stays in that range.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidWeight`] if any weight is negative or
/// non-finite. Weight validation happens before any computation.
pub fn process(
    records: &[TractRecord],
    weights: &ScoreWeights,
) -> Result<Vec<TractRecord>, ConfigError> {
    weights.validate()?;

    let mut out = records.to_vec();

    let vehicle: Vec<Option<f64>> = out
        .iter()
        .map(|r| match weights.vehicle_mode {
            VehicleMode::NoVehicle => r.pct_no_vehicle,
            VehicleMode::FewerVehicles => r.pct_fewer_vehicles,
        })
        .collect();
    let poverty: Vec<Option<f64>> = out.iter().map(|r| r.pct_poverty).collect();
    let food: Vec<Option<f64>> = out.iter().map(|r| r.pct_food_insecure).collect();

    let poverty = normalize_column(&poverty, weights.normalize);
    let vehicle = normalize_column(&vehicle, weights.normalize);
    let food = normalize_column(&food, weights.normalize);

    for (i, record) in out.iter_mut().enumerate() {
        let pct_poverty = poverty[i].unwrap_or(0.0);
        let pct_vehicle = vehicle[i].unwrap_or(0.0);
        let pct_food = food[i].unwrap_or(0.0);

        record.pct_poverty = Some(pct_poverty);
        record.pct_vehicle = Some(pct_vehicle);
        record.pct_food_insecure = Some(pct_food);
        record.combined_pct = weighted_mean(
            &[pct_poverty, pct_vehicle, pct_food],
            &[weights.poverty, weights.vehicle, weights.food],
        );
    }

    log::debug!(
        "Scored {} tracts (normalize={}, mode={:?})",
        out.len(),
        weights.normalize,
        weights.vehicle_mode
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tracts() -> Vec<TractRecord> {
        let poverty = [10.0, 20.0, 30.0];
        let no_vehicle = [5.0, 10.0, 15.0];
        let fewer_vehicles = [3.0, 6.0, 9.0];
        let food = [0.0, 50.0, 100.0];

        (0..3)
            .map(|i| TractRecord {
                pct_poverty: Some(poverty[i]),
                pct_no_vehicle: Some(no_vehicle[i]),
                pct_fewer_vehicles: Some(fewer_vehicles[i]),
                pct_food_insecure: Some(food[i]),
                ..TractRecord::new("Forsyth", format!("{}.00", i + 1))
            })
            .collect()
    }

    fn column(records: &[TractRecord], get: impl Fn(&TractRecord) -> Option<f64>) -> Vec<f64> {
        records.iter().map(|r| get(r).unwrap()).collect()
    }

    #[test]
    fn raw_mode_keeps_input_values() {
        let weights = ScoreWeights {
            vehicle: 1.0,
            normalize: false,
            ..ScoreWeights::default()
        };
        let scored = process(&sample_tracts(), &weights).unwrap();
        assert_eq!(column(&scored, |r| r.pct_poverty), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn normalized_mode_rescales_to_0_100() {
        let weights = ScoreWeights {
            vehicle: 1.0,
            ..ScoreWeights::default()
        };
        let scored = process(&sample_tracts(), &weights).unwrap();
        assert_eq!(column(&scored, |r| r.pct_poverty), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn vehicle_mode_selects_fewer_vehicles_column() {
        let weights = ScoreWeights {
            vehicle: 1.0,
            normalize: false,
            vehicle_mode: VehicleMode::FewerVehicles,
            ..ScoreWeights::default()
        };
        let scored = process(&sample_tracts(), &weights).unwrap();
        assert_eq!(column(&scored, |r| r.pct_vehicle), vec![3.0, 6.0, 9.0]);
    }

    #[test]
    fn vehicle_mode_selects_no_vehicle_column() {
        let weights = ScoreWeights {
            vehicle: 1.0,
            normalize: false,
            ..ScoreWeights::default()
        };
        let scored = process(&sample_tracts(), &weights).unwrap();
        assert_eq!(column(&scored, |r| r.pct_vehicle), vec![5.0, 10.0, 15.0]);
    }

    #[test]
    fn combined_score_end_to_end() {
        // All three normalized indicators are 0 for tract 1 and 100 for
        // tract 3, so the combined score pins to the range ends.
        let weights = ScoreWeights {
            vehicle: 1.0,
            ..ScoreWeights::default()
        };
        let scored = process(&sample_tracts(), &weights).unwrap();
        assert!((scored[0].combined_pct - 0.0).abs() < 1e-9);
        assert!((scored[2].combined_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn combined_score_stays_in_range_when_normalized() {
        let weights = ScoreWeights {
            poverty: 2.5,
            vehicle: 0.1,
            food: 7.0,
            ..ScoreWeights::default()
        };
        let scored = process(&sample_tracts(), &weights).unwrap();
        for record in &scored {
            assert!(record.combined_pct >= 0.0);
            assert!(record.combined_pct <= 100.0);
        }
    }

    #[test]
    fn missing_indicators_are_zero_filled() {
        let mut tracts = sample_tracts();
        tracts[1].pct_food_insecure = None;
        let weights = ScoreWeights {
            vehicle: 1.0,
            normalize: false,
            ..ScoreWeights::default()
        };
        let scored = process(&tracts, &weights).unwrap();
        assert_eq!(scored[1].pct_food_insecure, Some(0.0));
        // Zero is "no data" to the weighted mean, so only the two real
        // indicators contribute.
        assert!((scored[1].combined_pct - 15.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_invalid_weights_before_processing() {
        let weights = ScoreWeights {
            poverty: -1.0,
            ..ScoreWeights::default()
        };
        assert!(process(&sample_tracts(), &weights).is_err());
    }

    #[test]
    fn caller_records_are_untouched() {
        let tracts = sample_tracts();
        let weights = ScoreWeights {
            vehicle: 1.0,
            ..ScoreWeights::default()
        };
        let _scored = process(&tracts, &weights).unwrap();
        assert_eq!(tracts[0].pct_poverty, Some(10.0));
        assert!((tracts[0].combined_pct - 0.0).abs() < f64::EPSILON);
    }
}
