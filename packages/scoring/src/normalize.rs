//! Min-max rescaling of an indicator column to a 0-100 range.

/// Rescales `values` to `[0, 100]` when `enable` is true; identity when
/// false (values, nulls and order preserved exactly).
///
/// A constant or all-null column has no usable range and maps to all
/// zeros of the same length. Nulls survive the rescale untouched; the
/// score processor zero-fills them afterwards.
#[must_use]
pub fn normalize_column(values: &[Option<f64>], enable: bool) -> Vec<Option<f64>> {
    if !enable {
        return values.to_vec();
    }

    let present = values.iter().filter_map(|v| *v);
    let min = present.clone().fold(f64::INFINITY, f64::min);
    let max = present.fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range == 0.0 {
        return vec![Some(0.0); values.len()];
    }

    values
        .iter()
        .map(|v| v.map(|x| 100.0 * (x - min) / range))
        .collect()
}
