//! Tract identifier canonicalization.
//!
//! The geometry snapshot stores tract ids in `"<int>.<2-digit>"` form
//! (e.g. `"105.02"`). The food-insecurity CSV loses trailing zeros and
//! sometimes the whole decimal suffix (`"5"`, `"5.1"`), so its ids are
//! rewritten to the snapshot's form before joining.

use crate::DatasetError;

/// Canonicalizes a raw tract identifier: `"5"` → `"5.00"`, `"5.1"` →
/// `"5.10"`, `"105.02"` unchanged. The integer part is kept verbatim
/// (`"05.1"` → `"05.10"`) so the join key matches the snapshot exactly.
///
/// # Errors
///
/// Returns [`DatasetError::ParseTract`] when either side of the decimal
/// point is non-numeric; malformed ids are surfaced, never coerced.
pub fn canonical_tract_id(raw: &str) -> Result<String, DatasetError> {
    let raw = raw.trim();
    let (left, right) = raw.split_once('.').unwrap_or((raw, "00"));
    let right = match right.len() {
        0 => "00".to_string(),
        1 => format!("{right}0"),
        _ => right.to_string(),
    };

    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !numeric(left) || !numeric(&right) {
        return Err(DatasetError::ParseTract {
            value: raw.to_string(),
        });
    }

    Ok(format!("{left}.{right}"))
}
