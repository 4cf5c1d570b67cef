// src/gps/coord.rs
//! NMEA degree-minute coordinate conversion

use super::data::FieldValue;

/// Convert a `DDDMM.MMMM` value and hemisphere letter to signed decimal degrees.
///
/// `S` and `W` yield negative values. Returns `None` for non-numeric input.
pub fn decimal_degrees(value: &str, hemisphere: &str) -> Option<f64> {
    let raw = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere {
        "S" | "W" => Some(-decimal),
        _ => Some(decimal),
    }
}

/// Format a coordinate as `48.117300°N`: absolute value, 6 decimals,
/// hemisphere suffix.
pub fn format_coordinate(value: &str, hemisphere: &str) -> FieldValue {
    match decimal_degrees(value, hemisphere) {
        Some(decimal) => FieldValue::Value(format!("{:.6}°{}", decimal.abs(), hemisphere)),
        None => FieldValue::ParseError,
    }
}

/// Coordinate from a (value, hemisphere) field pair; blank pairs are `Unknown`
pub fn coordinate_field(value: &str, hemisphere: &str) -> FieldValue {
    if value.is_empty() || hemisphere.is_empty() {
        FieldValue::Unknown
    } else {
        format_coordinate(value, hemisphere)
    }
}
