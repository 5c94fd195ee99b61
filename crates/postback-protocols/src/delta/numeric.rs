//! Invariant-culture numeric literals, as read from error codes and
//! version records.

use std::fmt;

use serde::Serialize;

/// A number read with [`parse_invariant_number`].
///
/// Integral finite values are always stored as [`InvariantNumber::Integer`],
/// so `31` and `31.0` compare equal and display the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvariantNumber {
    Integer(i64),
    Float(f64),
}

impl InvariantNumber {
    /// Build from a float, normalizing integral values.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value <= i64::MAX as f64
        {
            Self::Integer(value as i64)
        } else {
            Self::Float(value)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Float(f) if f.is_nan())
    }
}

impl fmt::Display for InvariantNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) if v.is_nan() => write!(f, "NaN"),
            Self::Float(v) if v == f64::INFINITY => write!(f, "Infinity"),
            Self::Float(v) if v == f64::NEG_INFINITY => write!(f, "-Infinity"),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Read a number the way the client-side runtime's invariant parser does.
///
/// Never fails: unparsable input yields NaN.
pub fn parse_invariant_number(text: &str) -> InvariantNumber {
    let text = text.trim();

    match text {
        "+infinity" => return InvariantNumber::Float(f64::INFINITY),
        "-infinity" => return InvariantNumber::Float(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(hex) = text.strip_prefix("0x") {
        if let Ok(value) = i64::from_str_radix(hex, 16) {
            return InvariantNumber::Integer(value);
        }
    }

    match text.parse::<f64>() {
        Ok(value) => InvariantNumber::from_f64(value),
        Err(_) => InvariantNumber::Float(f64::NAN),
    }
}
