//! Money Module
//!
//! All amounts are fixed-point integers counting minor units (cents). Decimal
//! values only exist at the API boundary and are converted here.
//!
//! ## Conversion
//! - Client → internal: `Currency::from_decimal(5.0)` = 500 minor units
//! - Internal → client: `Currency::from_minor(99_500).to_decimal()` = 995.0
//!
//! Fractions below one minor unit are truncated toward zero.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Minor units per major unit.
pub const SCALE: i64 = 100;

/// Largest distance from an integer product still treated as that integer.
/// `0.29 * 100.0` is `28.999999999999996` in binary floating point.
const SNAP_EPSILON: f64 = 1e-6;

/// Fixed-point money amount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Currency(i64);

impl Currency {
    pub const ZERO: Currency = Currency(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Convert a decimal client amount to minor units, truncating sub-cent
    /// fractions. Non-finite input maps to zero; out-of-range input saturates.
    pub fn from_decimal(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let scaled = value * SCALE as f64;
        let nearest = scaled.round();
        let minor = if (scaled - nearest).abs() < SNAP_EPSILON {
            nearest
        } else {
            scaled.trunc()
        };
        // `as` saturates at the i64 bounds
        Self(minor as i64)
    }

    /// Like [`Currency::from_decimal`], but `None` for non-finite input or an
    /// amount that does not fit in `i64` minor units.
    pub fn try_from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() || (value * SCALE as f64).abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self::from_decimal(value))
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn checked_add(self, other: Currency) -> Option<Currency> {
        self.0.checked_add(other.0).map(Currency)
    }

    pub fn checked_sub(self, other: Currency) -> Option<Currency> {
        self.0.checked_sub(other.0).map(Currency)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Decimal::new(self.0, 2))
    }
}
