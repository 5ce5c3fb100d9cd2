use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Sub};

/// Arithmetic the indicators need from a price type.
///
/// Implemented for [`Decimal`] (exact, the default for market data) and `f64`.
/// Equality is exact on both: no tolerance is applied anywhere.
pub trait Num:
    Copy
    + PartialOrd
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Additive identity.
    const ZERO: Self;

    fn from_usize(n: usize) -> Self;

    /// Lossy conversion used for reporting.
    fn to_f64(self) -> f64;
}

impl Num for Decimal {
    const ZERO: Self = Decimal::ZERO;

    fn from_usize(n: usize) -> Self {
        Decimal::from(n)
    }

    fn to_f64(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }
}

impl Num for f64 {
    const ZERO: Self = 0.0;

    fn from_usize(n: usize) -> Self {
        n as f64
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// The larger of two values; `a` wins ties and unordered pairs.
pub fn larger<N: Num>(a: N, b: N) -> N {
    if b > a {
        b
    } else {
        a
    }
}

/// Absolute difference `|a - b|`.
pub fn distance<N: Num>(a: N, b: N) -> N {
    if a >= b {
        a - b
    } else {
        b - a
    }
}
