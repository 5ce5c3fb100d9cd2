use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub instrument: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction of a SuperTrend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    /// Close at or above the lower band; the lower band trails as support.
    Up,
    /// Close at or below the upper band; the upper band trails as resistance.
    Down,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => f.write_str("UP"),
            Trend::Down => f.write_str("DOWN"),
        }
    }
}

/// Indicator output at one bar: the direction and the active stop line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint<N> {
    pub trend: Trend,
    pub value: N,
}

impl<N> TrendPoint<N> {
    pub fn up(value: N) -> Self {
        Self {
            trend: Trend::Up,
            value,
        }
    }

    pub fn down(value: N) -> Self {
        Self {
            trend: Trend::Down,
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

/// Which volatility band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSide {
    Upper,
    Lower,
}

/// A resolved band at one bar together with the resolved band of the bar before.
///
/// `previous` is zero for warm-up bars, where no earlier final band exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalBand<N> {
    pub current: N,
    pub previous: N,
}
