use crate::models::Bar;
use crate::num::Num;
use crate::traits::{BarSeries, SeriesError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prices of one bar in the numeric type an indicator computes with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc<N> {
    pub open: N,
    pub high: N,
    pub low: N,
    pub close: N,
}

/// An in-memory price series for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries<N> {
    instrument: String,
    timestamps: Vec<Option<DateTime<Utc>>>,
    bars: Vec<Ohlc<N>>,
}

impl<N: Num> PriceSeries<N> {
    /// Build an untimed series, mostly useful for synthetic data.
    pub fn new(instrument: impl Into<String>, bars: Vec<Ohlc<N>>) -> Self {
        Self {
            instrument: instrument.into(),
            timestamps: vec![None; bars.len()],
            bars,
        }
    }

    /// Build a series from `(high, low, close)` triples; open is set to close.
    pub fn from_hlc(instrument: impl Into<String>, hlc: &[(N, N, N)]) -> Self {
        let bars = hlc
            .iter()
            .map(|&(high, low, close)| Ohlc {
                open: close,
                high,
                low,
                close,
            })
            .collect();
        Self::new(instrument, bars)
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(index).copied().flatten()
    }

    /// Convert every price with `f`, keeping timestamps.
    pub fn map<M: Num>(&self, f: impl Fn(N) -> M) -> PriceSeries<M> {
        PriceSeries {
            instrument: self.instrument.clone(),
            timestamps: self.timestamps.clone(),
            bars: self
                .bars
                .iter()
                .map(|b| Ohlc {
                    open: f(b.open),
                    high: f(b.high),
                    low: f(b.low),
                    close: f(b.close),
                })
                .collect(),
        }
    }

    fn get(&self, index: usize) -> Result<&Ohlc<N>, SeriesError> {
        self.bars.get(index).ok_or(SeriesError::IndexOutOfRange {
            index,
            len: self.bars.len(),
        })
    }
}

impl PriceSeries<Decimal> {
    /// Build a series from loaded bars. The instrument is taken from the first bar.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let instrument = bars
            .first()
            .map(|b| b.instrument.clone())
            .unwrap_or_default();
        Self {
            instrument,
            timestamps: bars.iter().map(|b| Some(b.timestamp)).collect(),
            bars: bars
                .iter()
                .map(|b| Ohlc {
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                })
                .collect(),
        }
    }

    pub fn to_f64(&self) -> PriceSeries<f64> {
        self.map(Num::to_f64)
    }
}

impl<N: Num> BarSeries for PriceSeries<N> {
    type Value = N;

    fn len(&self) -> usize {
        self.bars.len()
    }

    fn high(&self, index: usize) -> Result<N, SeriesError> {
        Ok(self.get(index)?.high)
    }

    fn low(&self, index: usize) -> Result<N, SeriesError> {
        Ok(self.get(index)?.low)
    }

    fn close(&self, index: usize) -> Result<N, SeriesError> {
        Ok(self.get(index)?.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn gap_series() -> PriceSeries<Decimal> {
        PriceSeries::from_hlc(
            "TEST",
            &[
                (dec!(10), dec!(9), dec!(9.5)),
                // gap up: |high - prevClose| dominates
                (dec!(13), dec!(12), dec!(12.5)),
                // gap down: |low - prevClose| dominates
                (dec!(11), dec!(10), dec!(10.5)),
                // inside bar: high - low dominates
                (dec!(12), dec!(9), dec!(11)),
            ],
        )
    }

    #[test]
    fn test_true_range() {
        let s = gap_series();
        assert_eq!(s.true_range(0).unwrap(), dec!(1));
        assert_eq!(s.true_range(1).unwrap(), dec!(3.5));
        assert_eq!(s.true_range(2).unwrap(), dec!(2.5));
        assert_eq!(s.true_range(3).unwrap(), dec!(3));
    }

    #[test]
    fn test_out_of_range() {
        let s = gap_series();
        assert_eq!(s.end_index(), Some(3));
        assert_eq!(
            s.close(4),
            Err(SeriesError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert!(s.true_range(7).is_err());

        let empty: PriceSeries<f64> = PriceSeries::new("EMPTY", Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.end_index(), None);
    }

    #[test]
    fn test_from_bars_and_conversion() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = vec![Bar {
            instrument: "NQ".into(),
            timestamp: ts,
            open: dec!(1.25),
            high: dec!(2),
            low: dec!(1),
            close: dec!(1.5),
            volume: dec!(100),
        }];
        let s = PriceSeries::from_bars(&bars);
        assert_eq!(s.instrument(), "NQ");
        assert_eq!(s.timestamp(0), Some(ts));
        assert_eq!(s.close(0).unwrap(), dec!(1.5));

        let f = s.to_f64();
        assert_eq!(f.high(0).unwrap(), 2.0);
        assert_eq!(f.timestamp(0), Some(ts));
    }
}
