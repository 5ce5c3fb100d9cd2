use crate::{Indicator, IndicatorError};
use supertrend_core::{BarSeries, Num, SeriesError};

/// Simple (unsmoothed) Average True Range: the mean true range over the last
/// `period` bars ending at `index`.
///
/// Window slots before bar 0 take the true range of bar 0, so the divisor is
/// always `period`.
pub fn simple_atr<S: BarSeries>(
    series: &S,
    index: usize,
    period: usize,
) -> Result<S::Value, SeriesError> {
    let start = (index + 1).saturating_sub(period);
    let missing = period - (index + 1 - start);
    let mut sum = <S::Value as Num>::ZERO;
    if missing > 0 {
        sum = series.true_range(0)? * <S::Value as Num>::from_usize(missing);
    }
    for i in start..=index {
        sum = sum + series.true_range(i)?;
    }
    Ok(sum / <S::Value as Num>::from_usize(period))
}

/// Average True Range over a bar series.
#[derive(Debug, Clone)]
pub struct AverageTrueRange<S> {
    series: S,
    len: usize,
}

impl<S: BarSeries> AverageTrueRange<S> {
    pub fn new(series: S, period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::Configuration(
                "ATR period must be > 0".into(),
            ));
        }
        Ok(Self {
            series,
            len: period,
        })
    }

    pub fn series(&self) -> &S {
        &self.series
    }

    /// ATR at `index`; nothing is cached, so this only needs `&self`.
    pub fn at(&self, index: usize) -> Result<S::Value, SeriesError> {
        simple_atr(&self.series, index, self.len)
    }
}

impl<S: BarSeries> Indicator for AverageTrueRange<S> {
    type Output = S::Value;

    fn value(&mut self, index: usize) -> Result<S::Value, IndicatorError> {
        Ok(self.at(index)?)
    }

    fn reset(&mut self) {}

    fn period(&self) -> usize {
        self.len
    }
}
