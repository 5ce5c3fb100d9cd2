use crate::atr::AverageTrueRange;
use crate::{Indicator, IndicatorError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use supertrend_core::{BandSide, BarSeries, FinalBand, Num, SeriesError, Trend, TrendPoint};
use tracing::{debug, trace};

/// Parameters of a SuperTrend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperTrendConfig {
    /// ATR lookback length.
    pub period: usize,
    /// Scales the ATR into the band width.
    pub multiplier: Decimal,
}

impl Default for SuperTrendConfig {
    fn default() -> Self {
        Self {
            period: 10,
            multiplier: Decimal::from(3),
        }
    }
}

/// SuperTrend indicator.
///
/// Each bar gets a basic upper and lower band, `(high + low) / 2 ± multiplier × ATR`.
/// The final bands follow the basic ones only when that tightens them or when the
/// previous close has broken through; otherwise they hold their previous value.
/// The trend flips when the close crosses the active final band, and the stop line
/// is the band on the opposite side of price.
///
/// Results are cached per bar index and filled in ascending order, so querying any
/// index costs at most one pass over the bars not yet evaluated. One engine serves
/// one series; queries take `&mut self`.
#[derive(Debug, Clone)]
pub struct SuperTrend<S: BarSeries> {
    atr: AverageTrueRange<S>,
    period: usize,
    multiplier: S::Value,
    // Always the same length: bars `0..trend.len()` are resolved.
    upper: Vec<FinalBand<S::Value>>,
    lower: Vec<FinalBand<S::Value>>,
    trend: Vec<TrendPoint<S::Value>>,
}

impl<S: BarSeries> SuperTrend<S> {
    pub fn new(series: S, period: usize, multiplier: S::Value) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::Configuration(
                "SuperTrend period must be > 0".into(),
            ));
        }
        // Written as a negated comparison so that NaN is rejected too.
        if !(multiplier > <S::Value as Num>::ZERO) {
            return Err(IndicatorError::Configuration(format!(
                "SuperTrend multiplier must be > 0, got {}",
                multiplier
            )));
        }
        debug!(period, %multiplier, bars = series.len(), "SuperTrend created");
        Ok(Self {
            atr: AverageTrueRange::new(series, period)?,
            period,
            multiplier,
            upper: Vec::new(),
            lower: Vec::new(),
            trend: Vec::new(),
        })
    }

    pub fn series(&self) -> &S {
        self.atr.series()
    }

    pub fn multiplier(&self) -> S::Value {
        self.multiplier
    }

    /// Average true range of the window ending at `index`.
    pub fn atr(&self, index: usize) -> Result<S::Value, SeriesError> {
        self.atr.at(index)
    }

    /// The band at `index` before any adjustment against earlier bars.
    pub fn basic_band(&self, index: usize, side: BandSide) -> Result<S::Value, SeriesError> {
        let (upper, lower) = self.basic_bands(index)?;
        Ok(match side {
            BandSide::Upper => upper,
            BandSide::Lower => lower,
        })
    }

    pub fn final_band(
        &mut self,
        index: usize,
        side: BandSide,
    ) -> Result<FinalBand<S::Value>, IndicatorError> {
        self.fill_to(index)?;
        Ok(match side {
            BandSide::Upper => self.upper[index],
            BandSide::Lower => self.lower[index],
        })
    }

    /// Trend and stop line at `index`.
    pub fn compute(&mut self, index: usize) -> Result<TrendPoint<S::Value>, IndicatorError> {
        self.fill_to(index)?;
        Ok(self.trend[index])
    }

    pub fn trend(&mut self, index: usize) -> Result<Trend, IndicatorError> {
        Ok(self.compute(index)?.trend)
    }

    pub fn stop_value(&mut self, index: usize) -> Result<S::Value, IndicatorError> {
        Ok(self.compute(index)?.value)
    }

    /// The point at the last bar of the series.
    pub fn latest(&mut self) -> Result<TrendPoint<S::Value>, IndicatorError> {
        let end = self.end_index()?;
        self.compute(end)
    }

    /// Every point of the series, in bar order.
    pub fn points(&mut self) -> Result<Vec<TrendPoint<S::Value>>, IndicatorError> {
        if let Some(end) = self.series().end_index() {
            self.fill_to(end)?;
        }
        Ok(self.trend.clone())
    }

    /// Summary of the last bar, for display.
    pub fn report(&mut self) -> Result<SuperTrendReport<S::Value>, IndicatorError> {
        let point = self.latest()?;
        Ok(SuperTrendReport {
            period: self.period,
            multiplier: self.multiplier,
            point,
        })
    }

    fn end_index(&self) -> Result<usize, SeriesError> {
        self.series().end_index().ok_or(SeriesError::IndexOutOfRange {
            index: 0,
            len: 0,
        })
    }

    fn basic_bands(&self, index: usize) -> Result<(S::Value, S::Value), SeriesError> {
        let two = <S::Value as Num>::from_usize(2);
        let midpoint = (self.series().high(index)? + self.series().low(index)?) / two;
        let offset = self.multiplier * self.atr(index)?;
        Ok((midpoint + offset, midpoint - offset))
    }

    /// Resolve every bar up to and including `index`.
    fn fill_to(&mut self, index: usize) -> Result<(), SeriesError> {
        let from = self.trend.len();
        if index < from {
            return Ok(());
        }
        let len = self.series().len();
        if index >= len {
            return Err(SeriesError::IndexOutOfRange { index, len });
        }
        debug!(from, to = index, "Resolving SuperTrend bars");
        for i in from..=index {
            let (upper, lower, point) = self.resolve(i)?;
            self.upper.push(upper);
            self.lower.push(lower);
            self.trend.push(point);
        }
        Ok(())
    }

    /// Resolve bar `i`, given bars `0..i` are already resolved.
    #[allow(clippy::type_complexity)]
    fn resolve(
        &self,
        i: usize,
    ) -> Result<
        (
            FinalBand<S::Value>,
            FinalBand<S::Value>,
            TrendPoint<S::Value>,
        ),
        SeriesError,
    > {
        let (basic_upper, basic_lower) = self.basic_bands(i)?;
        if i < self.period {
            let zero = <S::Value as Num>::ZERO;
            let upper = FinalBand {
                current: basic_upper,
                previous: zero,
            };
            let lower = FinalBand {
                current: basic_lower,
                previous: zero,
            };
            return Ok((upper, lower, TrendPoint::up(lower.current)));
        }

        let prev_close = self.series().close(i - 1)?;
        let close = self.series().close(i)?;
        let upper = next_upper_band(self.upper[i - 1], basic_upper, prev_close);
        let lower = next_lower_band(self.lower[i - 1], basic_lower, prev_close);
        let prev = self.trend[i - 1];
        let point = next_trend(prev, upper, lower, close);
        if point.trend != prev.trend {
            trace!(index = i, trend = %point.trend, value = %point.value, "SuperTrend flipped");
        }
        Ok((upper, lower, point))
    }
}

impl<S: BarSeries<Value = Decimal>> SuperTrend<S> {
    pub fn from_config(series: S, config: &SuperTrendConfig) -> Result<Self, IndicatorError> {
        Self::new(series, config.period, config.multiplier)
    }
}

impl<S: BarSeries> Indicator for SuperTrend<S> {
    type Output = TrendPoint<S::Value>;

    fn value(&mut self, index: usize) -> Result<Self::Output, IndicatorError> {
        self.compute(index)
    }

    fn reset(&mut self) {
        self.upper.clear();
        self.lower.clear();
        self.trend.clear();
    }

    fn period(&self) -> usize {
        self.period
    }

    /// Bars before `period` use the warm-up defaults.
    fn is_ready(&self, index: usize) -> bool {
        index >= self.period
    }
}

/// The upper band only moves down, unless the previous close broke above it.
fn next_upper_band<N: Num>(prev: FinalBand<N>, basic: N, prev_close: N) -> FinalBand<N> {
    let current = if basic < prev.current || prev_close > prev.current {
        basic
    } else {
        prev.current
    };
    FinalBand {
        current,
        previous: prev.current,
    }
}

/// The lower band only moves up, unless the previous close broke below it.
fn next_lower_band<N: Num>(prev: FinalBand<N>, basic: N, prev_close: N) -> FinalBand<N> {
    let current = if basic > prev.current || prev_close < prev.current {
        basic
    } else {
        prev.current
    };
    FinalBand {
        current,
        previous: prev.current,
    }
}

/// The previous stop line tells which band was active: it is identical (exact
/// equality) to that band's previous value.
fn next_trend<N: Num>(
    prev: TrendPoint<N>,
    upper: FinalBand<N>,
    lower: FinalBand<N>,
    close: N,
) -> TrendPoint<N> {
    if prev.value == upper.previous && close <= upper.current {
        TrendPoint::down(upper.current)
    } else if prev.value == upper.previous && close > upper.current {
        TrendPoint::up(lower.current)
    } else if prev.value == lower.previous && close >= lower.current {
        TrendPoint::up(lower.current)
    } else if prev.value == lower.previous && close < lower.current {
        TrendPoint::down(upper.current)
    } else {
        // Neither band was active on the previous bar: fall back to the warm-up default.
        TrendPoint::up(lower.current)
    }
}

/// SuperTrend value at the last bar, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuperTrendReport<N> {
    pub period: usize,
    pub multiplier: N,
    pub point: TrendPoint<N>,
}

impl<N: Num> fmt::Display for SuperTrendReport<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SuperTrend {} {}: {}\t{:.6}",
            self.period,
            self.multiplier,
            self.point.trend,
            self.point.value.to_f64()
        )
    }
}
