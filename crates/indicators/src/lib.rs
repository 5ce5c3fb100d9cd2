pub mod atr;
pub mod supertrend;

pub use atr::AverageTrueRange;
pub use supertrend::{SuperTrend, SuperTrendConfig, SuperTrendReport};

use supertrend_core::SeriesError;

/// Errors produced by indicators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    /// Invalid construction parameters. Never clamped.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A bar read failed; passed through from the series unchanged.
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Trait for indicators evaluated at an index of a bar series.
/// Implementations may cache results; the same index always yields the same output.
pub trait Indicator {
    type Output;

    /// Compute the indicator output at `index`.
    fn value(&mut self, index: usize) -> Result<Self::Output, IndicatorError>;

    /// Drop any cached state.
    fn reset(&mut self);

    /// The lookback length.
    fn period(&self) -> usize;

    /// Whether `index` has a full lookback window behind it.
    fn is_ready(&self, index: usize) -> bool {
        index + 1 >= self.period()
    }
}
