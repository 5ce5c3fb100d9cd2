use crate::num::{distance, larger, Num};

// ---------------------------------------------------------------------------
// Bar Series Trait
// ---------------------------------------------------------------------------

/// Errors raised when reading from a bar series.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    #[error("Index {index} out of range for series of {len} bars")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Random access to the bars of one price series.
///
/// Every accessor fails with [`SeriesError::IndexOutOfRange`] for `index >= len()`.
pub trait BarSeries {
    type Value: Num;

    /// Number of bars.
    fn len(&self) -> usize;

    fn high(&self, index: usize) -> Result<Self::Value, SeriesError>;

    fn low(&self, index: usize) -> Result<Self::Value, SeriesError>;

    fn close(&self, index: usize) -> Result<Self::Value, SeriesError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the last bar, `None` for an empty series.
    fn end_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// True range of a bar: the largest of `high - low`, `|high - prevClose|` and
    /// `|low - prevClose|`. The first bar has no previous close and uses `high - low`.
    fn true_range(&self, index: usize) -> Result<Self::Value, SeriesError> {
        let high = self.high(index)?;
        let low = self.low(index)?;
        let range = high - low;
        if index == 0 {
            return Ok(range);
        }
        let prev_close = self.close(index - 1)?;
        Ok(larger(
            range,
            larger(distance(high, prev_close), distance(low, prev_close)),
        ))
    }
}

impl<T: BarSeries + ?Sized> BarSeries for &T {
    type Value = T::Value;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn high(&self, index: usize) -> Result<Self::Value, SeriesError> {
        (**self).high(index)
    }

    fn low(&self, index: usize) -> Result<Self::Value, SeriesError> {
        (**self).low(index)
    }

    fn close(&self, index: usize) -> Result<Self::Value, SeriesError> {
        (**self).close(index)
    }

    fn true_range(&self, index: usize) -> Result<Self::Value, SeriesError> {
        (**self).true_range(index)
    }
}

// ---------------------------------------------------------------------------
// Data Loading
// ---------------------------------------------------------------------------

/// Errors that can occur while loading market data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
