pub mod csv_loader;

use rust_decimal::Decimal;
use std::path::Path;
use supertrend_core::{Bar, DataError, PriceSeries};
use tracing::info;

/// Load a CSV file into a price series ready for indicators.
pub fn load_series(path: &Path) -> Result<PriceSeries<Decimal>, DataError> {
    let bars = csv_loader::load_bars_from_csv(path)?;
    validate_bars(&bars)?;
    let series = PriceSeries::from_bars(&bars);
    info!(
        file = %path.display(),
        instrument = series.instrument(),
        bars = bars.len(),
        "Loaded price series"
    );
    Ok(series)
}

/// Reject empty data and bars whose high is below their low.
pub fn validate_bars(bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::ParseError("No bars loaded".into()));
    }
    if let Some(bad) = bars.iter().find(|b| b.high < b.low) {
        return Err(DataError::ParseError(format!(
            "Bar at {} has high {} below low {}",
            bad.timestamp, bad.high, bad.low
        )));
    }
    Ok(())
}
