use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use supertrend_core::{Bar, DataError};

/// Load OHLCV bars from a CSV file. The instrument is named after the file stem.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `timestamp` (or `date`, `datetime`, `time`), `open`, `high`, `low`, `close`,
/// and optionally `volume`.
pub fn load_bars_from_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(format!(
            "CSV file not found: {}",
            path.display()
        )));
    }
    let instrument = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let file = std::fs::File::open(path)?;
    load_bars_from_reader(file, &instrument)
}

/// Load OHLCV bars from any CSV source, sorted by timestamp.
pub fn load_bars_from_reader<R: Read>(source: R, instrument: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {}", e)))?
        .clone();

    let col_map = resolve_bar_columns(&headers)?;

    let mut bars = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DataError::ParseError(format!("CSV record error: {}", e)))?;

        let timestamp = parse_timestamp(field(&record, col_map.timestamp)?)?;
        let open = parse_decimal(field(&record, col_map.open)?, "open")?;
        let high = parse_decimal(field(&record, col_map.high)?, "high")?;
        let low = parse_decimal(field(&record, col_map.low)?, "low")?;
        let close = parse_decimal(field(&record, col_map.close)?, "close")?;
        let volume = match col_map.volume {
            Some(idx) => parse_decimal(field(&record, idx)?, "volume")?,
            None => Decimal::ZERO,
        };

        bars.push(Bar {
            instrument: instrument.to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct BarColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn resolve_bar_columns(headers: &csv::StringRecord) -> Result<BarColumnMap, DataError> {
    let required = |names: &[&str], label: &str| {
        find_column(headers, names)
            .ok_or_else(|| DataError::ParseError(format!("No {} column found", label)))
    };
    Ok(BarColumnMap {
        timestamp: required(&["timestamp", "date", "datetime", "time"], "timestamp")?,
        open: required(&["open", "o"], "open")?,
        high: required(&["high", "h"], "high")?,
        low: required(&["low", "l"], "low")?,
        close: required(&["close", "c"], "close")?,
        volume: find_column(headers, &["volume", "vol", "v"]),
    })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> Result<&'r str, DataError> {
    record.get(idx).ok_or_else(|| {
        DataError::ParseError(format!(
            "Record at line {} has no column {}",
            record.position().map(|p| p.line()).unwrap_or_default(),
            idx
        ))
    })
}

fn parse_decimal(s: &str, name: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(s.trim())
        .map_err(|e| DataError::ParseError(format!("Failed to parse {} '{}': {}", name, s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DataError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Naive formats are taken as UTC
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y%m%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    // Unix seconds
    if let Some(dt) = s.parse::<i64>().ok().and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        return Ok(dt);
    }

    Err(DataError::ParseError(format!(
        "Unable to parse timestamp: '{}'",
        s
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_sorted_bars() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-03,10,12,9,11,500\n\
                   2024-01-02, 9.5 ,10.5,9,10,400\n";
        let bars = load_bars_from_reader(csv.as_bytes(), "ES").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(bars[0].open, dec!(9.5));
        assert_eq!(bars[1].close, dec!(11));
        assert_eq!(bars[1].volume, dec!(500));
        assert_eq!(bars[1].instrument, "ES");
    }

    #[test]
    fn test_short_headers_and_missing_volume() {
        let csv = "time,o,h,l,c\n1704153600,1,2,0.5,1.5\n";
        let bars = load_bars_from_reader(csv.as_bytes(), "BTC").unwrap();
        assert_eq!(bars[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(bars[0].volume, Decimal::ZERO);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        for s in [
            "2024-03-05T14:30:00Z",
            "2024-03-05 14:30:00",
            "2024-03-05T14:30:00",
            "03/05/2024 14:30",
            "20240305 14:30:00",
        ] {
            assert_eq!(parse_timestamp(s).unwrap(), expected, "{}", s);
        }
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_errors() {
        let no_close = "date,open,high,low\n2024-01-02,1,2,0,1\n";
        assert!(matches!(
            load_bars_from_reader(no_close.as_bytes(), "X"),
            Err(DataError::ParseError(_))
        ));

        let bad_number = "date,open,high,low,close\n2024-01-02,1,abc,0,1\n";
        assert!(matches!(
            load_bars_from_reader(bad_number.as_bytes(), "X"),
            Err(DataError::ParseError(_))
        ));

        let short_row = "date,open,high,low,close\n2024-01-02,1,2\n";
        assert!(matches!(
            load_bars_from_reader(short_row.as_bytes(), "X"),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_bars_from_csv(Path::new("/nonexistent/ES.csv")),
            Err(DataError::NotFound(_))
        ));
    }
}
