//! CSV file adapters: price/signal input and trade/equity export.

use crate::domain::engine::LabelingResult;
use crate::domain::error::TribarError;
use crate::domain::price::{PricePoint, Side, Signal};
use crate::domain::series::SignalIssue;
use crate::ports::data_port::{DataPort, SignalFeed};
use crate::ports::report_port::ReportPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepts epoch seconds (integer or fractional), RFC 3339, or
/// `YYYY-MM-DD[ HH:MM:SS]` with a space or `T` separator.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();

    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| format!("epoch seconds out of range: {raw}"));
    }
    if let Ok(secs) = raw.parse::<f64>() {
        if secs.is_finite() {
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1e9).round() as u32;
            return DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| format!("epoch seconds out of range: {raw}"));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid timestamp: {raw}"))
}

fn parse_side(raw: &str) -> Result<Side, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid side value {raw:?}: {e}"))?;
    if value.fract() != 0.0 {
        return Err(format!("side must be -1, 0 or 1, got {value}"));
    }
    Side::try_from(value as i64)
}

fn read_source(path: &Path) -> Result<String, TribarError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TribarError::NotFound {
            path: path.display().to_string(),
        },
        _ => TribarError::Io(e),
    })
}

fn parse_price_row(index: usize, record: &csv::StringRecord) -> Result<PricePoint, TribarError> {
    let corrupt = |reason: String| TribarError::CorruptRow { index, reason };
    let column = |col: usize, name: &str| match record.get(col) {
        Some(value) => Ok(value.trim().to_string()),
        None => Err(corrupt(format!("missing {name} column"))),
    };
    let number = |col: usize, name: &str| -> Result<f64, TribarError> {
        column(col, name)?
            .parse::<f64>()
            .map_err(|e| corrupt(format!("invalid {name} value: {e}")))
    };

    Ok(PricePoint {
        timestamp: parse_timestamp(&column(0, "timestamp")?).map_err(corrupt)?,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    })
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn prices_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}_prices.csv"))
    }

    pub fn signals_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}_signals.csv"))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, TribarError> {
        let content = read_source(&self.prices_path(symbol))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut prices = Vec::new();

        for (index, result) in rdr.records().enumerate() {
            prices.push(parse_price_row(index, &result?)?);
        }

        Ok(prices)
    }

    fn fetch_signals(&self, symbol: &str) -> Result<SignalFeed, TribarError> {
        let content = read_source(&self.signals_path(symbol))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut feed = SignalFeed::default();

        for (row, result) in rdr.records().enumerate() {
            let parsed = result.map_err(|e| e.to_string()).and_then(|record| {
                let ts = record.get(0).ok_or("missing timestamp column")?;
                let side = record.get(1).ok_or("missing side column")?;
                Ok(Signal {
                    timestamp: parse_timestamp(ts)?,
                    side: parse_side(side)?,
                })
            });
            match parsed {
                Ok(signal) => feed.signals.push(signal),
                Err(reason) => feed.issues.push(SignalIssue::Malformed { row, reason }),
            }
        }

        Ok(feed)
    }
}

/// Writes `trades.csv` (every labeled event) and `equity.csv`.
pub struct CsvExportAdapter;

impl CsvExportAdapter {
    fn write_trades(result: &LabelingResult, path: &Path) -> Result<(), TribarError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record([
            "entry_ts",
            "close_ts",
            "close_reason",
            "side",
            "entry_price",
            "close_price",
            "target",
            "tp_level",
            "sl_level",
            "raw_return",
            "realized_return",
            "real_class",
            "active",
        ])?;
        for t in &result.trades {
            wtr.write_record([
                t.entry_ts.format(TIMESTAMP_FORMAT).to_string(),
                t.close_ts.format(TIMESTAMP_FORMAT).to_string(),
                t.close_reason.to_string(),
                t.side.as_i8().to_string(),
                t.entry_price.to_string(),
                t.close_price.to_string(),
                t.target.to_string(),
                t.tp_level.to_string(),
                t.sl_level.to_string(),
                t.raw_return.to_string(),
                t.realized_return.to_string(),
                t.class.as_i8().to_string(),
                u8::from(t.active).to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_equity(result: &LabelingResult, path: &Path) -> Result<(), TribarError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["timestamp", "cumulative_pnl", "portfolio_value"])?;
        for p in &result.portfolio.equity_curve {
            wtr.write_record([
                p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                p.cumulative_pnl.to_string(),
                p.portfolio_value.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvExportAdapter {
    fn write(&self, result: &LabelingResult, output_dir: &Path) -> Result<Vec<PathBuf>, TribarError> {
        fs::create_dir_all(output_dir)?;
        let trades = output_dir.join("trades.csv");
        let equity = output_dir.join("equity.csv");
        Self::write_trades(result, &trades)?;
        Self::write_equity(result, &equity)?;
        Ok(vec![trades, equity])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let prices = "timestamp,open,high,low,close,volume\n\
            1704067200,100.0,101.0,99.0,100.5,12.5\n\
            1704067260,100.5,102.0,100.0,101.0,8\n\
            2024-01-01 00:02:00,101.0,101.5,100.5,101.2,3\n";
        fs::write(path.join("BTC_prices.csv"), prices).unwrap();

        let signals = "timestamp,side\n\
            1704067200,1\n\
            1704067260,-1.0\n\
            1704067320,2\n\
            not-a-time,0\n";
        fs::write(path.join("BTC_signals.csv"), signals).unwrap();

        (dir, path)
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn parse_timestamp_formats() {
        let expected = ts("2024-01-01 00:00:00");
        assert_eq!(parse_timestamp("1704067200").unwrap(), expected);
        assert_eq!(parse_timestamp("1704067200.0").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T00:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn fetch_prices_returns_rows_in_order() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let prices = adapter.fetch_prices("BTC").unwrap();

        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].timestamp, ts("2024-01-01 00:00:00"));
        assert_eq!(prices[0].close, 100.5);
        assert_eq!(prices[0].volume, 12.5);
        assert_eq!(prices[2].timestamp, ts("2024-01-01 00:02:00"));
    }

    #[test]
    fn fetch_prices_missing_file_is_not_found() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_prices("ETH").unwrap_err();
        assert!(matches!(err, TribarError::NotFound { path } if path.ends_with("ETH_prices.csv")));
    }

    #[test]
    fn fetch_prices_bad_row_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD_prices.csv"),
            "timestamp,open,high,low,close,volume\n1704067200,1,1,1,abc,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_prices("BAD").unwrap_err();
        assert!(matches!(err, TribarError::CorruptRow { index: 0, .. }));
    }

    #[test]
    fn fetch_signals_isolates_bad_rows() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let feed = adapter.fetch_signals("BTC").unwrap();

        assert_eq!(feed.signals.len(), 2);
        assert_eq!(feed.signals[0].side, Side::Long);
        assert_eq!(feed.signals[1].side, Side::Short);
        assert_eq!(feed.issues.len(), 2);
        assert!(matches!(feed.issues[0], SignalIssue::Malformed { row: 2, .. }));
        assert!(matches!(feed.issues[1], SignalIssue::Malformed { row: 3, .. }));
    }

    #[test]
    fn data_range_from_prices() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let (first, last, count) = adapter.get_data_range("BTC").unwrap().unwrap();
        assert_eq!(first, ts("2024-01-01 00:00:00"));
        assert_eq!(last, ts("2024-01-01 00:02:00"));
        assert_eq!(count, 3);
    }
}
