//! Market data and signal access port trait.

use crate::domain::error::TribarError;
use crate::domain::price::{PricePoint, Signal};
use crate::domain::series::SignalIssue;
use chrono::NaiveDateTime;

/// Signals as read from a source, with the rows that could not be read.
#[derive(Debug, Clone, Default)]
pub struct SignalFeed {
    pub signals: Vec<Signal>,
    pub issues: Vec<SignalIssue>,
}

pub trait DataPort {
    /// Price rows in source order. Ordering is validated by the engine.
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, TribarError>;

    fn fetch_signals(&self, symbol: &str) -> Result<SignalFeed, TribarError>;

    /// First and last timestamp plus row count, or `None` for an empty series.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, TribarError> {
        let prices = self.fetch_prices(symbol)?;
        Ok(match (prices.first(), prices.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, prices.len())),
            _ => None,
        })
    }
}
