//! Input validation and signal alignment.
//!
//! Price rows must be strictly increasing in time with finite, positive closes
//! before any labeling runs. Signals are matched onto price rows by timestamp;
//! problems with individual signal rows are collected, not raised.

use crate::domain::error::TribarError;
use crate::domain::price::{PricePoint, Side, Signal};
use chrono::NaiveDateTime;
use std::collections::HashMap;

pub fn validate_prices(symbol: &str, prices: &[PricePoint]) -> Result<(), TribarError> {
    if prices.is_empty() {
        return Err(TribarError::NoData {
            symbol: symbol.to_string(),
        });
    }

    for (index, point) in prices.iter().enumerate() {
        if !point.close.is_finite() || point.close <= 0.0 {
            return Err(TribarError::CorruptRow {
                index,
                reason: format!("close must be finite and positive, got {}", point.close),
            });
        }
        if index == 0 {
            continue;
        }
        let prev = prices[index - 1].timestamp;
        if point.timestamp == prev {
            return Err(TribarError::DuplicateTimestamp {
                index,
                timestamp: point.timestamp,
            });
        }
        if point.timestamp < prev {
            return Err(TribarError::UnsortedTimestamps { index });
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalIssue {
    /// No price row carries this timestamp.
    Unmatched { timestamp: NaiveDateTime },
    /// A second signal for a timestamp that already has one.
    Duplicate { timestamp: NaiveDateTime },
    /// Row could not be read (reported by the data adapter).
    Malformed { row: usize, reason: String },
}

impl std::fmt::Display for SignalIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalIssue::Unmatched { timestamp } => {
                write!(f, "signal at {timestamp} has no matching price row")
            }
            SignalIssue::Duplicate { timestamp } => {
                write!(f, "duplicate signal at {timestamp} ignored")
            }
            SignalIssue::Malformed { row, reason } => {
                write!(f, "signal row {row} skipped: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlignedSignals {
    /// One side per price row; rows without a signal are flat.
    pub sides: Vec<Side>,
    pub issues: Vec<SignalIssue>,
}

pub fn align_signals(prices: &[PricePoint], signals: &[Signal]) -> AlignedSignals {
    let row_index: HashMap<NaiveDateTime, usize> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| (p.timestamp, i))
        .collect();

    let mut sides = vec![Side::Flat; prices.len()];
    let mut seen = vec![false; prices.len()];
    let mut issues = Vec::new();

    for signal in signals {
        match row_index.get(&signal.timestamp) {
            Some(&i) if seen[i] => issues.push(SignalIssue::Duplicate {
                timestamp: signal.timestamp,
            }),
            Some(&i) => {
                seen[i] = true;
                sides[i] = signal.side;
            }
            None => issues.push(SignalIssue::Unmatched {
                timestamp: signal.timestamp,
            }),
        }
    }

    AlignedSignals { sides, issues }
}
