#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tribar::domain::config::{BarrierConfig, LabelingConfig, PortfolioConfig};
use tribar::domain::error::TribarError;
pub use tribar::domain::price::{PricePoint, Side, Signal};
use tribar::domain::series::SignalIssue;
use tribar::ports::data_port::{DataPort, SignalFeed};

pub struct MockDataPort {
    pub prices: HashMap<String, Vec<PricePoint>>,
    pub signals: HashMap<String, SignalFeed>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            signals: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: Vec<PricePoint>) -> Self {
        self.prices.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_signals(mut self, symbol: &str, signals: Vec<Signal>) -> Self {
        self.signals
            .entry(symbol.to_string())
            .or_default()
            .signals = signals;
        self
    }

    pub fn with_issue(mut self, symbol: &str, issue: SignalIssue) -> Self {
        self.signals
            .entry(symbol.to_string())
            .or_default()
            .issues
            .push(issue);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, TribarError> {
        self.prices
            .get(symbol)
            .cloned()
            .ok_or_else(|| TribarError::NotFound {
                path: format!("{symbol}_prices.csv"),
            })
    }

    fn fetch_signals(&self, symbol: &str) -> Result<SignalFeed, TribarError> {
        Ok(self.signals.get(symbol).cloned().unwrap_or_default())
    }
}

/// Minute bars starting at 2024-01-01 00:00:00.
pub fn ts(minute: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::minutes(minute)
}

pub fn make_prices(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            timestamp: ts(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        })
        .collect()
}

pub fn signal(minute: i64, side: Side) -> Signal {
    Signal {
        timestamp: ts(minute),
        side,
    }
}

/// Fixed 1% target, symmetric barriers, no trading cost.
pub fn make_config(time_limit_seconds: i64, max_concurrent_trades: usize) -> LabelingConfig {
    LabelingConfig {
        barrier: BarrierConfig {
            take_profit_mult: 1.0,
            stop_loss_mult: 1.0,
            time_limit_seconds,
            target_window: None,
            trade_cost: 0.0,
            max_concurrent_trades,
        },
        portfolio: PortfolioConfig::default(),
    }
}
