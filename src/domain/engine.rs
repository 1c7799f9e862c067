//! Labeling pipeline: target → barriers → gate → returns → portfolio → metrics.
//!
//! A run is a pure function of the price series, the signals and the config.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::domain::barrier::{build_events, resolve_events};
use crate::domain::config::LabelingConfig;
use crate::domain::error::TribarError;
use crate::domain::gate::gate_events;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::Portfolio;
use crate::domain::price::{PricePoint, Signal};
use crate::domain::returns::{label_events, EventIssue};
use crate::domain::series::{align_signals, validate_prices, SignalIssue};
use crate::domain::target::estimate_targets;
use crate::domain::trade::ClosedTrade;

#[derive(Debug, Clone)]
pub struct LabelingResult {
    pub symbol: String,
    /// Every labeled event, active or not, in entry order.
    pub trades: Vec<ClosedTrade>,
    pub portfolio: Portfolio,
    pub metrics: Metrics,
    pub first_ts: NaiveDateTime,
    pub last_ts: NaiveDateTime,
    /// Rows dropped before a full target window was available.
    pub warmup_rows: usize,
    pub signal_issues: Vec<SignalIssue>,
    pub event_issues: Vec<EventIssue>,
}

impl LabelingResult {
    pub fn active_trades(&self) -> impl Iterator<Item = &ClosedTrade> {
        self.trades.iter().filter(|t| t.active)
    }
}

pub fn run(
    symbol: &str,
    prices: &[PricePoint],
    signals: &[Signal],
    config: &LabelingConfig,
) -> Result<LabelingResult, TribarError> {
    validate_prices(symbol, prices)?;

    let aligned = align_signals(prices, signals);
    for issue in &aligned.issues {
        warn!(%symbol, "{issue}");
    }

    let barrier = &config.barrier;
    let targets = estimate_targets(prices, barrier.target_window);
    let first_labeled = targets.iter().position(Option::is_some);
    let warmup_rows = first_labeled.unwrap_or(prices.len());
    if first_labeled.is_none() {
        warn!(
            %symbol,
            rows = prices.len(),
            window = ?barrier.target_window,
            "not enough rows for a full target window, nothing to label"
        );
    }
    let first_ts = prices[first_labeled.unwrap_or(0)].timestamp;
    let last_ts = prices[prices.len() - 1].timestamp;

    let events = build_events(prices, &aligned.sides, &targets, barrier);
    info!(%symbol, rows = prices.len(), warmup_rows, events = events.len(), "resolving barriers");

    let resolved = resolve_events(prices, &events, barrier);
    let active = gate_events(&resolved, barrier.max_concurrent_trades);
    debug!(
        admitted = active.iter().filter(|&&a| a).count(),
        slots = barrier.max_concurrent_trades,
        "concurrency gate applied"
    );

    let (trades, event_issues) = label_events(prices, &resolved, &active, barrier.trade_cost);
    for issue in &event_issues {
        warn!(%symbol, "{issue}");
    }

    let portfolio = Portfolio::simulate(&trades, first_ts, &config.portfolio);
    let metrics = Metrics::compute(&portfolio, &trades, first_ts, last_ts);
    info!(
        %symbol,
        trades = trades.len(),
        active = portfolio.trade_count(),
        net_pnl = metrics.net_profit_usd,
        "labeling complete"
    );

    Ok(LabelingResult {
        symbol: symbol.to_string(),
        trades,
        portfolio,
        metrics,
        first_ts,
        last_ts,
        warmup_rows,
        signal_issues: aligned.issues,
        event_issues,
    })
}
