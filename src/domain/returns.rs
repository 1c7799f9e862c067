//! Realized returns for resolved events.
//!
//! A close time may fall on a synthetic deadline between (or after) observed
//! rows, so prices are looked up with forward-fill semantics: the close of the
//! last row at or before the requested time.

use chrono::NaiveDateTime;

use crate::domain::barrier::ResolvedEvent;
use crate::domain::price::PricePoint;
use crate::domain::trade::{ClosedTrade, RealClass};

pub struct PriceIndex<'a> {
    prices: &'a [PricePoint],
}

impl<'a> PriceIndex<'a> {
    /// `prices` must be sorted by timestamp.
    pub fn new(prices: &'a [PricePoint]) -> Self {
        Self { prices }
    }

    pub fn price_at(&self, ts: NaiveDateTime) -> Option<f64> {
        let upper = self.prices.partition_point(|p| p.timestamp <= ts);
        upper.checked_sub(1).map(|i| self.prices[i].close)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventIssue {
    pub entry_ts: NaiveDateTime,
    pub reason: String,
}

impl std::fmt::Display for EventIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event at {} dropped: {}", self.entry_ts, self.reason)
    }
}

pub fn label_event(
    index: &PriceIndex<'_>,
    resolved: &ResolvedEvent,
    active: bool,
    trade_cost: f64,
) -> Result<ClosedTrade, EventIssue> {
    let event = &resolved.event;
    let issue = |reason: String| EventIssue {
        entry_ts: event.entry_ts,
        reason,
    };

    let entry_price = index
        .price_at(event.entry_ts)
        .ok_or_else(|| issue("no price at entry".into()))?;
    let close_price = index
        .price_at(resolved.close_ts)
        .ok_or_else(|| issue(format!("no price at or before close {}", resolved.close_ts)))?;

    let raw_return = (close_price / entry_price - 1.0) * event.side.sign();
    if !raw_return.is_finite() {
        return Err(issue(format!("non-finite return {raw_return}")));
    }

    Ok(ClosedTrade {
        entry_ts: event.entry_ts,
        close_ts: resolved.close_ts,
        close_reason: resolved.close_reason,
        side: event.side,
        entry_price,
        close_price,
        target: event.target,
        tp_level: event.tp_level,
        sl_level: event.sl_level,
        raw_return,
        realized_return: raw_return - trade_cost,
        class: RealClass::from_return(raw_return, trade_cost),
        active,
    })
}

/// Label every resolved event. Events that cannot be priced are returned as
/// issues instead of aborting the batch.
pub fn label_events(
    prices: &[PricePoint],
    resolved: &[ResolvedEvent],
    active: &[bool],
    trade_cost: f64,
) -> (Vec<ClosedTrade>, Vec<EventIssue>) {
    let index = PriceIndex::new(prices);
    let mut trades = Vec::with_capacity(resolved.len());
    let mut issues = Vec::new();

    for (event, &is_active) in resolved.iter().zip(active) {
        match label_event(&index, event, is_active, trade_cost) {
            Ok(trade) => trades.push(trade),
            Err(issue) => issues.push(issue),
        }
    }

    (trades, issues)
}
