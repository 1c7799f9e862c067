//! Barrier resolution: which of take-profit, stop-loss and time-limit is
//! touched first after each signal.
//!
//! Thresholds are expressed on the side-adjusted path return relative to the
//! entry close, so a favorable move is always positive. Each event scans the
//! shared price slice independently, so events are resolved in parallel.

use chrono::{Duration, NaiveDateTime};
use rayon::prelude::*;

use crate::domain::config::BarrierConfig;
use crate::domain::price::{PricePoint, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    TakeProfit,
    StopLoss,
    TimeLimit,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::TakeProfit => "take_profit",
            CloseReason::StopLoss => "stop_loss",
            CloseReason::TimeLimit => "time_limit",
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A non-flat signal on a row that has a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub entry_index: usize,
    pub entry_ts: NaiveDateTime,
    pub entry_price: f64,
    pub side: Side,
    pub target: f64,
    /// Absolute take-profit price, for reporting.
    pub tp_level: f64,
    /// Absolute stop-loss price, for reporting.
    pub sl_level: f64,
    pub deadline_ts: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEvent {
    pub event: Event,
    pub take_profit_time: Option<NaiveDateTime>,
    pub stop_loss_time: Option<NaiveDateTime>,
    pub close_ts: NaiveDateTime,
    pub close_reason: CloseReason,
}

pub fn build_events(
    prices: &[PricePoint],
    sides: &[Side],
    targets: &[Option<f64>],
    config: &BarrierConfig,
) -> Vec<Event> {
    let time_limit = Duration::try_seconds(config.time_limit_seconds);

    prices
        .iter()
        .zip(sides)
        .zip(targets)
        .enumerate()
        .filter_map(|(i, ((point, &side), target))| {
            let target = (*target)?;
            if side.is_flat() {
                return None;
            }
            let sign = side.sign();
            Some(Event {
                entry_index: i,
                entry_ts: point.timestamp,
                entry_price: point.close,
                side,
                target,
                tp_level: point.close * (1.0 + target * config.take_profit_mult * sign),
                sl_level: point.close * (1.0 - target * config.stop_loss_mult * sign),
                deadline_ts: time_limit
                    .and_then(|limit| point.timestamp.checked_add_signed(limit))
                    .unwrap_or(NaiveDateTime::MAX),
            })
        })
        .collect()
}

/// Scan forward from the entry row (inclusive) up to the deadline or the end
/// of the series, whichever comes first.
pub fn resolve_event(prices: &[PricePoint], event: &Event, config: &BarrierConfig) -> ResolvedEvent {
    let tp_threshold = (config.take_profit_mult > 0.0).then(|| config.take_profit_mult * event.target);
    let sl_threshold = (config.stop_loss_mult > 0.0).then(|| -config.stop_loss_mult * event.target);
    let sign = event.side.sign();

    let mut take_profit_time = None;
    let mut stop_loss_time = None;

    for point in &prices[event.entry_index..] {
        if point.timestamp > event.deadline_ts {
            break;
        }
        let path_return = (point.close / event.entry_price - 1.0) * sign;

        if take_profit_time.is_none() && tp_threshold.is_some_and(|tp| path_return > tp) {
            take_profit_time = Some(point.timestamp);
        }
        if stop_loss_time.is_none() && sl_threshold.is_some_and(|sl| path_return < sl) {
            stop_loss_time = Some(point.timestamp);
        }
        let tp_settled = take_profit_time.is_some() || tp_threshold.is_none();
        let sl_settled = stop_loss_time.is_some() || sl_threshold.is_none();
        if tp_settled && sl_settled {
            break;
        }
    }

    let (close_ts, close_reason) = first_touch(take_profit_time, stop_loss_time, event.deadline_ts);

    ResolvedEvent {
        event: event.clone(),
        take_profit_time,
        stop_loss_time,
        close_ts,
        close_reason,
    }
}

/// Earliest candidate wins; on equal timestamps take-profit beats stop-loss
/// beats time-limit.
fn first_touch(
    take_profit_time: Option<NaiveDateTime>,
    stop_loss_time: Option<NaiveDateTime>,
    deadline_ts: NaiveDateTime,
) -> (NaiveDateTime, CloseReason) {
    [
        (take_profit_time, CloseReason::TakeProfit),
        (stop_loss_time, CloseReason::StopLoss),
    ]
    .into_iter()
    .filter_map(|(time, reason)| time.map(|t| (t, reason)))
    .fold((deadline_ts, CloseReason::TimeLimit), |best, candidate| {
        if candidate.0 < best.0
            || (candidate.0 == best.0 && priority(candidate.1) < priority(best.1))
        {
            candidate
        } else {
            best
        }
    })
}

fn priority(reason: CloseReason) -> u8 {
    match reason {
        CloseReason::TakeProfit => 0,
        CloseReason::StopLoss => 1,
        CloseReason::TimeLimit => 2,
    }
}

pub fn resolve_events(
    prices: &[PricePoint],
    events: &[Event],
    config: &BarrierConfig,
) -> Vec<ResolvedEvent> {
    events
        .par_iter()
        .map(|event| resolve_event(prices, event, config))
        .collect()
}
