//! Labeled trade records.

use chrono::NaiveDateTime;

use crate::domain::barrier::CloseReason;
use crate::domain::price::Side;

/// Outcome class of a trade net of trading cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealClass {
    Win,
    Loss,
    /// Return exactly equal to the trading cost.
    Neutral,
}

impl RealClass {
    pub fn from_return(raw_return: f64, trade_cost: f64) -> Self {
        let net = raw_return - trade_cost;
        if net > 0.0 {
            RealClass::Win
        } else if net < 0.0 {
            RealClass::Loss
        } else {
            RealClass::Neutral
        }
    }

    /// -1, 0 or 1.
    pub fn as_i8(self) -> i8 {
        match self {
            RealClass::Win => 1,
            RealClass::Loss => -1,
            RealClass::Neutral => 0,
        }
    }
}

/// One labeled event, admitted by the gate or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry_ts: NaiveDateTime,
    pub close_ts: NaiveDateTime,
    pub close_reason: CloseReason,
    pub side: Side,
    pub entry_price: f64,
    pub close_price: f64,
    pub target: f64,
    pub tp_level: f64,
    pub sl_level: f64,
    pub raw_return: f64,
    /// Raw return net of the configured trading cost.
    pub realized_return: f64,
    pub class: RealClass,
    pub active: bool,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.class == RealClass::Win
    }

    pub fn is_loss(&self) -> bool {
        self.class == RealClass::Loss
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.close_ts - self.entry_ts).num_seconds() as f64 / 60.0
    }
}
