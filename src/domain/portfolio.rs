//! Portfolio simulation and equity tracking.
//!
//! Only trades admitted by the gate are simulated. They are booked in order
//! of close time with a fixed order size; equity is never clipped, so a
//! negative portfolio value is a valid outcome.

use chrono::NaiveDateTime;

use crate::domain::barrier::CloseReason;
use crate::domain::config::PortfolioConfig;
use crate::domain::trade::ClosedTrade;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub cumulative_pnl: f64,
    pub portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrade {
    pub trade: ClosedTrade,
    pub amount: f64,
    pub margin: f64,
    pub fee_pct: f64,
    pub fee_usd: f64,
    pub realized_return_usd: f64,
}

/// Round-trip fee rate. Profit-taking exits rest at the maker rate; every
/// other exit pays taker on both legs.
pub fn fee_pct(reason: CloseReason, config: &PortfolioConfig) -> f64 {
    match reason {
        CloseReason::TakeProfit => config.maker_fee + config.taker_fee,
        CloseReason::StopLoss | CloseReason::TimeLimit => 2.0 * config.taker_fee,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_portfolio: f64,
    pub active_trades: Vec<ActiveTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    /// An empty portfolio whose equity curve holds only the seed point.
    pub fn new(initial_portfolio: f64, start: NaiveDateTime) -> Self {
        Portfolio {
            initial_portfolio,
            active_trades: Vec::new(),
            equity_curve: vec![EquityPoint {
                timestamp: start,
                cumulative_pnl: 0.0,
                portfolio_value: initial_portfolio,
            }],
        }
    }

    pub fn simulate(trades: &[ClosedTrade], start: NaiveDateTime, config: &PortfolioConfig) -> Self {
        let mut portfolio = Portfolio::new(config.initial_portfolio, start);

        let mut active: Vec<&ClosedTrade> = trades.iter().filter(|t| t.active).collect();
        active.sort_by_key(|t| t.close_ts);

        for trade in active {
            portfolio.book(trade.clone(), config);
        }
        portfolio
    }

    pub fn book(&mut self, trade: ClosedTrade, config: &PortfolioConfig) {
        let amount = config.order_amount;
        let fee_pct = fee_pct(trade.close_reason, config);
        let realized_return_usd = (trade.raw_return - fee_pct) * amount;

        let cumulative_pnl = self.cumulative_pnl() + realized_return_usd;
        self.equity_curve.push(EquityPoint {
            timestamp: trade.close_ts,
            cumulative_pnl,
            portfolio_value: self.initial_portfolio + cumulative_pnl,
        });

        self.active_trades.push(ActiveTrade {
            trade,
            amount,
            margin: amount / config.leverage,
            fee_pct,
            fee_usd: fee_pct * amount,
            realized_return_usd,
        });
    }

    pub fn cumulative_pnl(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.cumulative_pnl)
            .unwrap_or(0.0)
    }

    pub fn final_value(&self) -> f64 {
        self.initial_portfolio + self.cumulative_pnl()
    }

    pub fn trade_count(&self) -> usize {
        self.active_trades.len()
    }
}
