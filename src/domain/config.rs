//! Labeling and portfolio parameters.
//!
//! `BarrierConfig` drives the labeling stages, `PortfolioConfig` the
//! simulator. Both are immutable for the duration of a run.

#[derive(Debug, Clone, PartialEq)]
pub struct BarrierConfig {
    /// Multiple of the target above which the take-profit fires; 0 disables it.
    pub take_profit_mult: f64,
    /// Multiple of the target below which the stop-loss fires; 0 disables it.
    pub stop_loss_mult: f64,
    pub time_limit_seconds: i64,
    /// Rolling window for the volatility target; `None` uses a fixed target.
    pub target_window: Option<usize>,
    pub trade_cost: f64,
    pub max_concurrent_trades: usize,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            take_profit_mult: 1.0,
            stop_loss_mult: 1.0,
            time_limit_seconds: 5,
            target_window: None,
            trade_cost: 0.0006,
            max_concurrent_trades: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub order_amount: f64,
    pub leverage: f64,
    pub initial_portfolio: f64,
    pub maker_fee: f64,
    pub taker_fee: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            order_amount: 100.0,
            leverage: 1.0,
            initial_portfolio: 1000.0,
            maker_fee: 0.0002,
            taker_fee: 0.0006,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelingConfig {
    pub barrier: BarrierConfig,
    pub portfolio: PortfolioConfig,
}
