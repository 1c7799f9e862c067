//! Performance metrics and the text summary.
//!
//! Ratios that divide by a count or a sum follow IEEE semantics: with no
//! active trades accuracy is NaN, and profit factor is +inf with wins but no
//! losses, NaN with neither. Nothing here panics on an empty backtest.
//!
//! The Sharpe ratio is a raw per-trade ratio and is not annualized.

use chrono::NaiveDateTime;

use super::barrier::CloseReason;
use super::portfolio::{ActiveTrade, EquityPoint, Portfolio};
use super::price::Side;
use super::trade::ClosedTrade;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_portfolio: f64,
    pub final_portfolio: f64,
    pub net_profit_usd: f64,
    pub net_profit_pct: f64,
    pub total_signals: usize,
    pub total_active: usize,
    pub total_long: usize,
    pub total_short: usize,
    pub win_signals: usize,
    pub loss_signals: usize,
    pub accuracy: f64,
    pub accuracy_long: f64,
    pub accuracy_short: f64,
    pub max_drawdown_usd: f64,
    pub max_drawdown_pct: f64,
    /// Close time of the trade at the bottom of the deepest drawdown.
    pub max_drawdown_at: Option<NaiveDateTime>,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
    pub total_volume_usd: f64,
    pub total_fees_usd: f64,
    pub take_profit_count: usize,
    pub stop_loss_count: usize,
    pub time_limit_count: usize,
    pub duration_minutes: f64,
    pub avg_trade_duration_minutes: f64,
}

impl Metrics {
    /// `trades` is the full labeled table; `first_ts`/`last_ts` bound the
    /// labeled window.
    pub fn compute(
        portfolio: &Portfolio,
        trades: &[ClosedTrade],
        first_ts: NaiveDateTime,
        last_ts: NaiveDateTime,
    ) -> Self {
        let active = &portfolio.active_trades;
        let initial_portfolio = portfolio.initial_portfolio;
        let final_portfolio = portfolio.final_value();
        let net_profit_usd = final_portfolio - initial_portfolio;

        let mut win_signals = 0usize;
        let mut loss_signals = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut take_profit_count = 0usize;
        let mut stop_loss_count = 0usize;
        let mut time_limit_count = 0usize;
        let mut total_fees_usd = 0.0_f64;
        let mut total_duration = 0.0_f64;

        for a in active {
            if a.trade.is_win() {
                win_signals += 1;
                total_wins += a.realized_return_usd;
            } else if a.trade.is_loss() {
                loss_signals += 1;
                total_losses += a.realized_return_usd;
            }
            match a.trade.close_reason {
                CloseReason::TakeProfit => take_profit_count += 1,
                CloseReason::StopLoss => stop_loss_count += 1,
                CloseReason::TimeLimit => time_limit_count += 1,
            }
            total_fees_usd += a.fee_usd;
            total_duration += a.trade.duration_minutes();
        }

        let total_active = active.len();
        let (total_long, accuracy_long) = side_accuracy(active, Side::Long);
        let (total_short, accuracy_short) = side_accuracy(active, Side::Short);
        let (max_drawdown_usd, max_drawdown_at) = compute_drawdown(&portfolio.equity_curve);

        Metrics {
            initial_portfolio,
            final_portfolio,
            net_profit_usd,
            net_profit_pct: net_profit_usd / initial_portfolio,
            total_signals: trades.len(),
            total_active,
            total_long,
            total_short,
            win_signals,
            loss_signals,
            accuracy: win_signals as f64 / total_active as f64,
            accuracy_long,
            accuracy_short,
            max_drawdown_usd,
            max_drawdown_pct: max_drawdown_usd / initial_portfolio,
            max_drawdown_at,
            sharpe_ratio: compute_sharpe(active, initial_portfolio),
            profit_factor: total_wins / total_losses.abs(),
            total_volume_usd: active.iter().map(|a| 2.0 * a.amount).sum(),
            total_fees_usd,
            take_profit_count,
            stop_loss_count,
            time_limit_count,
            duration_minutes: (last_ts - first_ts).num_seconds() as f64 / 60.0,
            avg_trade_duration_minutes: total_duration / total_active as f64,
        }
    }

    /// Fixed-layout text report.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Triple Barrier Backtest ===\n");
        out.push_str(&format!(
            "Net PnL:          ${:.2} ({})\n",
            self.net_profit_usd,
            fmt_pct(self.net_profit_pct)
        ));
        out.push_str(&format!(
            "Portfolio:        ${:.2} -> ${:.2}\n",
            self.initial_portfolio, self.final_portfolio
        ));
        out.push_str(&format!(
            "Max Drawdown:     ${:.2} ({})",
            self.max_drawdown_usd,
            fmt_pct(self.max_drawdown_pct)
        ));
        if let Some(at) = self.max_drawdown_at {
            out.push_str(&format!(" at {}", at.format("%Y-%m-%d %H:%M:%S")));
        }
        out.push('\n');
        out.push_str(&format!("Sharpe Ratio:     {}\n", fmt_ratio(self.sharpe_ratio)));
        out.push_str(&format!("Profit Factor:    {}\n", fmt_ratio(self.profit_factor)));
        out.push_str(&format!(
            "Signals:          {} total, {} active ({} long / {} short)\n",
            self.total_signals, self.total_active, self.total_long, self.total_short
        ));
        out.push_str(&format!(
            "Accuracy:         {} (long {}, short {})\n",
            fmt_pct(self.accuracy),
            fmt_pct(self.accuracy_long),
            fmt_pct(self.accuracy_short)
        ));
        out.push_str(&format!(
            "Wins / Losses:    {} / {}\n",
            self.win_signals, self.loss_signals
        ));
        out.push_str(&format!(
            "Close Types:      TP {} | SL {} | TL {}\n",
            self.take_profit_count, self.stop_loss_count, self.time_limit_count
        ));
        out.push_str(&format!(
            "Volume / Fees:    ${:.2} / ${:.2}\n",
            self.total_volume_usd, self.total_fees_usd
        ));
        out.push_str(&format!(
            "Duration:         {:.1} h, avg trade {} min\n",
            self.duration_minutes / 60.0,
            fmt_ratio(self.avg_trade_duration_minutes)
        ));
        out
    }
}

fn side_accuracy(active: &[ActiveTrade], side: Side) -> (usize, f64) {
    let (count, wins) = active
        .iter()
        .filter(|a| a.trade.side == side)
        .fold((0usize, 0usize), |(count, wins), a| {
            (count + 1, wins + usize::from(a.trade.is_win()))
        });
    (count, wins as f64 / count as f64)
}

/// Deepest fall of cumulative PnL below its running peak, with the timestamp
/// of the trough. Returned as a non-positive amount.
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, Option<NaiveDateTime>) {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    let mut trough = None;

    for point in equity_curve {
        peak = peak.max(point.cumulative_pnl);
        let dd = point.cumulative_pnl - peak;
        if dd < max_dd {
            max_dd = dd;
            trough = Some(point.timestamp);
        }
    }

    (max_dd, trough)
}

/// Mean over sample standard deviation of per-trade returns on the initial
/// portfolio. NaN with fewer than two trades.
pub fn compute_sharpe(active: &[ActiveTrade], initial_portfolio: f64) -> f64 {
    if active.len() < 2 {
        return f64::NAN;
    }

    let returns: Vec<f64> = active
        .iter()
        .map(|a| a.realized_return_usd / initial_portfolio)
        .collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    mean / variance.sqrt()
}

fn fmt_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        fmt_ratio(value)
    }
}

fn fmt_ratio(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{value:.2}")
    }
}
