//! Volatility target estimation.
//!
//! With a window `n` the target is the rolling sample standard deviation of
//! the last `n` closes divided by the current close:
//! TARGET(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1)) / C[i]
//! Warmup: first (n-1) rows have no target.
//! Without a window every row gets [`DEFAULT_TARGET`].

use crate::domain::price::PricePoint;

pub const DEFAULT_TARGET: f64 = 0.01;

pub fn estimate_targets(prices: &[PricePoint], window: Option<usize>) -> Vec<Option<f64>> {
    let period = match window {
        Some(period) => period,
        None => return vec![Some(DEFAULT_TARGET); prices.len()],
    };

    let mut values = Vec::with_capacity(prices.len());
    let warmup = period.saturating_sub(1);

    for i in 0..prices.len() {
        if i < warmup || period < 2 {
            values.push(None);
            continue;
        }

        let window = &prices[i + 1 - period..=i];
        let mean: f64 = window.iter().map(|p| p.close).sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|p| {
                let diff = p.close - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;

        values.push(Some(variance.sqrt() / prices[i].close));
    }

    values
}
