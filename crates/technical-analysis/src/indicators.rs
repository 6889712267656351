//! Indicator functions over price slices ordered newest first (index 0 = latest bar).
//!
//! Each returns `None` when the slice is shorter than the indicator needs, except
//! [`sma`], which returns `0.0` and leaves the length check to the caller.

use analysis_core::arithmetic::{finite, mean, population_std_dev};

pub const RSI_PERIOD: usize = 14;
pub const MFI_PERIOD: usize = 14;
/// Trading days in a year
pub const YEAR_WINDOW: usize = 252;

/// Relative Strength Index with simple averaging. Needs 15 closes.
///
/// Differences run from `closes[1] - closes[2]` through `closes[13] - closes[14]`; sums are
/// divided by the full period. A window with gains and no losses saturates at 100, any
/// other zero-loss window uses a loss average of 1.
pub fn rsi(closes: &[f64]) -> Option<f64> {
    if closes.len() < RSI_PERIOD + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..RSI_PERIOD {
        let diff = closes[i] - closes[i + 1];
        if diff > 0.0 {
            gains += diff;
        } else {
            losses += diff.abs();
        }
    }

    let avg_gain = gains / RSI_PERIOD as f64;
    let avg_loss = losses / RSI_PERIOD as f64;
    if avg_loss == 0.0 && avg_gain > 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / if avg_loss == 0.0 { 1.0 } else { avg_loss };
    finite(100.0 - (100.0 / (1.0 + rs)))
}

fn typical_price(highs: &[f64], lows: &[f64], closes: &[f64], i: usize) -> f64 {
    (highs[i] + lows[i] + closes[i]) / 3.0
}

/// Money Flow Index over the 14 most recent bars. Every slice needs 15 values.
pub fn mfi(highs: &[f64], lows: &[f64], closes: &[f64], volumes: &[f64]) -> Option<f64> {
    let len = highs.len().min(lows.len()).min(closes.len()).min(volumes.len());
    if len < MFI_PERIOD + 1 {
        return None;
    }

    let mut positive_flow = 0.0;
    let mut negative_flow = 0.0;
    for i in 0..MFI_PERIOD {
        let typical = typical_price(highs, lows, closes, i);
        let prev_typical = typical_price(highs, lows, closes, i + 1);
        let money_flow = typical * volumes[i];

        if typical > prev_typical {
            positive_flow += money_flow;
        } else if typical < prev_typical {
            negative_flow += money_flow;
        }
    }

    let ratio = positive_flow / if negative_flow == 0.0 { 1.0 } else { negative_flow };
    finite(100.0 - (100.0 / (1.0 + ratio)))
}

/// Bollinger %B: where the latest close sits between SMA ± 2σ of the last `period` closes.
pub fn bollinger_percent_b(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[..period];
    let middle = mean(window);
    let std = population_std_dev(window);
    let upper = middle + 2.0 * std;
    let lower = middle - 2.0 * std;

    let width = upper - lower;
    if width == 0.0 {
        return None;
    }
    finite((prices[0] - lower) / width * 100.0)
}

/// Simple Moving Average of the most recent `period` prices, `0.0` with too little data.
pub fn sma(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period {
        return 0.0;
    }
    mean(&prices[..period])
}

/// Which end of the trading range to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    High,
    Low,
}

/// Percent distance of `current` from `reference`: `current / reference * 100 - 100`.
pub fn relative_position(current: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 || reference.is_nan() {
        return None;
    }
    finite((current / reference) * 100.0 - 100.0)
}

/// Latest close relative to the highest or lowest close of the last `window` bars.
/// Needs strictly more than `window` closes.
pub fn relative_to_extreme(closes: &[f64], window: usize, extreme: Extreme) -> Option<f64> {
    if window == 0 || closes.len() <= window {
        return None;
    }

    let recent = &closes[..window];
    let reference = match extreme {
        Extreme::High => recent.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Extreme::Low => recent.iter().copied().fold(f64::INFINITY, f64::min),
    };
    relative_position(closes[0], reference)
}

/// Latest close relative to its `period`-day simple moving average.
pub fn relative_to_sma(closes: &[f64], period: usize) -> Option<f64> {
    let average = sma(closes, period);
    if average == 0.0 {
        return None;
    }
    relative_position(closes[0], average)
}
