//! Safe arithmetic shared by every metric.
//!
//! Every helper returns `None` instead of producing NaN, infinity or a division fault;
//! callers render `None` as [`NOT_AVAILABLE`]. A zero operand counts as "falsy" the same
//! way the provider's blank fields do, so `0` and an absent value behave identically.

/// Display sentinel for a metric whose preconditions are unmet.
pub const NOT_AVAILABLE: &str = "N/A";

fn is_falsy(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

/// Keep finite values only.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Percentage change from `previous` to `current`.
pub fn growth_rate(current: f64, previous: f64) -> Option<f64> {
    if is_falsy(current) || is_falsy(previous) {
        return None;
    }
    finite((current - previous) / previous * 100.0)
}

/// [`growth_rate`] rendered as `"12.34%"` or `"N/A"`.
pub fn format_growth_rate(current: f64, previous: f64) -> String {
    growth_rate(current, previous)
        .map(format_percent)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Difference between two margins in percentage points. A zero margin is treated as
/// missing, so a genuine 0% margin yields `None`.
pub fn margin_delta(current: Option<f64>, past: Option<f64>) -> Option<f64> {
    let current = current.filter(|v| !is_falsy(*v))?;
    let past = past.filter(|v| !is_falsy(*v))?;
    finite(current - past)
}

/// `numerator / denominator`, `None` when either side is zero.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if is_falsy(numerator) || is_falsy(denominator) {
        return None;
    }
    finite(numerator / denominator)
}

/// Round to two decimals, as chart values are published.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Two-decimal fixed notation. Negative zero prints as `0.00`.
pub fn format_fixed(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_fixed(value))
}

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation (divides by `n`, as Bollinger bands do).
pub fn population_std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}
