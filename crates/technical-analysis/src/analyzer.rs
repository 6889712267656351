use analysis_core::{Indicator, MetricId, MetricKind, MetricValue, PriceBar};

use crate::indicators::*;

/// Price columns extracted once from newest-first bars so indicators can run on any tail.
#[derive(Debug, Clone, Default)]
pub struct PriceColumns {
    pub labels: Vec<String>,
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceColumns {
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        Self {
            labels: bars.iter().map(|b| b.date.format("%Y-%m-%d").to_string()).collect(),
            closes: bars.iter().map(|b| b.close).collect(),
            highs: bars.iter().map(|b| b.high).collect(),
            lows: bars.iter().map(|b| b.low).collect(),
            volumes: bars.iter().map(|b| b.volume).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Minimum number of bars an indicator needs to produce a value.
pub fn lookback(indicator: Indicator) -> usize {
    match indicator {
        Indicator::Rsi => RSI_PERIOD + 1,
        Indicator::Mfi => MFI_PERIOD + 1,
        Indicator::RelativeToHigh | Indicator::RelativeToLow => YEAR_WINDOW + 1,
        Indicator::BollingerPercent20 => 20,
        Indicator::BollingerPercent50 => 50,
        Indicator::RelativeToSma50 => 50,
        Indicator::RelativeToSma200 => 200,
    }
}

/// Indicator value as of `offset` bars back (0 = latest), using only older bars.
pub fn indicator_value(indicator: Indicator, columns: &PriceColumns, offset: usize) -> Option<f64> {
    if offset >= columns.len() {
        return None;
    }
    let closes = &columns.closes[offset..];

    match indicator {
        Indicator::Rsi => rsi(closes),
        Indicator::Mfi => mfi(
            &columns.highs[offset..],
            &columns.lows[offset..],
            closes,
            &columns.volumes[offset..],
        ),
        Indicator::RelativeToHigh => relative_to_extreme(closes, YEAR_WINDOW, Extreme::High),
        Indicator::RelativeToLow => relative_to_extreme(closes, YEAR_WINDOW, Extreme::Low),
        Indicator::BollingerPercent20 => bollinger_percent_b(closes, 20),
        Indicator::BollingerPercent50 => bollinger_percent_b(closes, 50),
        Indicator::RelativeToSma50 => relative_to_sma(closes, 50),
        Indicator::RelativeToSma200 => relative_to_sma(closes, 200),
    }
}

fn describe(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Rsi => "14-period RSI (simple average)",
        Indicator::Mfi => "14-period money flow index",
        Indicator::RelativeToHigh => "Latest close vs 252-day high close",
        Indicator::RelativeToLow => "Latest close vs 252-day low close",
        Indicator::BollingerPercent20 => "%B within 20-day SMA \u{b1} 2\u{3c3}",
        Indicator::BollingerPercent50 => "%B within 50-day SMA \u{b1} 2\u{3c3}",
        Indicator::RelativeToSma50 => "Latest close vs 50-day SMA",
        Indicator::RelativeToSma200 => "Latest close vs 200-day SMA",
    }
}

/// RSI and MFI print as plain numbers; the others are percentages.
pub fn format_indicator(indicator: Indicator, value: Option<f64>, detail: String) -> MetricValue {
    match indicator {
        Indicator::Rsi | Indicator::Mfi => MetricValue::fixed(value, detail),
        _ => MetricValue::percent(value, detail),
    }
}

pub struct TechnicalAnalysisEngine;

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Current value of every daily-bar metric.
    pub fn analyze(&self, bars: &[PriceBar]) -> Vec<(MetricId, MetricValue)> {
        let columns = PriceColumns::from_bars(bars);

        MetricId::ALL
            .iter()
            .filter_map(|&metric| match metric.kind() {
                MetricKind::Technical(indicator) => Some((metric, self.current(indicator, &columns))),
                _ => None,
            })
            .collect()
    }

    fn current(&self, indicator: Indicator, columns: &PriceColumns) -> MetricValue {
        let needed = lookback(indicator);
        let value = indicator_value(indicator, columns, 0);

        let detail = match (value, columns.labels.first()) {
            (Some(_), Some(latest)) => format!(
                "{}; close {:.2} on {}",
                describe(indicator),
                columns.closes[0],
                latest
            ),
            _ if columns.len() < needed => format!(
                "{}; needs {} daily bars, have {}",
                describe(indicator),
                needed,
                columns.len()
            ),
            _ => format!("{}; undefined for this price window", describe(indicator)),
        };

        format_indicator(indicator, value, detail)
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
