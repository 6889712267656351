//! Historical chart series: a metric recomputed at every offset of its source history.

pub mod window;

pub use window::rolling;

use analysis_core::{AnalysisError, ChartSeries, Granularity, MetricId, MetricKind, SymbolBundle};
use fundamental_analysis::FundamentalSeries;
use technical_analysis::{indicator_value, lookback, PriceColumns};

/// Trading days charted for daily indicators (about five years).
pub const DAILY_WINDOW: usize = 1260;

pub struct ChartSeriesGenerator;

impl ChartSeriesGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Chart `metric` for one symbol, oldest point first.
    ///
    /// Daily indicators ignore `granularity` and use the last [`DAILY_WINDOW`] bars.
    /// Statement metrics chart the last 5 annual or 20 quarterly reports, each evaluated
    /// against every older report available.
    pub fn generate(
        &self,
        bundle: &SymbolBundle,
        metric: MetricId,
        granularity: Granularity,
    ) -> Result<ChartSeries, AnalysisError> {
        bundle.overview.ensure_usable(&bundle.symbol)?;

        let points = match metric.kind() {
            MetricKind::Valuation(_) => return Err(AnalysisError::UnsupportedChart(metric)),
            MetricKind::Technical(indicator) => {
                let window = &bundle.daily[..bundle.daily.len().min(DAILY_WINDOW)];
                let columns = PriceColumns::from_bars(window);
                rolling(&columns.labels, DAILY_WINDOW, lookback(indicator), |offset| {
                    indicator_value(indicator, &columns, offset)
                })
            }
            kind => {
                let series = FundamentalSeries::from_bundle(bundle, granularity);
                rolling(&series.labels(), granularity.report_window(), 1, |offset| {
                    series.measure(kind, offset).and_then(|m| m.value)
                })
            }
        };

        tracing::debug!(
            "Chart {} for {} ({}): {} points",
            metric,
            bundle.symbol,
            granularity,
            points.len()
        );
        Ok(ChartSeries::from_newest_first(metric, points))
    }
}

impl Default for ChartSeriesGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{FundamentalReport, OverviewSnapshot, PriceBar, ProviderNotice, SeriesValue, StatementSet};
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn daily_bars(count: usize) -> Vec<PriceBar> {
        let latest = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + ((i * 13) % 17) as f64;
                PriceBar {
                    date: latest - Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    fn quarter_end(year: i32, quarter: u32) -> NaiveDate {
        let (month, day) = match quarter {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            _ => (12, 31),
        };
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn bundle() -> SymbolBundle {
        let annual = (0..7)
            .map(|i| {
                FundamentalReport::new(quarter_end(2023 - i, 4))
                    .with_field("totalRevenue", 200.0 - 10.0 * i as f64)
                    .with_field("grossProfit", 80.0)
            })
            .collect();
        let quarterly = (0..24)
            .map(|i| {
                let year = 2023 - (i / 4) as i32;
                let quarter = 4 - (i % 4) as u32;
                FundamentalReport::new(quarter_end(year, quarter))
                    .with_field("totalRevenue", 100.0 - (i / 4) as f64 * 10.0)
            })
            .collect();

        SymbolBundle {
            symbol: "ACME".to_string(),
            overview: OverviewSnapshot {
                market_capitalization: Some(1_000.0),
                ..Default::default()
            },
            income: StatementSet { annual, quarterly },
            daily: daily_bars(1500),
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_indicator_length() {
        let generator = ChartSeriesGenerator::new();
        let bundle = bundle();

        let rsi = generator.generate(&bundle, MetricId::Rsi, Granularity::Yearly).unwrap();
        assert_eq!(rsi.len(), DAILY_WINDOW - 15 + 1);
        assert_eq!(rsi.labels.len(), rsi.values.len());
        assert!(rsi.labels.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(rsi.labels.last().unwrap(), "2024-06-28");

        let sma200 = generator
            .generate(&bundle, MetricId::PriceVs200DayAvg, Granularity::Quarterly)
            .unwrap();
        assert_eq!(sma200.len(), DAILY_WINDOW - 200 + 1);

        let high = generator.generate(&bundle, MetricId::PriceVs52WkHigh, Granularity::Yearly).unwrap();
        assert_eq!(high.len(), DAILY_WINDOW - 253 + 1);
        assert!(high.values.iter().all(|v| v.as_f64().is_some()));
    }

    #[test]
    fn test_short_daily_history() {
        let mut bundle = bundle();
        bundle.daily = daily_bars(100);
        let generator = ChartSeriesGenerator::new();

        let bollinger = generator
            .generate(&bundle, MetricId::BollingerPercent50, Granularity::Yearly)
            .unwrap();
        assert_eq!(bollinger.len(), 51);

        let sma200 = generator.generate(&bundle, MetricId::PriceVs200DayAvg, Granularity::Yearly).unwrap();
        assert!(sma200.is_empty());
    }

    #[test]
    fn test_current_point_matches_record() {
        let bundle = bundle();
        let columns = PriceColumns::from_bars(&bundle.daily);
        let current = indicator_value(analysis_core::Indicator::Mfi, &columns, 0).unwrap();

        let mfi = ChartSeriesGenerator::new()
            .generate(&bundle, MetricId::Mfi, Granularity::Yearly)
            .unwrap();
        assert_relative_eq!(mfi.values.last().unwrap().as_f64().unwrap(), current, epsilon = 0.005);
    }

    #[test]
    fn test_yearly_growth_uses_older_reports() {
        let series = ChartSeriesGenerator::new()
            .generate(&bundle(), MetricId::SalesGrowth1Yr, Granularity::Yearly)
            .unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.labels.first().unwrap(), "2019-12-31");
        // 2019 revenue 160 vs 2018 revenue 150.
        assert_eq!(series.values[0], SeriesValue::Value(6.67));
        // 2023 revenue 200 vs 2022 revenue 190.
        assert_eq!(series.values[4], SeriesValue::Value(5.26));
    }

    #[test]
    fn test_yearly_margin_change_gaps() {
        let series = ChartSeriesGenerator::new()
            .generate(&bundle(), MetricId::GrossMargin5YrChange, Granularity::Yearly)
            .unwrap();
        // Seven annual reports: only the two newest have a report five years back.
        let available: Vec<bool> = series.values.iter().map(|v| v.as_f64().is_some()).collect();
        assert_eq!(available, vec![false, false, false, true, true]);
    }

    #[test]
    fn test_quarterly_growth_compares_like_quarters() {
        let series = ChartSeriesGenerator::new()
            .generate(&bundle(), MetricId::SalesGrowth1Yr, Granularity::Quarterly)
            .unwrap();

        assert_eq!(series.len(), 20);
        assert_eq!(series.labels.last().unwrap(), "2023-12-31");
        // Latest quarter 100 vs the same quarter a year earlier, 90.
        assert_eq!(series.values[19], SeriesValue::Value(11.11));
    }

    #[test]
    fn test_valuation_metrics_are_rejected() {
        let err = ChartSeriesGenerator::new()
            .generate(&bundle(), MetricId::PriceToFcf, Granularity::Yearly)
            .unwrap_err();
        assert_eq!(err, AnalysisError::UnsupportedChart(MetricId::PriceToFcf));
    }

    #[test]
    fn test_rate_limited_overview_is_fatal() {
        let mut bundle = bundle();
        bundle.overview.notice = Some(ProviderNotice::RateLimit("slow down".to_string()));
        let err = ChartSeriesGenerator::new()
            .generate(&bundle, MetricId::Rsi, Granularity::Yearly)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::RateLimited { .. }));
    }
}
