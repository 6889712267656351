pub mod growth;
pub mod series;
pub mod valuation;

pub use growth::*;
pub use series::*;
pub use valuation::*;

use analysis_core::{Granularity, MetricId, MetricKind, MetricValue, SymbolBundle};

/// Computes the valuation, growth and profitability metrics of a symbol from its
/// overview and annual statements.
pub struct FundamentalAnalysisEngine;

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Every statement-derived metric in display order. Technical metrics are skipped.
    pub fn analyze(&self, bundle: &SymbolBundle) -> Vec<(MetricId, MetricValue)> {
        let valuation = ValuationInputs::new(&bundle.overview, &bundle.balance_sheet, &bundle.cash_flow);
        let series = FundamentalSeries::from_bundle(bundle, Granularity::Yearly);
        tracing::debug!(
            "Fundamental analysis for {}: {} annual income reports",
            bundle.symbol,
            series.len()
        );

        MetricId::ALL
            .iter()
            .filter_map(|&metric| {
                let value = match metric.kind() {
                    MetricKind::Valuation(figure) => valuation.figure(figure),
                    MetricKind::Technical(_) => return None,
                    kind => series.measure(kind, 0)?.into_percent(),
                };
                Some((metric, value))
            })
            .collect()
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{FundamentalReport, OverviewSnapshot, StatementSet};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn year_end(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
    }

    fn income(year: i32, revenue: f64, gross: f64, operating: f64, net: f64) -> FundamentalReport {
        FundamentalReport::new(year_end(year))
            .with_field("totalRevenue", revenue)
            .with_field("grossProfit", gross)
            .with_field("operatingIncome", operating)
            .with_field("netIncome", net)
            .with_field("ebitda", operating * 1.2)
    }

    fn bundle() -> SymbolBundle {
        SymbolBundle {
            symbol: "ACME".to_string(),
            overview: OverviewSnapshot {
                market_capitalization: Some(1_000_000_000.0),
                trailing_pe: Some(25.0),
                shares_outstanding: Some(100.0),
                ..Default::default()
            },
            income: StatementSet::annual(vec![
                income(2023, 110.0, 55.0, 22.0, 11.0),
                income(2022, 100.0, 48.0, 20.0, 10.0),
            ]),
            cash_flow: StatementSet::annual(vec![
                FundamentalReport::new(year_end(2023)).with_field("operatingCashflow", 50_000_000.0),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_headline_metrics() {
        let metrics: HashMap<MetricId, MetricValue> =
            FundamentalAnalysisEngine::new().analyze(&bundle()).into_iter().collect();

        assert_eq!(metrics[&MetricId::PriceToFcf].display, "20.00");
        assert_eq!(metrics[&MetricId::PeTtm].display, "25.00");
        assert_eq!(metrics[&MetricId::SalesGrowth1Yr].display, "10.00%");
        assert_eq!(metrics[&MetricId::EpsGrowth1Yr].display, "10.00%");
        assert_eq!(metrics[&MetricId::EbitdaGrowth1Yr].display, "10.00%");
        assert_eq!(metrics[&MetricId::GrossMargin].display, "50.00%");
        assert_eq!(metrics[&MetricId::GrossMargin1YrChange].display, "2.00%");
        assert_eq!(metrics[&MetricId::SalesGrowth3Yr].display, "N/A");
        assert_eq!(metrics[&MetricId::NetMargin5YrChange].display, "N/A");
        assert!(!metrics.contains_key(&MetricId::Rsi));
    }

    #[test]
    fn test_analyze_preserves_display_order() {
        let ids: Vec<MetricId> = FundamentalAnalysisEngine::new()
            .analyze(&bundle())
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids.len(), 28);
        assert_eq!(ids.first(), Some(&MetricId::PeTtm));
        assert_eq!(ids.last(), Some(&MetricId::NetMargin5YrChange));
    }

    #[test]
    fn test_absent_revenue_margin_is_zero() {
        let mut bundle = bundle();
        bundle.income = StatementSet::annual(vec![
            FundamentalReport::new(year_end(2023)).with_field("grossProfit", 40.0),
        ]);
        let metrics: HashMap<MetricId, MetricValue> =
            FundamentalAnalysisEngine::new().analyze(&bundle).into_iter().collect();
        assert_eq!(metrics[&MetricId::GrossMargin].display, "0.00%");
        assert_eq!(metrics[&MetricId::SalesGrowth1Yr].display, "N/A");
    }

    #[test]
    fn test_analyze_without_statements() {
        let bundle = SymbolBundle {
            symbol: "EMPTY".to_string(),
            overview: OverviewSnapshot {
                name: Some("Empty Corp".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let metrics = FundamentalAnalysisEngine::new().analyze(&bundle);
        assert_eq!(metrics.len(), 28);
        assert!(metrics.iter().all(|(_, v)| v.display == "N/A"));
    }
}
