use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::arithmetic::{format_fixed, format_percent, NOT_AVAILABLE};
use crate::{AnalysisError, MetricId};

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One annual or quarterly statement row (income, balance sheet or cash flow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalReport {
    pub fiscal_date_ending: NaiveDate,
    /// Numeric line items keyed by the provider's field name. Absent fields are simply missing.
    pub fields: BTreeMap<String, f64>,
}

impl FundamentalReport {
    pub fn new(fiscal_date_ending: NaiveDate) -> Self {
        Self {
            fiscal_date_ending,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    /// Field value with absent treated as zero.
    pub fn value_or_zero(&self, field: &str) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    pub fn period_label(&self) -> String {
        self.fiscal_date_ending.format("%Y-%m-%d").to_string()
    }
}

/// Annual and quarterly rows of one statement type, each sorted newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
    pub annual: Vec<FundamentalReport>,
    pub quarterly: Vec<FundamentalReport>,
}

impl StatementSet {
    pub fn annual(reports: Vec<FundamentalReport>) -> Self {
        Self {
            annual: reports,
            quarterly: Vec::new(),
        }
    }

    pub fn reports(&self, granularity: Granularity) -> &[FundamentalReport] {
        match granularity {
            Granularity::Yearly => &self.annual,
            Granularity::Quarterly => &self.quarterly,
        }
    }

    pub fn latest_annual(&self) -> Option<&FundamentalReport> {
        self.annual.first()
    }
}

/// Notice the provider returns in place of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderNotice {
    /// `Note` / `Information`: request budget exhausted
    RateLimit(String),
    /// `Error Message`: unknown symbol or malformed request
    Error(String),
}

/// Point-in-time company facts from the overview endpoint. No history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewSnapshot {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub market_capitalization: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_sales_ttm: Option<f64>,
    pub price_to_book: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub notice: Option<ProviderNotice>,
    /// Number of keys the provider sent, sentinels excluded, whatever their values.
    pub field_count: usize,
}

impl OverviewSnapshot {
    pub fn is_empty(&self) -> bool {
        self.notice.is_none()
            && self.field_count == 0
            && self.symbol.is_none()
            && self.name.is_none()
            && self.market_capitalization.is_none()
            && self.trailing_pe.is_none()
            && self.forward_pe.is_none()
            && self.price_to_sales_ttm.is_none()
            && self.price_to_book.is_none()
            && self.ev_to_ebitda.is_none()
            && self.shares_outstanding.is_none()
    }

    /// Fails for a rate-limited, errored or empty overview; the bundle is unusable then.
    pub fn ensure_usable(&self, symbol: &str) -> Result<(), AnalysisError> {
        match &self.notice {
            Some(ProviderNotice::RateLimit(message)) => Err(AnalysisError::RateLimited {
                symbol: symbol.to_string(),
                message: message.clone(),
            }),
            Some(ProviderNotice::Error(message)) => Err(AnalysisError::Provider {
                symbol: symbol.to_string(),
                message: message.clone(),
            }),
            None if self.is_empty() => Err(AnalysisError::NoData {
                symbol: symbol.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Everything retrieved for one symbol in one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolBundle {
    pub symbol: String,
    pub overview: OverviewSnapshot,
    pub income: StatementSet,
    pub balance_sheet: StatementSet,
    pub cash_flow: StatementSet,
    /// Daily bars, newest first.
    pub daily: Vec<PriceBar>,
}

/// Report granularity for fundamental chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Yearly,
    Quarterly,
}

impl Granularity {
    /// Number of most recent reports shown on a chart.
    pub fn report_window(&self) -> usize {
        match self {
            Granularity::Yearly => 5,
            Granularity::Quarterly => 20,
        }
    }

    /// Reports per year, used to turn "N-year" horizons into report offsets.
    pub fn stride(&self) -> usize {
        match self {
            Granularity::Yearly => 1,
            Granularity::Quarterly => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Yearly => "yearly",
            Granularity::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yearly" | "annual" => Ok(Granularity::Yearly),
            "quarterly" => Ok(Granularity::Quarterly),
            other => Err(AnalysisError::InvalidData(format!("unknown granularity '{}'", other))),
        }
    }
}

/// Formatted metric plus a note of the inputs it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub display: String,
    pub detail: String,
}

impl MetricValue {
    pub fn new(display: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            detail: detail.into(),
        }
    }

    pub fn not_available(detail: impl Into<String>) -> Self {
        Self::new(NOT_AVAILABLE, detail)
    }

    /// `"12.34%"` or `N/A`
    pub fn percent(value: Option<f64>, detail: impl Into<String>) -> Self {
        match value {
            Some(v) => Self::new(format_percent(v), detail),
            None => Self::not_available(detail),
        }
    }

    /// `"12.34"` or `N/A`
    pub fn fixed(value: Option<f64>, detail: impl Into<String>) -> Self {
        match value {
            Some(v) => Self::new(format_fixed(v), detail),
            None => Self::not_available(detail),
        }
    }

    pub fn is_available(&self) -> bool {
        self.display != NOT_AVAILABLE
    }
}

/// Current metrics for one symbol. Replaced, never mutated, on the next fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub symbol: String,
    pub metrics: BTreeMap<MetricId, MetricValue>,
}

impl MetricsRecord {
    pub fn get(&self, metric: MetricId) -> Option<&MetricValue> {
        self.metrics.get(&metric)
    }

    /// Display string for a metric, `N/A` when it was not produced.
    pub fn display(&self, metric: MetricId) -> &str {
        self.metrics
            .get(&metric)
            .map(|v| v.display.as_str())
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// One chart point: a number or the `N/A` sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesValue {
    Value(f64),
    NotAvailable,
}

impl SeriesValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SeriesValue::Value(v) => Some(*v),
            SeriesValue::NotAvailable => None,
        }
    }
}

impl From<Option<f64>> for SeriesValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => SeriesValue::Value(v),
            _ => SeriesValue::NotAvailable,
        }
    }
}

impl Serialize for SeriesValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SeriesValue::Value(v) => serializer.serialize_f64(*v),
            SeriesValue::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for SeriesValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(SeriesValue::Value(v)),
            Raw::Text(s) if s == NOT_AVAILABLE => Ok(SeriesValue::NotAvailable),
            Raw::Text(s) => Err(serde::de::Error::custom(format!("unexpected series value '{}'", s))),
        }
    }
}

/// Labelled values for charting, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub metric: MetricId,
    pub labels: Vec<String>,
    pub values: Vec<SeriesValue>,
}

impl ChartSeries {
    /// Build from points in storage order (newest first); the result is chronological.
    pub fn from_newest_first(metric: MetricId, points: Vec<(String, SeriesValue)>) -> Self {
        let (labels, values) = points.into_iter().rev().unzip();
        Self {
            metric,
            labels,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_report_field_access() {
        let report = FundamentalReport::new(date("2023-12-31")).with_field("totalRevenue", 110.0);
        assert_eq!(report.get("totalRevenue"), Some(110.0));
        assert_eq!(report.get("netIncome"), None);
        assert_eq!(report.value_or_zero("netIncome"), 0.0);
        assert_eq!(report.period_label(), "2023-12-31");
    }

    #[test]
    fn test_overview_usability() {
        let empty = OverviewSnapshot::default();
        assert!(empty.is_empty());
        assert_eq!(
            empty.ensure_usable("MSFT"),
            Err(AnalysisError::NoData { symbol: "MSFT".to_string() })
        );

        let limited = OverviewSnapshot {
            notice: Some(ProviderNotice::RateLimit("25 requests per day".to_string())),
            ..Default::default()
        };
        assert!(matches!(
            limited.ensure_usable("MSFT"),
            Err(AnalysisError::RateLimited { ref symbol, .. }) if symbol == "MSFT"
        ));

        let usable = OverviewSnapshot {
            market_capitalization: Some(1_000_000_000.0),
            ..Default::default()
        };
        assert!(usable.ensure_usable("MSFT").is_ok());
    }

    #[test]
    fn test_granularity() {
        assert_eq!("yearly".parse::<Granularity>().unwrap(), Granularity::Yearly);
        assert_eq!("Quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert!("daily".parse::<Granularity>().is_err());
        assert_eq!(Granularity::Yearly.report_window(), 5);
        assert_eq!(Granularity::Quarterly.report_window(), 20);
        assert_eq!(Granularity::Quarterly.stride(), 4);
    }

    #[test]
    fn test_metric_value_constructors() {
        assert_eq!(MetricValue::percent(Some(10.0), "").display, "10.00%");
        assert_eq!(MetricValue::fixed(Some(20.0), "").display, "20.00");
        let na = MetricValue::fixed(None, "no cash flow");
        assert_eq!(na.display, "N/A");
        assert!(!na.is_available());
    }

    #[test]
    fn test_chart_series_reverses_storage_order() {
        let series = ChartSeries::from_newest_first(
            MetricId::Rsi,
            vec![
                ("2024-01-03".to_string(), SeriesValue::Value(55.0)),
                ("2024-01-02".to_string(), SeriesValue::NotAvailable),
                ("2024-01-01".to_string(), SeriesValue::Value(45.0)),
            ],
        );
        assert_eq!(series.labels, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(series.values[0], SeriesValue::Value(45.0));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_series_value_json() {
        let json = serde_json::to_string(&vec![SeriesValue::Value(1.5), SeriesValue::NotAvailable]).unwrap();
        assert_eq!(json, "[1.5,\"N/A\"]");
        let parsed: Vec<SeriesValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[1], SeriesValue::NotAvailable);
        assert_eq!(SeriesValue::from(Some(f64::INFINITY)), SeriesValue::NotAvailable);
    }
}
