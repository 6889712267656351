//! Conversion of the provider's JSON bodies into the typed data model.
//!
//! The provider sends numbers as strings and uses `"None"` / `"-"` for blanks. Nothing here
//! fails: malformed pieces are dropped or read as absent so that a partial response only
//! degrades individual metrics. The one exception, an unusable overview, is carried on
//! [`OverviewSnapshot::notice`] and rejected later by the aggregator.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{FundamentalReport, OverviewSnapshot, PriceBar, ProviderNotice, StatementSet, SymbolBundle};

const FISCAL_DATE_FIELD: &str = "fiscalDateEnding";
const NON_NUMERIC_FIELDS: &[&str] = &[FISCAL_DATE_FIELD, "reportedCurrency"];
const RATE_LIMIT_FIELDS: &[&str] = &["Note", "Information"];
const ERROR_FIELD: &str = "Error Message";

/// Raw JSON bodies of the five endpoints for one symbol.
#[derive(Debug, Clone, Default)]
pub struct ProviderPayloads {
    pub overview: Value,
    pub cash_flow: Value,
    pub balance_sheet: Value,
    pub income_statement: Value,
    pub daily: Value,
}

impl SymbolBundle {
    pub fn from_payloads(symbol: &str, payloads: &ProviderPayloads) -> Self {
        Self {
            symbol: symbol.to_string(),
            overview: parse_overview(&payloads.overview),
            income: parse_statements(&payloads.income_statement),
            balance_sheet: parse_statements(&payloads.balance_sheet),
            cash_flow: parse_statements(&payloads.cash_flow),
            daily: parse_daily_series(&payloads.daily),
        }
    }
}

/// Read a provider number: JSON numbers or numeric strings. Blanks and garbage are absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim() {
            "" | "None" | "-" | "null" => None,
            text => text.parse::<f64>().ok(),
        },
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None")
        .map(str::to_string)
}

fn notice_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn parse_overview(value: &Value) -> OverviewSnapshot {
    let Some(obj) = value.as_object() else {
        return OverviewSnapshot::default();
    };

    let notice = RATE_LIMIT_FIELDS
        .iter()
        .find_map(|key| obj.get(*key))
        .map(|v| ProviderNotice::RateLimit(notice_text(v)))
        .or_else(|| obj.get(ERROR_FIELD).map(|v| ProviderNotice::Error(notice_text(v))));

    let number = |key: &str| obj.get(key).and_then(parse_number);
    let field_count = obj
        .keys()
        .filter(|k| {
            let k = k.as_str();
            !RATE_LIMIT_FIELDS.contains(&k) && k != ERROR_FIELD
        })
        .count();

    OverviewSnapshot {
        symbol: text_field(obj, "Symbol"),
        name: text_field(obj, "Name"),
        market_capitalization: number("MarketCapitalization"),
        trailing_pe: number("TrailingPE"),
        forward_pe: number("ForwardPE"),
        price_to_sales_ttm: number("PriceToSalesRatioTTM"),
        price_to_book: number("PriceToBookRatio"),
        ev_to_ebitda: number("EVToEBITDA"),
        shares_outstanding: number("SharesOutstanding"),
        notice,
        field_count,
    }
}

#[derive(Debug, Default, Deserialize)]
struct StatementPayload {
    #[serde(rename = "annualReports", default)]
    annual: Vec<Map<String, Value>>,
    #[serde(rename = "quarterlyReports", default)]
    quarterly: Vec<Map<String, Value>>,
}

/// Parse a statement body (`annualReports` / `quarterlyReports`). Provider order is kept.
pub fn parse_statements(value: &Value) -> StatementSet {
    if !value.is_object() {
        return StatementSet::default();
    }
    let payload = match StatementPayload::deserialize(value) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Unreadable statement payload: {}", e);
            StatementPayload::default()
        }
    };

    StatementSet {
        annual: payload.annual.iter().filter_map(parse_report).collect(),
        quarterly: payload.quarterly.iter().filter_map(parse_report).collect(),
    }
}

fn parse_report(entry: &Map<String, Value>) -> Option<FundamentalReport> {
    let raw_date = entry.get(FISCAL_DATE_FIELD).and_then(|v| v.as_str()).unwrap_or_default();
    let fiscal_date_ending = match NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            tracing::warn!("Dropping statement row with fiscalDateEnding '{}'", raw_date);
            return None;
        }
    };

    let fields: BTreeMap<String, f64> = entry
        .iter()
        .filter(|(k, _)| !NON_NUMERIC_FIELDS.contains(&k.as_str()))
        .filter_map(|(k, v)| parse_number(v).map(|n| (k.clone(), n)))
        .collect();

    Some(FundamentalReport {
        fiscal_date_ending,
        fields,
    })
}

#[derive(Debug, Deserialize)]
struct DailyBarPayload {
    #[serde(rename = "1. open", default)]
    open: Value,
    #[serde(rename = "2. high", default)]
    high: Value,
    #[serde(rename = "3. low", default)]
    low: Value,
    #[serde(rename = "4. close", default)]
    close: Value,
    #[serde(rename = "5. volume", default)]
    volume: Value,
}

/// Parse the `Time Series (Daily)` object into bars sorted newest first.
pub fn parse_daily_series(value: &Value) -> Vec<PriceBar> {
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };
    let Some(series) = obj
        .iter()
        .find(|(key, _)| key.starts_with("Time Series"))
        .and_then(|(_, v)| v.as_object())
    else {
        return Vec::new();
    };

    let mut bars: Vec<PriceBar> = series
        .iter()
        .filter_map(|(raw_date, raw_bar)| {
            let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").ok()?;
            let bar = DailyBarPayload::deserialize(raw_bar).ok()?;
            let num = |v: &Value| parse_number(v).unwrap_or(0.0);
            Some(PriceBar {
                date,
                open: num(&bar.open),
                high: num(&bar.high),
                low: num(&bar.low),
                close: num(&bar.close),
                volume: num(&bar.volume),
            })
        })
        .collect();

    if bars.len() < series.len() {
        tracing::debug!("Skipped {} malformed daily bars", series.len() - bars.len());
    }

    bars.sort_by(|a, b| b.date.cmp(&a.date));
    bars
}
