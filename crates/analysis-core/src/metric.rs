//! Metric identifiers shown in the comparison table and accepted by the chart generator.
//!
//! The declaration order below is the display order; `MetricId` derives `Ord` so a
//! `BTreeMap<MetricId, _>` iterates rows in that order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

macro_rules! metric_ids {
    ($( $variant:ident => $id:literal, $label:literal; )+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum MetricId {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl MetricId {
            /// Every metric, in display order.
            pub const ALL: &'static [MetricId] = &[$(MetricId::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(MetricId::$variant => $id,)+
                }
            }

            /// Row label used by the comparison table.
            pub fn label(&self) -> &'static str {
                match self {
                    $(MetricId::$variant => $label,)+
                }
            }
        }

        impl FromStr for MetricId {
            type Err = AnalysisError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($id => Ok(MetricId::$variant),)+
                    other => Err(AnalysisError::UnknownMetric(other.to_string())),
                }
            }
        }
    };
}

metric_ids! {
    PeTtm => "pe_ttm", "PE TTM";
    PeForward => "pe_forward", "PE Forward";
    PriceToSales => "price_to_sales", "Price to Sales";
    PriceToBook => "price_to_book", "Price to Book";
    EvEbitda => "ev_ebitda", "EV / EBITDA";
    PriceToFcf => "price_to_fcf", "Price to FCF";
    EvFcf => "ev_fcf", "EV / FCF";
    SalesGrowth1Yr => "sales_growth_1yr", "Sales Growth 1-Yr";
    SalesGrowth3Yr => "sales_growth_3yr", "Sales Growth 3-Yr";
    SalesGrowth5Yr => "sales_growth_5yr", "Sales Growth 5-Yr";
    EpsGrowth1Yr => "eps_growth_1yr", "EPS Growth 1-Yr";
    EpsGrowth3Yr => "eps_growth_3yr", "EPS Growth 3-Yr";
    EpsGrowth5Yr => "eps_growth_5yr", "EPS Growth 5-Yr";
    EbitdaGrowth1Yr => "ebitda_growth_1yr", "EBITDA Growth 1-Yr";
    EbitdaGrowth3Yr => "ebitda_growth_3yr", "EBITDA Growth 3-Yr";
    EbitdaGrowth5Yr => "ebitda_growth_5yr", "EBITDA Growth 5-Yr";
    GrossMargin => "gross_margin", "Gross Margin";
    GrossMargin1YrChange => "gross_margin_1yr_change", "Gross Margin 1-Yr Change";
    GrossMargin3YrChange => "gross_margin_3yr_change", "Gross Margin 3-Yr Change";
    GrossMargin5YrChange => "gross_margin_5yr_change", "Gross Margin 5-Yr Change";
    OperatingMargin => "operating_margin", "Operating Margin";
    OperatingMargin1YrChange => "operating_margin_1yr_change", "Operating Margin 1-Yr Change";
    OperatingMargin3YrChange => "operating_margin_3yr_change", "Operating Margin 3-Yr Change";
    OperatingMargin5YrChange => "operating_margin_5yr_change", "Operating Margin 5-Yr Change";
    NetMargin => "net_margin", "Net Margin";
    NetMargin1YrChange => "net_margin_1yr_change", "Net Margin 1-Yr Change";
    NetMargin3YrChange => "net_margin_3yr_change", "Net Margin 3-Yr Change";
    NetMargin5YrChange => "net_margin_5yr_change", "Net Margin 5-Yr Change";
    Rsi => "rsi", "RSI";
    Mfi => "mfi", "MFI";
    PriceVs52WkHigh => "price_vs_52wk_high", "Price vs 52-Wk High";
    PriceVs52WkLow => "price_vs_52wk_low", "Price vs 52-Wk Low";
    BollingerPercent20 => "bollinger_percent_20", "Bollinger Percent 20";
    BollingerPercent50 => "bollinger_percent_50", "Bollinger Percent 50";
    PriceVs50DayAvg => "price_vs_50day_avg", "Price vs 50-Day Avg";
    PriceVs200DayAvg => "price_vs_200day_avg", "Price vs 200-Day Avg";
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income-statement line whose growth is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrowthLine {
    Sales,
    Eps,
    Ebitda,
}

/// Income-statement line expressed as a share of revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarginLine {
    Gross,
    Operating,
    Net,
}

/// Provider-supplied valuation figure or a ratio recomputed from the statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuationFigure {
    PeTtm,
    PeForward,
    PriceToSales,
    PriceToBook,
    EvEbitda,
    PriceToFcf,
    EvFcf,
}

/// Daily-bar indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Rsi,
    Mfi,
    RelativeToHigh,
    RelativeToLow,
    BollingerPercent20,
    BollingerPercent50,
    RelativeToSma50,
    RelativeToSma200,
}

/// What a metric is computed from, used by both the aggregator and the chart generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Valuation(ValuationFigure),
    Growth { line: GrowthLine, years: usize },
    Margin(MarginLine),
    MarginChange { line: MarginLine, years: usize },
    Technical(Indicator),
}

impl MetricId {
    pub fn kind(&self) -> MetricKind {
        use MetricId::*;
        match self {
            PeTtm => MetricKind::Valuation(ValuationFigure::PeTtm),
            PeForward => MetricKind::Valuation(ValuationFigure::PeForward),
            PriceToSales => MetricKind::Valuation(ValuationFigure::PriceToSales),
            PriceToBook => MetricKind::Valuation(ValuationFigure::PriceToBook),
            EvEbitda => MetricKind::Valuation(ValuationFigure::EvEbitda),
            PriceToFcf => MetricKind::Valuation(ValuationFigure::PriceToFcf),
            EvFcf => MetricKind::Valuation(ValuationFigure::EvFcf),
            SalesGrowth1Yr => MetricKind::Growth { line: GrowthLine::Sales, years: 1 },
            SalesGrowth3Yr => MetricKind::Growth { line: GrowthLine::Sales, years: 3 },
            SalesGrowth5Yr => MetricKind::Growth { line: GrowthLine::Sales, years: 5 },
            EpsGrowth1Yr => MetricKind::Growth { line: GrowthLine::Eps, years: 1 },
            EpsGrowth3Yr => MetricKind::Growth { line: GrowthLine::Eps, years: 3 },
            EpsGrowth5Yr => MetricKind::Growth { line: GrowthLine::Eps, years: 5 },
            EbitdaGrowth1Yr => MetricKind::Growth { line: GrowthLine::Ebitda, years: 1 },
            EbitdaGrowth3Yr => MetricKind::Growth { line: GrowthLine::Ebitda, years: 3 },
            EbitdaGrowth5Yr => MetricKind::Growth { line: GrowthLine::Ebitda, years: 5 },
            GrossMargin => MetricKind::Margin(MarginLine::Gross),
            GrossMargin1YrChange => MetricKind::MarginChange { line: MarginLine::Gross, years: 1 },
            GrossMargin3YrChange => MetricKind::MarginChange { line: MarginLine::Gross, years: 3 },
            GrossMargin5YrChange => MetricKind::MarginChange { line: MarginLine::Gross, years: 5 },
            OperatingMargin => MetricKind::Margin(MarginLine::Operating),
            OperatingMargin1YrChange => MetricKind::MarginChange { line: MarginLine::Operating, years: 1 },
            OperatingMargin3YrChange => MetricKind::MarginChange { line: MarginLine::Operating, years: 3 },
            OperatingMargin5YrChange => MetricKind::MarginChange { line: MarginLine::Operating, years: 5 },
            NetMargin => MetricKind::Margin(MarginLine::Net),
            NetMargin1YrChange => MetricKind::MarginChange { line: MarginLine::Net, years: 1 },
            NetMargin3YrChange => MetricKind::MarginChange { line: MarginLine::Net, years: 3 },
            NetMargin5YrChange => MetricKind::MarginChange { line: MarginLine::Net, years: 5 },
            Rsi => MetricKind::Technical(Indicator::Rsi),
            Mfi => MetricKind::Technical(Indicator::Mfi),
            PriceVs52WkHigh => MetricKind::Technical(Indicator::RelativeToHigh),
            PriceVs52WkLow => MetricKind::Technical(Indicator::RelativeToLow),
            BollingerPercent20 => MetricKind::Technical(Indicator::BollingerPercent20),
            BollingerPercent50 => MetricKind::Technical(Indicator::BollingerPercent50),
            PriceVs50DayAvg => MetricKind::Technical(Indicator::RelativeToSma50),
            PriceVs200DayAvg => MetricKind::Technical(Indicator::RelativeToSma200),
        }
    }
}
