use analysis_core::arithmetic::{format_fixed, ratio};
use analysis_core::{MetricValue, OverviewSnapshot, StatementSet, ValuationFigure};

/// Enterprise value rebuilt from market cap and the latest annual balance sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnterpriseValue {
    pub market_cap: f64,
    pub long_term_debt: f64,
    pub short_long_term_debt_total: f64,
    pub cash: f64,
}

impl EnterpriseValue {
    pub fn from_statements(overview: &OverviewSnapshot, balance_sheet: &StatementSet) -> Self {
        let latest = balance_sheet.latest_annual();
        let field = |name: &str| latest.map(|r| r.value_or_zero(name)).unwrap_or(0.0);

        Self {
            market_cap: overview.market_capitalization.unwrap_or(0.0),
            long_term_debt: field("longTermDebt"),
            short_long_term_debt_total: field("shortLongTermDebtTotal"),
            cash: field("cashAndCashEquivalentsAtCarryingValue"),
        }
    }

    pub fn total(&self) -> f64 {
        self.market_cap + self.long_term_debt + self.short_long_term_debt_total - self.cash
    }

    fn describe(&self) -> String {
        format!(
            "EV {} = market cap {} + long-term debt {} + short/long-term debt {} - cash {}",
            format_fixed(self.total()),
            format_fixed(self.market_cap),
            format_fixed(self.long_term_debt),
            format_fixed(self.short_long_term_debt_total),
            format_fixed(self.cash)
        )
    }
}

/// Valuation inputs for one symbol: provider ratios plus the free-cash-flow proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInputs<'a> {
    overview: &'a OverviewSnapshot,
    enterprise_value: EnterpriseValue,
    /// Latest annual operating cash flow, 0 when absent.
    free_cash_flow: f64,
    fcf_period: Option<String>,
}

impl<'a> ValuationInputs<'a> {
    pub fn new(
        overview: &'a OverviewSnapshot,
        balance_sheet: &StatementSet,
        cash_flow: &StatementSet,
    ) -> Self {
        let latest_cash_flow = cash_flow.latest_annual();
        Self {
            overview,
            enterprise_value: EnterpriseValue::from_statements(overview, balance_sheet),
            free_cash_flow: latest_cash_flow
                .map(|r| r.value_or_zero("operatingCashflow"))
                .unwrap_or(0.0),
            fcf_period: latest_cash_flow.map(|r| r.period_label()),
        }
    }

    pub fn enterprise_value(&self) -> EnterpriseValue {
        self.enterprise_value
    }

    fn provider(value: Option<f64>, field: &str) -> MetricValue {
        MetricValue::fixed(value, format!("OVERVIEW {}", field))
    }

    fn fcf_detail(&self, numerator: &str) -> String {
        match &self.fcf_period {
            Some(period) => format!(
                "{} / operating cash flow {} ({})",
                numerator,
                format_fixed(self.free_cash_flow),
                period
            ),
            None => format!("{} / operating cash flow: no annual cash flow report", numerator),
        }
    }

    pub fn figure(&self, figure: ValuationFigure) -> MetricValue {
        let overview = self.overview;
        match figure {
            ValuationFigure::PeTtm => Self::provider(overview.trailing_pe, "TrailingPE"),
            ValuationFigure::PeForward => Self::provider(overview.forward_pe, "ForwardPE"),
            ValuationFigure::PriceToSales => {
                Self::provider(overview.price_to_sales_ttm, "PriceToSalesRatioTTM")
            }
            ValuationFigure::PriceToBook => {
                Self::provider(overview.price_to_book, "PriceToBookRatio")
            }
            ValuationFigure::EvEbitda => Self::provider(overview.ev_to_ebitda, "EVToEBITDA"),
            ValuationFigure::PriceToFcf => {
                let market_cap = self.enterprise_value.market_cap;
                MetricValue::fixed(
                    ratio(market_cap, self.free_cash_flow),
                    self.fcf_detail(&format!("market cap {}", format_fixed(market_cap))),
                )
            }
            ValuationFigure::EvFcf => MetricValue::fixed(
                ratio(self.enterprise_value.total(), self.free_cash_flow),
                self.fcf_detail(&self.enterprise_value.describe()),
            ),
        }
    }
}
