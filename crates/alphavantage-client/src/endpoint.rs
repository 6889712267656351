use analysis_core::ProviderPayloads;
use serde_json::Value;

/// The five provider functions fetched for every symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Overview,
    CashFlow,
    BalanceSheet,
    IncomeStatement,
    DailySeries,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Overview,
        Endpoint::CashFlow,
        Endpoint::BalanceSheet,
        Endpoint::IncomeStatement,
        Endpoint::DailySeries,
    ];

    /// Value of the `function` query parameter.
    pub fn function(&self) -> &'static str {
        match self {
            Endpoint::Overview => "OVERVIEW",
            Endpoint::CashFlow => "CASH_FLOW",
            Endpoint::BalanceSheet => "BALANCE_SHEET",
            Endpoint::IncomeStatement => "INCOME_STATEMENT",
            Endpoint::DailySeries => "TIME_SERIES_DAILY",
        }
    }

    /// File stem used in a fixture directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Endpoint::Overview => "overview",
            Endpoint::CashFlow => "cash_flow",
            Endpoint::BalanceSheet => "balance_sheet",
            Endpoint::IncomeStatement => "income_statement",
            Endpoint::DailySeries => "daily",
        }
    }

    pub fn query<'a>(&self, symbol: &'a str, api_key: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("function", self.function()), ("symbol", symbol)];
        if *self == Endpoint::DailySeries {
            query.push(("outputsize", "full"));
        }
        query.push(("apikey", api_key));
        query
    }

    /// Store a fetched body in its slot.
    pub fn assign(&self, payloads: &mut ProviderPayloads, body: Value) {
        let slot = match self {
            Endpoint::Overview => &mut payloads.overview,
            Endpoint::CashFlow => &mut payloads.cash_flow,
            Endpoint::BalanceSheet => &mut payloads.balance_sheet,
            Endpoint::IncomeStatement => &mut payloads.income_statement,
            Endpoint::DailySeries => &mut payloads.daily,
        };
        *slot = body;
    }
}
