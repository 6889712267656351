use analysis_core::{
    FundamentalReport, Granularity, GrowthLine, MarginLine, MetricKind, SymbolBundle,
};

use crate::growth::{current_margin, growth_over, margin_change, margin_series, Measurement, PeriodPoint};

pub fn line_field(line: MarginLine) -> &'static str {
    match line {
        MarginLine::Gross => "grossProfit",
        MarginLine::Operating => "operatingIncome",
        MarginLine::Net => "netIncome",
    }
}

/// Values of one income-statement field, absent values read as 0.
pub fn field_series(reports: &[FundamentalReport], field: &str) -> Vec<PeriodPoint> {
    reports
        .iter()
        .map(|r| PeriodPoint::new(r.period_label(), r.value_or_zero(field)))
        .collect()
}

/// Reported EBITDA, else operating income plus D&A when both are reported, else 0.
pub fn ebitda(report: &FundamentalReport) -> f64 {
    if let Some(reported) = report.get("ebitda").filter(|v| *v != 0.0) {
        return reported;
    }
    match (
        report.get("operatingIncome"),
        report.get("depreciationAndAmortization"),
    ) {
        (Some(operating), Some(dna)) => operating + dna,
        _ => 0.0,
    }
}

pub fn ebitda_series(income: &[FundamentalReport]) -> Vec<PeriodPoint> {
    income
        .iter()
        .map(|r| PeriodPoint::new(r.period_label(), ebitda(r)))
        .collect()
}

/// Net income per share for each income report.
///
/// Shares come from the balance sheet with the same fiscal date, falling back to the
/// overview's shares outstanding. EPS is 0 when neither resolves.
pub fn eps_series(
    income: &[FundamentalReport],
    balance_sheet: &[FundamentalReport],
    overview_shares: Option<f64>,
) -> Vec<PeriodPoint> {
    income
        .iter()
        .map(|report| {
            let matched_shares = balance_sheet
                .iter()
                .find(|b| b.fiscal_date_ending == report.fiscal_date_ending)
                .and_then(|b| b.get("commonStockSharesOutstanding"))
                .filter(|s| *s != 0.0);
            let shares = matched_shares
                .or(overview_shares.filter(|s| *s != 0.0))
                .unwrap_or(0.0);

            let eps = if shares == 0.0 {
                0.0
            } else {
                report.value_or_zero("netIncome") / shares
            };
            PeriodPoint::new(report.period_label(), if eps.is_finite() { eps } else { 0.0 })
        })
        .collect()
}

fn tail(points: &[PeriodPoint], offset: usize) -> &[PeriodPoint] {
    points.get(offset..).unwrap_or(&[])
}

/// Every derived per-period series for one symbol at one granularity.
#[derive(Debug, Clone, Default)]
pub struct FundamentalSeries {
    pub sales: Vec<PeriodPoint>,
    pub eps: Vec<PeriodPoint>,
    pub ebitda: Vec<PeriodPoint>,
    pub gross_margin: Vec<PeriodPoint>,
    pub operating_margin: Vec<PeriodPoint>,
    pub net_margin: Vec<PeriodPoint>,
    pub stride: usize,
}

impl FundamentalSeries {
    pub fn from_bundle(bundle: &SymbolBundle, granularity: Granularity) -> Self {
        let income = bundle.income.reports(granularity);
        let balance = bundle.balance_sheet.reports(granularity);

        Self {
            sales: field_series(income, "totalRevenue"),
            eps: eps_series(income, balance, bundle.overview.shares_outstanding),
            ebitda: ebitda_series(income),
            gross_margin: margin_series(income, line_field(MarginLine::Gross)),
            operating_margin: margin_series(income, line_field(MarginLine::Operating)),
            net_margin: margin_series(income, line_field(MarginLine::Net)),
            stride: granularity.stride(),
        }
    }

    /// Number of reporting periods available.
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.sales.iter().map(|p| p.label.clone()).collect()
    }

    pub fn growth(&self, line: GrowthLine) -> &[PeriodPoint] {
        match line {
            GrowthLine::Sales => &self.sales,
            GrowthLine::Eps => &self.eps,
            GrowthLine::Ebitda => &self.ebitda,
        }
    }

    pub fn margins(&self, line: MarginLine) -> &[PeriodPoint] {
        match line {
            MarginLine::Gross => &self.gross_margin,
            MarginLine::Operating => &self.operating_margin,
            MarginLine::Net => &self.net_margin,
        }
    }

    /// Evaluate a growth or margin metric as of `offset` periods back, using only that
    /// period and older ones. `None` for metrics not derived from the statements.
    pub fn measure(&self, kind: MetricKind, offset: usize) -> Option<Measurement> {
        match kind {
            MetricKind::Growth { line, years } => {
                Some(growth_over(tail(self.growth(line), offset), years, self.stride))
            }
            MetricKind::Margin(line) => Some(current_margin(tail(self.margins(line), offset))),
            MetricKind::MarginChange { line, years } => {
                Some(margin_change(tail(self.margins(line), offset), years, self.stride))
            }
            MetricKind::Valuation(_) | MetricKind::Technical(_) => None,
        }
    }
}
