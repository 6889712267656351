//! Growth and margin calculations over per-period series ordered newest first.
//!
//! `stride` is the number of periods per year: 1 for annual reports, 4 for quarterly
//! reports so that an N-year horizon compares like quarters.

use analysis_core::arithmetic::{finite, format_fixed, format_percent, growth_rate, margin_delta};
use analysis_core::{FundamentalReport, MetricValue};

/// One fiscal period's value of a derived line item.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodPoint {
    pub label: String,
    pub value: f64,
}

impl PeriodPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A computed number together with the trail of inputs behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: Option<f64>,
    pub detail: String,
}

impl Measurement {
    fn new(value: Option<f64>, detail: impl Into<String>) -> Self {
        Self {
            value,
            detail: detail.into(),
        }
    }

    /// Percent-formatted metric value.
    pub fn into_percent(self) -> MetricValue {
        MetricValue::percent(self.value, self.detail)
    }
}

fn horizon(years: usize) -> String {
    format!("{}-Yr", years)
}

/// Growth between the latest period and the one a year earlier.
pub fn single_period_growth(points: &[PeriodPoint], stride: usize) -> Measurement {
    let stride = stride.max(1);
    let (Some(current), Some(previous)) = (points.first(), points.get(stride)) else {
        return Measurement::new(
            None,
            format!("needs {} periods, have {}", stride + 1, points.len()),
        );
    };

    Measurement::new(
        growth_rate(current.value, previous.value),
        format!(
            "{} {} vs {} {}",
            current.label,
            format_fixed(current.value),
            previous.label,
            format_fixed(previous.value)
        ),
    )
}

/// Simple mean of `years` year-over-year growth rates.
///
/// Fails fast with `None` on the first zero previous value. A zero current value is
/// allowed and counts as a -100% year.
pub fn average_growth(points: &[PeriodPoint], years: usize, stride: usize) -> Measurement {
    let stride = stride.max(1);
    let needed = years * stride + 1;
    if years == 0 || points.len() < needed {
        return Measurement::new(
            None,
            format!("{} average needs {} periods, have {}", horizon(years), needed, points.len()),
        );
    }

    let mut total = 0.0;
    let mut trail = Vec::with_capacity(years);
    for year in 0..years {
        let current = &points[year * stride];
        let previous = &points[(year + 1) * stride];
        if previous.value == 0.0 || previous.value.is_nan() {
            return Measurement::new(
                None,
                format!("{} previous value is zero", previous.label),
            );
        }
        let growth = (current.value - previous.value) / previous.value;
        total += growth;
        trail.push(format!("{}: {}", current.label, format_percent(growth * 100.0)));
    }

    Measurement::new(
        finite(total / years as f64 * 100.0),
        format!("{} average of {}", horizon(years), trail.join(", ")),
    )
}

/// `line / totalRevenue * 100` for every report, `0` when revenue is absent or zero.
pub fn margin_series(reports: &[FundamentalReport], line_field: &str) -> Vec<PeriodPoint> {
    reports
        .iter()
        .map(|report| {
            let revenue = report.value_or_zero("totalRevenue");
            let margin = if revenue == 0.0 || revenue.is_nan() {
                0.0
            } else {
                finite(report.value_or_zero(line_field) / revenue * 100.0).unwrap_or(0.0)
            };
            PeriodPoint::new(report.period_label(), margin)
        })
        .collect()
}

/// The latest margin. `None` only when there are no reports at all.
pub fn current_margin(margins: &[PeriodPoint]) -> Measurement {
    match margins.first() {
        Some(latest) => Measurement::new(Some(latest.value), format!("{} margin", latest.label)),
        None => Measurement::new(None, "no income statements"),
    }
}

/// Change in margin over `years`, in percentage points.
pub fn margin_change(margins: &[PeriodPoint], years: usize, stride: usize) -> Measurement {
    let back = years * stride.max(1);
    let tag = format!("{} Change", horizon(years));
    let (Some(current), Some(past)) = (margins.first(), margins.get(back)) else {
        return Measurement::new(
            None,
            format!("{}: needs {} periods, have {}", tag, back + 1, margins.len()),
        );
    };

    Measurement::new(
        margin_delta(Some(current.value), Some(past.value)),
        format!(
            "{}: {} ({}) vs {} ({})",
            tag,
            format_percent(current.value),
            current.label,
            format_percent(past.value),
            past.label
        ),
    )
}

/// 1-year growth is a single period-over-period change; longer horizons are averaged.
pub fn growth_over(points: &[PeriodPoint], years: usize, stride: usize) -> Measurement {
    if years == 1 {
        single_period_growth(points, stride)
    } else {
        average_growth(points, years, stride)
    }
}
