use analysis_core::arithmetic::NOT_AVAILABLE;
use analysis_core::{ChartSeries, MetricId, SeriesValue};
use analysis_orchestrator::SymbolOutcome;
use anyhow::Result;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

fn cell(outcome: &SymbolOutcome, metric: MetricId) -> String {
    match &outcome.result {
        Ok(record) => record.display(metric).to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Comparison table: one row per metric, one column per symbol.
pub fn render_metrics(outcomes: &[SymbolOutcome], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let mut header = vec!["Metric".to_string()];
            header.extend(outcomes.iter().map(|o| o.symbol.clone()));

            let rows: Vec<Vec<String>> = MetricId::ALL
                .iter()
                .map(|&metric| {
                    let mut row = vec![metric.label().to_string()];
                    row.extend(outcomes.iter().map(|o| cell(o, metric)));
                    row
                })
                .collect();
            Ok(render_table(&header, &rows))
        }
        OutputFormat::Json => {
            let entries: Vec<Value> = outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(record) => json!({ "symbol": o.symbol, "metrics": record.metrics }),
                    Err(e) => json!({ "symbol": o.symbol, "error": e.to_string() }),
                })
                .collect();
            Ok(format!("{}\n", serde_json::to_string_pretty(&entries)?))
        }
    }
}

pub fn render_chart(series: &ChartSeries, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let header = vec!["Period".to_string(), series.metric.label().to_string()];
            let rows: Vec<Vec<String>> = series
                .labels
                .iter()
                .zip(&series.values)
                .map(|(label, value)| {
                    let value = match value {
                        SeriesValue::Value(v) => format!("{:.2}", v),
                        SeriesValue::NotAvailable => NOT_AVAILABLE.to_string(),
                    };
                    vec![label.clone(), value]
                })
                .collect();
            Ok(render_table(&header, &rows))
        }
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(series)?)),
    }
}

pub fn render_metric_list() -> String {
    let rows: Vec<Vec<String>> = MetricId::ALL
        .iter()
        .map(|m| vec![m.as_str().to_string(), m.label().to_string()])
        .collect();
    render_table(&["Id".to_string(), "Label".to_string()], &rows)
}
