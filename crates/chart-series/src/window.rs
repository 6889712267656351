use analysis_core::arithmetic::round2;
use analysis_core::SeriesValue;

/// Recompute a metric at every offset of a newest-first history.
///
/// Only the `span` most recent entries are charted. An offset is emitted when at least
/// `lookback` entries remain from it onward, so a full span yields
/// `span - lookback + 1` points. `compute(offset)` sees the history as of that entry.
pub fn rolling<F>(labels: &[String], span: usize, lookback: usize, compute: F) -> Vec<(String, SeriesValue)>
where
    F: Fn(usize) -> Option<f64>,
{
    let available = span.min(labels.len());
    let lookback = lookback.max(1);
    if available < lookback {
        return Vec::new();
    }

    (0..=available - lookback)
        .map(|offset| (labels[offset].clone(), compute(offset).map(round2).into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("d{}", i)).collect()
    }

    #[test]
    fn test_rolling_point_count() {
        let points = rolling(&labels(30), 30, 15, |_| Some(1.0));
        assert_eq!(points.len(), 16);
        assert_eq!(points[0].0, "d0");
        assert_eq!(points[15].0, "d15");
    }

    #[test]
    fn test_rolling_caps_span() {
        let points = rolling(&labels(30), 20, 5, |offset| Some(offset as f64));
        assert_eq!(points.len(), 16);
        assert_eq!(points.last().unwrap().1, SeriesValue::Value(15.0));
    }

    #[test]
    fn test_rolling_rounds_and_marks_missing() {
        let points = rolling(&labels(3), 3, 1, |offset| match offset {
            0 => Some(1.23456),
            1 => None,
            _ => Some(f64::NAN),
        });
        assert_eq!(points[0].1, SeriesValue::Value(1.23));
        assert_eq!(points[1].1, SeriesValue::NotAvailable);
        assert_eq!(points[2].1, SeriesValue::NotAvailable);
    }

    #[test]
    fn test_rolling_short_history() {
        assert!(rolling(&labels(10), 1260, 15, |_| Some(1.0)).is_empty());
    }
}
