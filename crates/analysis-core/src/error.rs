use thiserror::Error;

use crate::MetricId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("API rate limit exceeded for {symbol}")]
    RateLimited { symbol: String, message: String },

    #[error("No data for {symbol}")]
    NoData { symbol: String },

    #[error("Provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error("Metric '{0}' has no history to chart")]
    UnsupportedChart(MetricId),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("API error: {0}")]
    ApiError(String),
}

impl AnalysisError {
    /// Symbol the error is scoped to, for the variants that make the whole bundle unusable.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            AnalysisError::RateLimited { symbol, .. }
            | AnalysisError::NoData { symbol }
            | AnalysisError::Provider { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn is_symbol_fatal(&self) -> bool {
        self.symbol().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_scoped_errors() {
        let err = AnalysisError::RateLimited {
            symbol: "AAPL".to_string(),
            message: "Thank you for using Alpha Vantage!".to_string(),
        };
        assert_eq!(err.symbol(), Some("AAPL"));
        assert!(err.is_symbol_fatal());
        assert_eq!(err.to_string(), "API rate limit exceeded for AAPL");

        let err = AnalysisError::NoData { symbol: "ZZZZ".to_string() };
        assert_eq!(err.to_string(), "No data for ZZZZ");
    }

    #[test]
    fn test_request_errors_are_not_symbol_scoped() {
        let err = AnalysisError::UnsupportedChart(MetricId::PeTtm);
        assert_eq!(err.symbol(), None);
        assert_eq!(err.to_string(), "Metric 'pe_ttm' has no history to chart");
    }
}
