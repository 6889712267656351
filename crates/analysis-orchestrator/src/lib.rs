pub mod repository;

pub use repository::MetricsRepository;

use std::collections::BTreeMap;

use analysis_core::{
    AnalysisError, BundleSource, ChartSeries, Granularity, MetricId, MetricsRecord, SymbolBundle,
};
use chart_series::ChartSeriesGenerator;
use fundamental_analysis::FundamentalAnalysisEngine;
use futures_util::future::join_all;
use technical_analysis::TechnicalAnalysisEngine;

/// Most symbols compared side by side in one fetch.
pub const MAX_SYMBOLS: usize = 5;

/// Result of one symbol in a batch. A failure here never affects the other symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub result: Result<MetricsRecord, AnalysisError>,
}

/// Trim, uppercase and drop blank symbols. Fails when nothing is left or more than
/// [`MAX_SYMBOLS`] remain.
pub fn normalize_symbols<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>, AnalysisError> {
    let symbols: Vec<String> = inputs
        .iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(AnalysisError::InvalidData(
            "enter at least one stock symbol".to_string(),
        ));
    }
    if symbols.len() > MAX_SYMBOLS {
        return Err(AnalysisError::InvalidData(format!(
            "at most {} symbols can be compared, got {}",
            MAX_SYMBOLS,
            symbols.len()
        )));
    }
    Ok(symbols)
}

pub struct MetricsOrchestrator {
    fundamental_analyzer: FundamentalAnalysisEngine,
    technical_analyzer: TechnicalAnalysisEngine,
    chart_generator: ChartSeriesGenerator,
}

impl MetricsOrchestrator {
    pub fn new() -> Self {
        Self {
            fundamental_analyzer: FundamentalAnalysisEngine::new(),
            technical_analyzer: TechnicalAnalysisEngine::new(),
            chart_generator: ChartSeriesGenerator::new(),
        }
    }

    /// Build the current metrics record of one symbol.
    ///
    /// An empty or sentinel-carrying overview fails the whole symbol; every other gap only
    /// turns individual metrics into `N/A`.
    pub fn compute(&self, bundle: &SymbolBundle) -> Result<MetricsRecord, AnalysisError> {
        bundle.overview.ensure_usable(&bundle.symbol)?;

        let mut metrics = BTreeMap::new();
        metrics.extend(self.fundamental_analyzer.analyze(bundle));
        metrics.extend(self.technical_analyzer.analyze(&bundle.daily));

        let available = metrics.values().filter(|v| v.is_available()).count();
        tracing::info!(
            "Computed {} metrics for {} ({} available)",
            metrics.len(),
            bundle.symbol,
            available
        );

        Ok(MetricsRecord {
            symbol: bundle.symbol.clone(),
            metrics,
        })
    }

    /// Compute every fetched bundle independently, keeping the input order.
    pub fn compute_batch(
        &self,
        bundles: &[(String, Result<SymbolBundle, AnalysisError>)],
    ) -> Vec<SymbolOutcome> {
        bundles
            .iter()
            .map(|(symbol, bundle)| {
                let result = match bundle {
                    Ok(bundle) => self.compute(bundle),
                    Err(e) => Err(e.clone()),
                };
                if let Err(e) = &result {
                    tracing::warn!("Metrics for {} unavailable: {}", symbol, e);
                }
                SymbolOutcome {
                    symbol: symbol.clone(),
                    result,
                }
            })
            .collect()
    }

    pub fn chart(
        &self,
        bundle: &SymbolBundle,
        metric: MetricId,
        granularity: Granularity,
    ) -> Result<ChartSeries, AnalysisError> {
        self.chart_generator.generate(bundle, metric, granularity)
    }

    /// Start a new fetch cycle: fetch all symbols concurrently, compute their records and
    /// store each usable symbol in `repository`. Outcomes keep the input order.
    pub async fn refresh(
        &self,
        source: &dyn BundleSource,
        symbols: &[String],
        repository: &MetricsRepository,
    ) -> Vec<SymbolOutcome> {
        repository.begin_cycle();
        tracing::info!("Fetching {} symbols", symbols.len());

        let fetches = symbols
            .iter()
            .map(|symbol| async move { (symbol.clone(), source.fetch_bundle(symbol).await) });
        let fetched = join_all(fetches).await;

        let outcomes = self.compute_batch(&fetched);
        for ((_, bundle), outcome) in fetched.into_iter().zip(&outcomes) {
            if let (Ok(bundle), Ok(record)) = (bundle, &outcome.result) {
                repository.insert(bundle, record.clone());
            }
        }
        outcomes
    }
}

impl Default for MetricsOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
