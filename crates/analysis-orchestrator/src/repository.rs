use analysis_core::{MetricsRecord, SymbolBundle};
use dashmap::DashMap;

struct StoredSymbol {
    bundle: SymbolBundle,
    record: MetricsRecord,
}

/// Caller-owned store of the current fetch cycle, keyed by symbol.
///
/// Concurrent fetch tasks insert into it; [`MetricsRepository::begin_cycle`] drops the
/// previous cycle wholesale.
#[derive(Default)]
pub struct MetricsRepository {
    entries: DashMap<String, StoredSymbol>,
}

impl MetricsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_cycle(&self) {
        self.entries.clear();
    }

    pub fn insert(&self, bundle: SymbolBundle, record: MetricsRecord) {
        self.entries
            .insert(bundle.symbol.clone(), StoredSymbol { bundle, record });
    }

    pub fn record(&self, symbol: &str) -> Option<MetricsRecord> {
        self.entries.get(symbol).map(|entry| entry.record.clone())
    }

    /// Raw inputs kept for chart recomputation.
    pub fn bundle(&self, symbol: &str) -> Option<SymbolBundle> {
        self.entries.get(symbol).map(|entry| entry.bundle.clone())
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
