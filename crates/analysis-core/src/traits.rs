use async_trait::async_trait;
use crate::{AnalysisError, SymbolBundle};

/// Source of fully assembled per-symbol inputs (remote provider, fixture files, ...).
///
/// Implementations resolve provider-side notices into the returned bundle rather than
/// failing, so the aggregator can report them as symbol-scoped errors; `Err` is reserved
/// for transport failures.
#[async_trait]
pub trait BundleSource: Send + Sync {
    async fn fetch_bundle(&self, symbol: &str) -> Result<SymbolBundle, AnalysisError>;
}
