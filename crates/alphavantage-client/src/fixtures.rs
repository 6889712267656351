use analysis_core::{AnalysisError, BundleSource, ProviderPayloads, SymbolBundle};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Endpoint;

/// Offline source reading saved provider responses from
/// `<root>/<SYMBOL>/{overview,cash_flow,balance_sheet,income_statement,daily}.json`.
///
/// A missing file reads as an empty payload, so a symbol without `overview.json` is
/// reported as having no data.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    root: PathBuf,
}

impl FixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, symbol: &str, endpoint: Endpoint) -> PathBuf {
        self.root
            .join(symbol)
            .join(format!("{}.json", endpoint.file_stem()))
    }

    async fn read_payload(path: &Path) -> Result<Value, AnalysisError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Fixture {} not found", path.display());
                return Ok(Value::Null);
            }
            Err(e) => {
                return Err(AnalysisError::InvalidData(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&text)
            .map_err(|e| AnalysisError::InvalidData(format!("{}: {}", path.display(), e)))
    }

    pub async fn load_payloads(&self, symbol: &str) -> Result<ProviderPayloads, AnalysisError> {
        let mut payloads = ProviderPayloads::default();
        for endpoint in Endpoint::ALL {
            let body = Self::read_payload(&self.path_for(symbol, endpoint)).await?;
            endpoint.assign(&mut payloads, body);
        }
        Ok(payloads)
    }
}

#[async_trait]
impl BundleSource for FixtureSource {
    async fn fetch_bundle(&self, symbol: &str) -> Result<SymbolBundle, AnalysisError> {
        let payloads = self.load_payloads(symbol).await?;
        Ok(SymbolBundle::from_payloads(symbol, &payloads))
    }
}
