//! Sources for the rate table.
//!
//! Rates are loaded once at startup and then frozen inside a [`RateTable`].
//! The `RateProvider` trait lets that startup step be async, so a table can
//! come from a file, a database or any other collaborator without touching
//! the conversion core.

use crate::rates::RateTable;
#[cfg(feature = "async")]
use crate::types::FxError;

/// Trait for loading the rate table.
///
/// # Example
/// ```ignore
/// use birr_fx::pricing::{RateProvider, StaticRateProvider};
///
/// let provider = StaticRateProvider::sample();
/// let table = provider.get_rates().await?;
/// ```
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait RateProvider {
    /// Returns `Err(FxError)` if the table cannot be produced or is invalid.
    async fn get_rates(&self) -> Result<RateTable, FxError>;
}

/// A provider that hands out a fixed table. Useful for tests and for the
/// built-in sample rates.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    table: RateTable,
}

impl StaticRateProvider {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    pub fn sample() -> Self {
        Self::new(RateTable::sample())
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl RateProvider for StaticRateProvider {
    async fn get_rates(&self) -> Result<RateTable, FxError> {
        Ok(self.table.clone())
    }
}

/// Reads a JSON rate table (an array of `{code, display_name, rate, symbol}`) from disk.
#[cfg(all(feature = "async", not(target_arch = "wasm32")))]
#[derive(Debug, Clone)]
pub struct JsonFileRateProvider {
    path: std::path::PathBuf,
}

#[cfg(all(feature = "async", not(target_arch = "wasm32")))]
impl JsonFileRateProvider {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(all(feature = "async", not(target_arch = "wasm32")))]
#[async_trait::async_trait]
impl RateProvider for JsonFileRateProvider {
    async fn get_rates(&self) -> Result<RateTable, FxError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FxError::Configuration(format!("Failed to read rate file {}: {}", self.path.display(), e))
        })?;
        let table: RateTable = content.parse()?;
        tracing::info!(path = %self.path.display(), currencies = table.len(), "loaded rate table");
        Ok(table)
    }
}
