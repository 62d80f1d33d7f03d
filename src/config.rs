use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::builder::{FxBuilder, Validate};
use crate::rates::RateTable;
use crate::types::{DISPLAY_PRECISION, FxError};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "BIRR_FX_CONFIG";

const MAX_DISPLAY_PRECISION: u32 = 10;

/// Converter configuration: the rate table plus display preferences.
///
/// Every field is optional in JSON. A config without `rates` uses the
/// built-in sample table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxConfig {
    #[serde(default)]
    pub rates: RateTable,
    #[serde(default = "default_display_precision")]
    pub display_precision: u32,
    /// Pre-selected source currency. Defaults to the base currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_from: Option<String>,
    /// Pre-selected target currency. Defaults to the first non-base currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_to: Option<String>,
}

fn default_display_precision() -> u32 {
    DISPLAY_PRECISION
}

impl Default for FxConfig {
    fn default() -> Self {
        FxConfig {
            rates: RateTable::sample(),
            display_precision: DISPLAY_PRECISION,
            default_from: Some("ETB".to_string()),
            default_to: Some("USD".to_string()),
        }
    }
}

impl std::str::FromStr for FxConfig {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: FxConfig = serde_json::from_str(s)
            .map_err(|e| FxError::Configuration(format!("Failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl FxConfig {
    pub fn builder() -> FxConfigBuilder {
        FxConfigBuilder::default()
    }

    pub fn new(rates: RateTable) -> Self {
        Self {
            rates,
            display_precision: DISPLAY_PRECISION,
            default_from: None,
            default_to: None,
        }
    }

    /// Validates the configuration for logical consistency.
    pub fn validate(&self) -> Result<(), FxError> {
        if self.display_precision > MAX_DISPLAY_PRECISION {
            return Err(FxError::Configuration(format!(
                "display_precision must be at most {}, got {}",
                MAX_DISPLAY_PRECISION, self.display_precision
            )));
        }
        for code in [&self.default_from, &self.default_to].into_iter().flatten() {
            self.rates.lookup(code)?;
        }
        Ok(())
    }

    /// Loads the configuration from the file named by `BIRR_FX_CONFIG`.
    pub fn from_env() -> Result<Self, FxError> {
        Self::from_env_var(CONFIG_ENV_VAR)
    }

    /// Loads the configuration from the file named by the given environment variable.
    pub fn from_env_var(name: &str) -> Result<Self, FxError> {
        let path = env::var(name)
            .map_err(|_| FxError::Configuration(format!("{} env var not set", name)))?;
        Self::try_from_json(path)
    }

    /// Attempts to load configuration from a JSON file.
    pub fn try_from_json(path: impl AsRef<Path>) -> Result<Self, FxError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FxError::Configuration(format!("Failed to read config file {}: {}", path.display(), e)))?;

        let config: FxConfig = content.parse()?;
        tracing::info!(path = %path.display(), currencies = config.rates.len(), "loaded fx config");
        Ok(config)
    }

    /// Creates an FxConfig whose rates come from an async provider.
    #[cfg(feature = "async")]
    pub async fn from_provider<P: crate::pricing::RateProvider>(provider: &P) -> Result<Self, FxError> {
        let rates = provider.get_rates().await?;
        Ok(Self::new(rates))
    }

    // ========== Fluent Helper Methods ==========

    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_display_precision(mut self, dp: u32) -> Result<Self, FxError> {
        self.display_precision = dp;
        self.validate()?;
        Ok(self)
    }

    pub fn with_defaults(mut self, from: impl Into<String>, to: impl Into<String>) -> Result<Self, FxError> {
        self.default_from = Some(from.into());
        self.default_to = Some(to.into());
        self.validate()?;
        Ok(self)
    }

    // Getters

    /// The pre-selected source code, falling back to the base currency.
    pub fn get_default_from(&self) -> String {
        self.default_from
            .clone()
            .unwrap_or_else(|| self.rates.base_code().to_string())
    }

    /// The pre-selected target code, falling back to the first non-base currency.
    pub fn get_default_to(&self) -> String {
        self.default_to.clone().unwrap_or_else(|| {
            self.rates
                .board()
                .first()
                .map(|quote| quote.code.to_string())
                .unwrap_or_else(|| self.rates.base_code().to_string())
        })
    }

    /// The `(from, to)` pair a fresh converter view starts with.
    pub fn default_pair(&self) -> (String, String) {
        (self.get_default_from(), self.get_default_to())
    }
}

// ========== FxConfigBuilder ==========

#[derive(Default)]
pub struct FxConfigBuilder {
    rates: Option<RateTable>,
    display_precision: Option<u32>,
    default_from: Option<String>,
    default_to: Option<String>,
}

impl FxConfigBuilder {
    pub fn rates(mut self, rates: RateTable) -> Self {
        self.rates = Some(rates);
        self
    }

    pub fn display_precision(mut self, dp: u32) -> Self {
        self.display_precision = Some(dp);
        self
    }

    pub fn default_from(mut self, code: impl Into<String>) -> Self {
        self.default_from = Some(code.into());
        self
    }

    pub fn default_to(mut self, code: impl Into<String>) -> Self {
        self.default_to = Some(code.into());
        self
    }
}

impl Validate for FxConfigBuilder {
    fn validate(&self) -> Result<(), FxError> {
        if let Some(dp) = self.display_precision.filter(|dp| *dp > MAX_DISPLAY_PRECISION) {
            return Err(FxError::Configuration(format!(
                "display_precision must be at most {}, got {}",
                MAX_DISPLAY_PRECISION, dp
            )));
        }
        Ok(())
    }
}

impl FxBuilder<FxConfig> for FxConfigBuilder {
    fn build(self) -> Result<FxConfig, FxError> {
        Validate::validate(&self)?;

        let config = FxConfig {
            rates: self.rates.unwrap_or_default(),
            display_precision: self.display_precision.unwrap_or(DISPLAY_PRECISION),
            default_from: self.default_from,
            default_to: self.default_to,
        };

        // Unknown default codes are only detectable once the table is known.
        config.validate()?;
        Ok(config)
    }
}
