use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::FxError;

/// A normalized currency identifier such as `ETB` or `USD`.
///
/// Codes are trimmed and uppercased on construction, so `"usd"` and `"USD"`
/// name the same currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, FxError> {
        let normalized = normalize_code(code.as_ref());
        let valid = (2..=8).contains(&normalized.len())
            && normalized.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(FxError::InvalidCode { code: code.as_ref().to_string() });
        }
        Ok(Self(normalized))
    }

    /// Builds a code from a literal known to be valid. Only used for built-in tables.
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(CurrencyCode::new(code).is_ok(), "invalid built-in code {code}");
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw, un-normalized code.
    pub fn matches(&self, raw: &str) -> bool {
        self.0.eq_ignore_ascii_case(raw.trim())
    }
}

pub(crate) fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = FxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// One row of the rate table.
///
/// `rate` is the number of base-currency units equal to one unit of this
/// currency. The base currency itself has rate 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub code: CurrencyCode,
    #[serde(default)]
    pub display_name: String,
    pub rate: Decimal,
    /// Display glyph, e.g. a flag emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl CurrencyRate {
    pub fn new(code: CurrencyCode, display_name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code,
            display_name: display_name.into(),
            rate,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn is_base(&self) -> bool {
        self.rate == Decimal::ONE
    }

    /// Label used in selection lists: `"USD - የአሜሪካ ዶላር"`.
    pub fn option_label(&self) -> String {
        if self.display_name.is_empty() {
            self.code.to_string()
        } else {
            format!("{} - {}", self.code, self.display_name)
        }
    }
}
