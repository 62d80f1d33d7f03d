//! The immutable exchange rate table.
//!
//! Every rate is stored as "units of base currency per one unit of this
//! currency". Exactly one entry has rate 1 and is the base. A table is
//! validated once when it is built or deserialized and is never mutated
//! afterwards.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::builder::{FxBuilder, Validate};
use crate::currency::{CurrencyCode, CurrencyRate};
use crate::inputs::IntoFxDecimal;
use crate::types::{FxError, format_decimal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurrencyRate>", into = "Vec<CurrencyRate>")]
pub struct RateTable {
    entries: Vec<CurrencyRate>,
    base: usize,
}

impl RateTable {
    pub fn builder() -> RateTableBuilder {
        RateTableBuilder::default()
    }

    /// Validates `entries` and returns the table, keeping the given order.
    pub fn from_entries(entries: Vec<CurrencyRate>) -> Result<Self, FxError> {
        let base = validate_entries(&entries)?;
        Ok(Self { entries, base })
    }

    /// The sample table shipped with the portal: Ethiopian Birr as base.
    pub fn sample() -> Self {
        let row = |code: &'static str, name: &str, rate: Decimal, flag: &str| {
            CurrencyRate::new(CurrencyCode::from_static(code), name, rate).with_symbol(flag)
        };
        Self {
            entries: vec![
                row("ETB", "ኢትዮጵያ ብር", dec!(1), "🇪🇹"),
                row("USD", "የአሜሪካ ዶላር", dec!(55.5), "🇺🇸"),
                row("EUR", "ዩሮ", dec!(59.2), "🇪🇺"),
                row("GBP", "የብሪታንያ ፓውንድ", dec!(68.3), "🇬🇧"),
                row("CAD", "የካናዳ ዶላር", dec!(40.1), "🇨🇦"),
                row("AED", "የአረብ ድርሀም", dec!(15.1), "🇦🇪"),
                row("CNY", "የቻይና ዩዋን", dec!(7.6), "🇨🇳"),
            ],
            base: 0,
        }
    }

    pub fn base(&self) -> &CurrencyRate {
        &self.entries[self.base]
    }

    pub fn base_code(&self) -> &CurrencyCode {
        &self.base().code
    }

    /// Looks up a currency by code, ignoring case and surrounding whitespace.
    pub fn get(&self, code: &str) -> Option<&CurrencyRate> {
        self.entries.iter().find(|entry| entry.code.matches(code))
    }

    /// Like [`RateTable::get`], but an absent code is an `UnknownCurrency` error.
    pub fn lookup(&self, code: &str) -> Result<&CurrencyRate, FxError> {
        self.get(code).ok_or_else(|| FxError::unknown(code.trim()))
    }

    pub fn rate_of(&self, code: &str) -> Result<Decimal, FxError> {
        self.lookup(code).map(|entry| entry.rate)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn is_base(&self, code: &str) -> bool {
        self.base().code.matches(code)
    }

    /// Entries in table order, which is the order selection lists show them.
    pub fn iter(&self) -> impl Iterator<Item = &CurrencyRate> {
        self.entries.iter()
    }

    pub fn codes(&self) -> Vec<&CurrencyCode> {
        self.entries.iter().map(|entry| &entry.code).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quotes for every non-base currency, in table order.
    pub fn board(&self) -> Vec<RateQuote> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.base)
            .map(|(_, entry)| RateQuote {
                code: entry.code.clone(),
                display_name: entry.display_name.clone(),
                symbol: entry.symbol.clone(),
                rate: entry.rate,
                base: self.base_code().clone(),
            })
            .collect()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::sample()
    }
}

impl TryFrom<Vec<CurrencyRate>> for RateTable {
    type Error = FxError;

    fn try_from(entries: Vec<CurrencyRate>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<RateTable> for Vec<CurrencyRate> {
    fn from(table: RateTable) -> Self {
        table.entries
    }
}

impl std::str::FromStr for RateTable {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| FxError::Configuration(format!("Failed to parse rate table JSON: {}", e)))
    }
}

impl<'a> IntoIterator for &'a RateTable {
    type Item = &'a CurrencyRate;
    type IntoIter = std::slice::Iter<'a, CurrencyRate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Checks the table invariants and returns the index of the base entry.
fn validate_entries(entries: &[CurrencyRate]) -> Result<usize, FxError> {
    if entries.is_empty() {
        return Err(FxError::EmptyTable);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.code.as_str()) {
            return Err(FxError::DuplicateCurrency { code: entry.code.to_string() });
        }
        if entry.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                code: entry.code.to_string(),
                reason: format!("rate must be positive, got {}", entry.rate),
            });
        }
    }

    let bases: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_base())
        .map(|(idx, _)| idx)
        .collect();

    match bases.as_slice() {
        [] => Err(FxError::MissingBase),
        [only] => Ok(*only),
        many => Err(FxError::MultipleBase {
            codes: many.iter().map(|idx| entries[*idx].code.to_string()).collect(),
        }),
    }
}

/// A non-base currency as shown on the rates board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub code: CurrencyCode,
    pub display_name: String,
    pub symbol: Option<String>,
    /// Base units per one unit of `code`.
    pub rate: Decimal,
    pub base: CurrencyCode,
}

impl RateQuote {
    /// `"55.50 ETB"`
    pub fn format_rate(&self) -> String {
        format!("{} {}", format_decimal(self.rate, 2), self.base)
    }
}

// ========== RateTableBuilder ==========

#[derive(Debug, Default)]
pub struct RateTableBuilder {
    entries: Vec<CurrencyRate>,
    error: Option<FxError>,
}

impl RateTableBuilder {
    /// Adds a currency. Conversion problems are reported by `build()`.
    pub fn rate(self, code: &str, display_name: impl Into<String>, rate: impl IntoFxDecimal) -> Self {
        self.push(code, display_name.into(), rate, None)
    }

    pub fn rate_with_symbol(
        self,
        code: &str,
        display_name: impl Into<String>,
        rate: impl IntoFxDecimal,
        symbol: impl Into<String>,
    ) -> Self {
        self.push(code, display_name.into(), rate, Some(symbol.into()))
    }

    /// Adds an already constructed entry.
    pub fn entry(mut self, entry: CurrencyRate) -> Self {
        self.entries.push(entry);
        self
    }

    fn push(mut self, code: &str, display_name: String, rate: impl IntoFxDecimal, symbol: Option<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let parsed = CurrencyCode::new(code).and_then(|code| {
            let rate = rate.into_fx_decimal().map_err(|e| FxError::InvalidRate {
                code: code.to_string(),
                reason: e.to_string(),
            })?;
            Ok(CurrencyRate { code, display_name, rate, symbol })
        });
        match parsed {
            Ok(entry) => self.entries.push(entry),
            Err(e) => self.error = Some(e),
        }
        self
    }
}

impl Validate for RateTableBuilder {
    fn validate(&self) -> Result<(), FxError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        validate_entries(&self.entries).map(|_| ())
    }
}

impl FxBuilder<RateTable> for RateTableBuilder {
    fn build(self) -> Result<RateTable, FxError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let table = RateTable::from_entries(self.entries)?;
        tracing::debug!(currencies = table.len(), base = %table.base_code(), "rate table built");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_table_is_valid() {
        let sample = RateTable::sample();
        let revalidated = RateTable::from_entries(sample.iter().cloned().collect()).unwrap();
        assert_eq!(revalidated, sample);
        assert_eq!(sample.base_code().as_str(), "ETB");
        assert_eq!(sample.len(), 7);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = RateTable::sample();
        assert_eq!(table.rate_of("usd").unwrap(), dec!(55.5));
        assert!(table.is_base(" etb "));
        assert!(matches!(table.lookup("XYZ"), Err(FxError::UnknownCurrency { code }) if code == "XYZ"));
    }

    #[test]
    fn test_board_skips_base() {
        let board = RateTable::sample().board();
        assert_eq!(board.len(), 6);
        assert_eq!(board[0].code.as_str(), "USD");
        assert_eq!(board[0].format_rate(), "55.50 ETB");
        assert!(board.iter().all(|quote| quote.code.as_str() != "ETB"));
    }

    #[test]
    fn test_builder_reports_first_error() {
        let res = RateTable::builder()
            .rate("ETB", "Birr", 1)
            .rate("U$D", "Dollar", 55.5)
            .rate("EUR", "Euro", "not-a-number")
            .build();
        assert!(matches!(res, Err(FxError::InvalidCode { .. })));

        let res = RateTable::builder()
            .rate("ETB", "Birr", 1)
            .rate("EUR", "Euro", "not-a-number")
            .build();
        assert!(matches!(res, Err(FxError::InvalidRate { code, .. }) if code == "EUR"));
    }

    #[test]
    fn test_validate_matches_build() {
        let builder = RateTable::builder().rate("ETB", "Birr", 1).rate("USD", "Dollar", 1);
        assert!(matches!(builder.validate(), Err(FxError::MultipleBase { .. })));
    }
}
