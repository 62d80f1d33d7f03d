//! Currency conversion through the base currency.
//!
//! Rates are "base units per unit of currency", so there are three cases:
//!
//! | from  | to    | result                                 |
//! |-------|-------|----------------------------------------|
//! | base  | any   | `amount / rate(to)`                    |
//! | any   | base  | `amount * rate(from)`                  |
//! | other | other | `(amount * rate(from)) / rate(to)`     |
//!
//! The returned value keeps full `Decimal` precision; rounding only happens
//! when a [`Conversion`] is formatted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::FxConfig;
use crate::currency::CurrencyRate;
use crate::inputs::{IntoFxAmount, normalize_amount};
use crate::rates::RateTable;
use crate::traits::ConvertCurrency;
use crate::types::{Conversion, ConversionPath, ConversionStep, FxError};

/// Converts `amount` from `from` to `to` and returns the full-precision result.
///
/// ```rust
/// use birr_fx::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let table = RateTable::sample();
/// let birr = convert(100, "USD", "ETB", &table).unwrap();
/// assert_eq!(birr, dec!(5550));
/// ```
pub fn convert(amount: impl IntoFxAmount, from: &str, to: &str, table: &RateTable) -> Result<Decimal, FxError> {
    ConversionRequest::new(amount, from, to).convert(table).map(|c| c.result)
}

/// An amount and a pair of currency codes.
///
/// Codes are kept as given; they are resolved against a table only when the
/// request is converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    #[serde(default)]
    pub amount: Decimal,
    pub from_code: String,
    pub to_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConversionRequest {
    pub fn new(amount: impl IntoFxAmount, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            amount: amount.into_fx_amount(),
            from_code: from.into(),
            to_code: to.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn amount(mut self, amount: impl IntoFxAmount) -> Self {
        self.amount = amount.into_fx_amount();
        self
    }

    /// The same request with source and target exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            amount: self.amount,
            from_code: self.to_code.clone(),
            to_code: self.from_code.clone(),
            label: self.label.clone(),
        }
    }
}

impl ConvertCurrency for ConversionRequest {
    fn convert(&self, table: &RateTable) -> Result<Conversion, FxError> {
        let from = table.lookup(&self.from_code)?;
        let to = table.lookup(&self.to_code)?;
        let amount = normalize_amount(self.amount);

        let (result, path, calculation_trace) = apply_rates(amount, from, to, table)?;

        tracing::debug!(
            %amount,
            from = %from.code,
            to = %to.code,
            %path,
            %result,
            "converted"
        );

        Ok(Conversion {
            amount,
            from: from.code.clone(),
            to: to.code.clone(),
            result,
            path,
            label: self.label.clone(),
            calculation_trace,
        })
    }

    fn get_label(&self) -> Option<String> {
        self.label.clone()
    }
}

fn apply_rates(
    amount: Decimal,
    from: &CurrencyRate,
    to: &CurrencyRate,
    table: &RateTable,
) -> Result<(Decimal, ConversionPath, Vec<ConversionStep>), FxError> {
    let base = table.base_code();
    let mut trace = vec![ConversionStep::initial(format!("Amount ({})", from.code), amount)];

    let (result, path) = if table.is_base(from.code.as_str()) {
        let result = amount.checked_div(to.rate).ok_or_else(|| FxError::overflow("divide"))?;
        trace.push(ConversionStep::divide(format!("{} per {}", base, to.code), to.rate));
        (result, ConversionPath::FromBase)
    } else if table.is_base(to.code.as_str()) {
        let result = amount.checked_mul(from.rate).ok_or_else(|| FxError::overflow("multiply"))?;
        trace.push(ConversionStep::multiply(format!("{} per {}", base, from.code), from.rate));
        (result, ConversionPath::ToBase)
    } else {
        let in_base = amount.checked_mul(from.rate).ok_or_else(|| FxError::overflow("multiply"))?;
        trace.push(ConversionStep::multiply(format!("{} per {}", base, from.code), from.rate));
        trace.push(ConversionStep::result(format!("Amount in base ({})", base), in_base));
        let result = in_base.checked_div(to.rate).ok_or_else(|| FxError::overflow("divide"))?;
        trace.push(ConversionStep::divide(format!("{} per {}", base, to.code), to.rate));
        (result, ConversionPath::Pivot)
    };

    trace.push(ConversionStep::result(format!("Converted ({})", to.code), result));
    Ok((result, path, trace))
}

/// A converter bound to one rate table.
///
/// Holds no state besides the table, so it can be shared freely between
/// threads and every call is independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyConverter {
    table: RateTable,
}

impl CurrencyConverter {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    pub fn from_config(config: &FxConfig) -> Self {
        Self::new(config.rates.clone())
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn convert(&self, amount: impl IntoFxAmount, from: &str, to: &str) -> Result<Conversion, FxError> {
        ConversionRequest::new(amount, from, to).convert(&self.table)
    }

    pub fn convert_request(&self, request: &impl ConvertCurrency) -> Result<Conversion, FxError> {
        request.convert(&self.table).map(|conversion| match request.get_label() {
            Some(label) if conversion.label.is_none() => conversion.with_label(label),
            _ => conversion,
        })
    }

    /// Converts `request` with its source and target exchanged.
    pub fn swap_and_convert(&self, request: &ConversionRequest) -> Result<Conversion, FxError> {
        self.convert_request(&request.swapped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_three_paths() {
        let table = RateTable::sample();

        let from_base = ConversionRequest::new(100, "ETB", "USD").convert(&table).unwrap();
        assert_eq!(from_base.path, ConversionPath::FromBase);

        let to_base = ConversionRequest::new(100, "USD", "ETB").convert(&table).unwrap();
        assert_eq!(to_base.path, ConversionPath::ToBase);
        assert_eq!(to_base.result, dec!(5550));

        let pivot = ConversionRequest::new(100, "EUR", "GBP").convert(&table).unwrap();
        assert_eq!(pivot.path, ConversionPath::Pivot);
        assert_eq!(pivot.format_result(), "86.68");
    }

    #[test]
    fn test_pivot_trace_shows_base_amount() {
        let table = RateTable::sample();
        let pivot = ConversionRequest::new(100, "EUR", "GBP").convert(&table).unwrap();
        assert!(pivot
            .calculation_trace
            .iter()
            .any(|step| step.amount == Some(dec!(5920)) && step.description.contains("base")));
        assert!(pivot.explain().contains("Result: 100.00 EUR = 86.68 GBP"));
    }

    #[test]
    fn test_negative_amount_in_deserialized_request_is_clamped() {
        let table = RateTable::sample();
        let request: ConversionRequest =
            serde_json::from_str(r#"{"amount": -20, "fromCode": "USD", "toCode": "ETB"}"#).unwrap();
        let conversion = request.convert(&table).unwrap();
        assert_eq!(conversion.amount, Decimal::ZERO);
        assert_eq!(conversion.result, Decimal::ZERO);
    }

    #[test]
    fn test_missing_amount_defaults_to_zero() {
        let request: ConversionRequest = serde_json::from_str(r#"{"fromCode": "ETB", "toCode": "USD"}"#).unwrap();
        assert_eq!(request.amount, Decimal::ZERO);
    }

    #[test]
    fn test_converter_keeps_request_label() {
        let converter = CurrencyConverter::default();
        let request = ConversionRequest::new(10, "USD", "EUR").with_label("Remittance");
        let conversion = converter.convert_request(&request).unwrap();
        assert_eq!(conversion.label.as_deref(), Some("Remittance"));
    }
}
