use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::currency::CurrencyCode;

/// Number of fractional digits used when a conversion is rendered for display.
pub const DISPLAY_PRECISION: u32 = 2;

/// Errors produced by rate table construction and currency conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FxError {
    /// A requested code is not present in the rate table.
    #[error("Unknown currency '{code}'")]
    UnknownCurrency { code: String },
    /// A code could not be used as a currency identifier.
    #[error("Invalid currency code '{code}': expected 2-8 ASCII letters or digits")]
    InvalidCode { code: String },
    #[error("Invalid rate for '{code}': {reason}")]
    InvalidRate { code: String, reason: String },
    #[error("Rate table has no base currency (exactly one entry must have rate 1)")]
    MissingBase,
    #[error("Rate table has more than one base currency: {}", .codes.join(", "))]
    MultipleBase { codes: Vec<String> },
    #[error("Currency '{code}' appears more than once in the rate table")]
    DuplicateCurrency { code: String },
    #[error("Rate table is empty")]
    EmptyTable,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Arithmetic overflow: operation '{operation}' failed")]
    Overflow { operation: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FxError {
    pub fn unknown(code: impl Into<String>) -> Self {
        FxError::UnknownCurrency { code: code.into() }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        FxError::Overflow { operation: operation.into() }
    }

    /// Returns true when the error comes from a lookup rather than from a bad table.
    pub fn is_unknown_currency(&self) -> bool {
        matches!(self, FxError::UnknownCurrency { .. })
    }
}

/// Which of the three conversion formulas was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ConversionPath {
    /// Source is the base currency: `amount / rate(to)`.
    FromBase,
    /// Target is the base currency: `amount * rate(from)`.
    ToBase,
    /// Neither side is the base: `(amount * rate(from)) / rate(to)`.
    Pivot,
}

/// Kind of step recorded in a calculation trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    Initial,
    Multiply,
    Divide,
    Result,
    Info,
}

impl Operation {
    fn symbol(&self) -> &'static str {
        match self {
            Operation::Initial => " ",
            Operation::Multiply => "x",
            Operation::Divide => "/",
            Operation::Result => "=",
            Operation::Info => " ",
        }
    }
}

/// A single step in a conversion, kept so the arithmetic can be shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionStep {
    pub description: String,
    pub amount: Option<Decimal>,
    pub operation: Operation,
}

impl ConversionStep {
    pub fn initial(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount: Some(amount),
            operation: Operation::Initial,
        }
    }

    pub fn multiply(description: impl Into<String>, rate: Decimal) -> Self {
        Self {
            description: description.into(),
            amount: Some(rate),
            operation: Operation::Multiply,
        }
    }

    pub fn divide(description: impl Into<String>, rate: Decimal) -> Self {
        Self {
            description: description.into(),
            amount: Some(rate),
            operation: Operation::Divide,
        }
    }

    pub fn result(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount: Some(amount),
            operation: Operation::Result,
        }
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: None,
            operation: Operation::Info,
        }
    }
}

/// Outcome of converting an amount between two currencies.
///
/// `result` keeps full precision. Use [`Conversion::format_result`] or
/// [`Conversion::summary`] for display, which round to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// The amount after normalization (never negative).
    pub amount: Decimal,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub result: Decimal,
    pub path: ConversionPath,
    /// Optional caller-supplied label (e.g. "Remittance").
    pub label: Option<String>,
    pub calculation_trace: Vec<ConversionStep>,
}

impl Conversion {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Result rounded to two decimal places, e.g. `"1.80"`.
    pub fn format_result(&self) -> String {
        format_decimal(self.result, DISPLAY_PRECISION)
    }

    /// Result rounded to `dp` decimal places.
    pub fn format_result_dp(&self, dp: u32) -> String {
        format_decimal(self.result, dp)
    }

    /// One-line description: `"100.00 ETB = 1.80 USD"`.
    pub fn summary(&self) -> String {
        self.summary_dp(DISPLAY_PRECISION)
    }

    /// Like [`Conversion::summary`], with both amounts rounded to `dp` places.
    pub fn summary_dp(&self, dp: u32) -> String {
        format!(
            "{} {} = {} {}",
            format_decimal(self.amount, dp),
            self.from,
            self.format_result_dp(dp),
            self.to
        )
    }

    /// Renders the calculation trace step by step.
    pub fn explain(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();
        let label = self.label.as_deref().unwrap_or("Conversion");

        let _ = writeln!(output, "Explanation for '{}' ({} -> {}, {}):", label, self.from, self.to, self.path);
        let _ = writeln!(output, "{:-<50}", "");

        let width = self
            .calculation_trace
            .iter()
            .map(|step| step.description.len())
            .max()
            .unwrap_or(20)
            .max(20);

        for step in &self.calculation_trace {
            match (step.operation, step.amount) {
                (Operation::Info, _) | (_, None) => {
                    let _ = writeln!(output, "  INFO: {}", step.description);
                }
                (op, Some(amount)) => {
                    let _ = writeln!(
                        output,
                        "  {:<width$} : {} {:>14} ({})",
                        step.description,
                        op.symbol(),
                        amount.normalize().to_string(),
                        op,
                        width = width
                    );
                }
            }
        }

        let _ = writeln!(output, "{:-<50}", "");
        let _ = writeln!(output, "Result: {}", self.summary());
        output
    }
}

impl std::fmt::Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Rounds half away from zero and always prints `dp` fractional digits.
pub fn format_decimal(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_decimal_pads_and_rounds() {
        assert_eq!(format_decimal(dec!(100), 2), "100.00");
        assert_eq!(format_decimal(dec!(1.8018018), 2), "1.80");
        assert_eq!(format_decimal(dec!(0.005), 2), "0.01");
        assert_eq!(format_decimal(dec!(86.676427), 2), "86.68");
    }

    #[test]
    fn test_summary_follows_precision() {
        let conversion = Conversion {
            amount: dec!(100),
            from: CurrencyCode::from_static("ETB"),
            to: CurrencyCode::from_static("USD"),
            result: dec!(1.8018018018),
            path: ConversionPath::FromBase,
            label: None,
            calculation_trace: Vec::new(),
        };
        assert_eq!(conversion.summary(), "100.00 ETB = 1.80 USD");
        assert_eq!(conversion.summary_dp(4), "100.0000 ETB = 1.8018 USD");
        assert_eq!(conversion.summary_dp(0), "100 ETB = 2 USD");
    }

    #[test]
    fn test_error_messages() {
        let err = FxError::unknown("XYZ");
        assert_eq!(err.to_string(), "Unknown currency 'XYZ'");
        assert!(err.is_unknown_currency());

        let err = FxError::MultipleBase { codes: vec!["ETB".into(), "USD".into()] };
        assert!(err.to_string().contains("ETB, USD"));
    }

    #[test]
    fn test_operation_serializes_camel_case() {
        let step = ConversionStep::multiply("Rate", dec!(55.5));
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains(r#""operation":"multiply""#));
        assert_eq!(ConversionPath::FromBase.to_string(), "fromBase");
    }
}
