use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

use crate::types::FxError;

/// Strict conversion into `Decimal`, used for configuration values such as rates.
///
/// This lets callers pass `i32`, `f64`, `&str`, etc. directly without wrapping
/// them in `dec!()` or `Decimal::from()`.
pub trait IntoFxDecimal {
    fn into_fx_decimal(self) -> Result<Decimal, FxError>;
}

impl IntoFxDecimal for Decimal {
    fn into_fx_decimal(self) -> Result<Decimal, FxError> {
        Ok(self)
    }
}

macro_rules! impl_into_fx_decimal_int {
    ($($t:ty),*) => {
        $(
            impl IntoFxDecimal for $t {
                fn into_fx_decimal(self) -> Result<Decimal, FxError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_fx_decimal_int!(i32, u32, i64, u64, isize, usize);

impl IntoFxDecimal for f64 {
    fn into_fx_decimal(self) -> Result<Decimal, FxError> {
        Decimal::from_f64(self).ok_or_else(|| FxError::InvalidInput(format!("Invalid float value: {}", self)))
    }
}

impl IntoFxDecimal for f32 {
    fn into_fx_decimal(self) -> Result<Decimal, FxError> {
        Decimal::from_f32(self).ok_or_else(|| FxError::InvalidInput(format!("Invalid float value: {}", self)))
    }
}

impl IntoFxDecimal for &str {
    fn into_fx_decimal(self) -> Result<Decimal, FxError> {
        parse_decimal(self).ok_or_else(|| FxError::InvalidInput(format!("Invalid number format: '{}'", self)))
    }
}

impl IntoFxDecimal for String {
    fn into_fx_decimal(self) -> Result<Decimal, FxError> {
        self.as_str().into_fx_decimal()
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Lenient conversion of a user-entered amount.
///
/// Missing, non-numeric, non-finite or negative input becomes zero instead of
/// failing the conversion. A warning is logged whenever input is replaced.
pub trait IntoFxAmount {
    fn into_fx_amount(self) -> Decimal;
}

/// Clamps a parsed amount to zero when negative.
pub fn normalize_amount(amount: Decimal) -> Decimal {
    if amount.is_sign_negative() && !amount.is_zero() {
        tracing::warn!(%amount, "negative amount normalized to 0");
        Decimal::ZERO
    } else {
        amount
    }
}

impl IntoFxAmount for Decimal {
    fn into_fx_amount(self) -> Decimal {
        normalize_amount(self)
    }
}

macro_rules! impl_into_fx_amount_strict {
    ($($t:ty),*) => {
        $(
            impl IntoFxAmount for $t {
                fn into_fx_amount(self) -> Decimal {
                    match self.into_fx_decimal() {
                        Ok(value) => normalize_amount(value),
                        Err(e) => {
                            tracing::warn!(error = %e, "unusable amount normalized to 0");
                            Decimal::ZERO
                        }
                    }
                }
            }
        )*
    };
}

impl_into_fx_amount_strict!(i32, u32, i64, u64, isize, usize, f32, f64);

/// Longest numeric prefix of `s` (sign, digits, optional fraction, optional
/// exponent), rewritten without a `+` sign or a bare point so `Decimal` can parse it.
/// Returns the canonical text and the number of bytes consumed.
fn leading_number(s: &str) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let negative = bytes.first() == Some(&b'-');
    let int_start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(int_start);
    let (frac_start, frac_end) = if bytes.get(int_end) == Some(&b'.') {
        (int_end + 1, digits_from(int_end + 1))
    } else {
        (int_end, int_end)
    };
    if int_end == int_start && frac_end == frac_start {
        return None;
    }

    let mut canonical = String::new();
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if int_end > int_start { &s[int_start..int_end] } else { "0" });
    if frac_end > frac_start {
        canonical.push('.');
        canonical.push_str(&s[frac_start..frac_end]);
    }
    let mut consumed = frac_end;

    if matches!(bytes.get(consumed), Some(b'e' | b'E')) {
        let exp_negative = bytes.get(consumed + 1) == Some(&b'-');
        let sign_end = consumed + 1 + usize::from(matches!(bytes.get(consumed + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(sign_end);
        if exp_end > sign_end {
            canonical.push_str(if exp_negative { "e-" } else { "e" });
            canonical.push_str(&s[sign_end..exp_end]);
            consumed = exp_end;
        }
    }
    Some((canonical, consumed))
}

/// Reads the leading number of a typed-in amount the way a browser input
/// does: `"12abc"` is 12 and `"1,000"` is 1. Trailing text is ignored.
fn parse_leading_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let (number, consumed) = leading_number(trimmed)?;
    if consumed < trimmed.len() {
        tracing::debug!(input = raw, used = %number, "ignoring trailing text in amount");
    }
    parse_decimal(&number)
}

impl IntoFxAmount for &str {
    fn into_fx_amount(self) -> Decimal {
        match parse_leading_amount(self) {
            Some(value) => normalize_amount(value),
            None => {
                tracing::warn!(input = self, "unparseable amount normalized to 0");
                Decimal::ZERO
            }
        }
    }
}

impl IntoFxAmount for String {
    fn into_fx_amount(self) -> Decimal {
        self.as_str().into_fx_amount()
    }
}

impl<T: IntoFxAmount> IntoFxAmount for Option<T> {
    fn into_fx_amount(self) -> Decimal {
        self.map(IntoFxAmount::into_fx_amount).unwrap_or(Decimal::ZERO)
    }
}
