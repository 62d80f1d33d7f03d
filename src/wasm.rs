use std::cell::RefCell;

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

use crate::config::FxConfig;
use crate::converter::{ConversionRequest, CurrencyConverter};
use crate::currency::CurrencyRate;
use crate::types::Conversion;

/// Page-wide state: the converter plus the display preferences it was configured with.
struct PageState {
    converter: CurrencyConverter,
    config: FxConfig,
}

impl PageState {
    fn new(config: FxConfig) -> Self {
        Self {
            converter: CurrencyConverter::from_config(&config),
            config,
        }
    }

    fn view(&self, conversion: &Conversion) -> ConversionView {
        ConversionView::new(conversion, self.config.display_precision)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(FxConfig::default())
    }
}

thread_local! {
    static STATE: RefCell<PageState> = RefCell::new(PageState::default());
}

/// What the page renders after each conversion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionView {
    result: f64,
    formatted: String,
    summary: String,
}

impl ConversionView {
    fn new(conversion: &Conversion, dp: u32) -> Self {
        Self {
            result: conversion.result.to_f64().unwrap_or_default(),
            formatted: conversion.format_result_dp(dp),
            summary: conversion.summary_dp(dp),
        }
    }
}

/// Codes the selection boxes start on.
#[derive(Debug, Serialize)]
struct DefaultPair {
    from: String,
    to: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyOption {
    code: String,
    label: String,
    symbol: Option<String>,
    rate: f64,
}

impl From<&CurrencyRate> for CurrencyOption {
    fn from(entry: &CurrencyRate) -> Self {
        Self {
            code: entry.code.to_string(),
            label: entry.option_label(),
            symbol: entry.symbol.clone(),
            rate: entry.rate.to_f64().unwrap_or_default(),
        }
    }
}

/// Initialize hooks for better debugging in WASM
#[wasm_bindgen]
pub fn init_hooks() {
    console_error_panic_hook::set_once();
}

/// Replaces the rate table and display preferences with an `FxConfig` object.
///
/// Call once at page load; without it the built-in sample table is used.
#[wasm_bindgen]
pub fn configure(config_json: JsValue) -> Result<(), JsError> {
    let config: FxConfig = from_value(config_json)
        .map_err(|e| JsError::new(&format!("Invalid Config JSON: {}", e)))?;
    config
        .validate()
        .map_err(|e| JsError::new(&e.to_string()))?;
    STATE.with(|state| *state.borrow_mut() = PageState::new(config));
    Ok(())
}

/// Returns `{ from, to }`, the codes to pre-select in the two selection boxes.
#[wasm_bindgen]
pub fn default_pair() -> Result<JsValue, JsError> {
    let (from, to) = STATE.with(|state| state.borrow().config.default_pair());
    to_value(&DefaultPair { from, to }).map_err(|e| JsError::new(&format!("Serialization Error: {}", e)))
}

/// Reads the amount the way the input box provides it: number, numeric string, or nothing.
fn request_from(amount: &JsValue, from: &str, to: &str) -> ConversionRequest {
    match (amount.as_f64(), amount.as_string()) {
        (Some(number), _) => ConversionRequest::new(number, from, to),
        (None, Some(text)) => ConversionRequest::new(text, from, to),
        (None, None) => ConversionRequest::new(None::<f64>, from, to),
    }
}

/// Converts `amount` and returns `{ result, formatted, summary }`, rounded to the configured precision.
#[wasm_bindgen]
pub fn convert(amount: JsValue, from: &str, to: &str) -> Result<JsValue, JsError> {
    let request = request_from(&amount, from, to);
    let view = STATE
        .with(|state| {
            let state = state.borrow();
            state.converter.convert_request(&request).map(|c| state.view(&c))
        })
        .map_err(|e| JsError::new(&e.to_string()))?;

    to_value(&view).map_err(|e| JsError::new(&format!("Serialization Error: {}", e)))
}

/// Converts with `from` and `to` exchanged, as the swap button does.
#[wasm_bindgen]
pub fn swap_and_convert(amount: JsValue, from: &str, to: &str) -> Result<JsValue, JsError> {
    let request = request_from(&amount, from, to);
    let view = STATE
        .with(|state| {
            let state = state.borrow();
            state.converter.swap_and_convert(&request).map(|c| state.view(&c))
        })
        .map_err(|e| JsError::new(&e.to_string()))?;

    to_value(&view).map_err(|e| JsError::new(&format!("Serialization Error: {}", e)))
}

/// Lists every currency for the selection boxes, in table order.
#[wasm_bindgen]
pub fn list_currencies() -> Result<JsValue, JsError> {
    let options: Vec<CurrencyOption> =
        STATE.with(|state| state.borrow().converter.table().iter().map(CurrencyOption::from).collect());

    to_value(&options).map_err(|e| JsError::new(&format!("Serialization Error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTable;

    #[test]
    fn test_view_uses_configured_precision() {
        let config = FxConfig::new(RateTable::sample())
            .with_display_precision(4)
            .unwrap()
            .with_defaults("EUR", "GBP")
            .unwrap();
        let state = PageState::new(config);

        let conversion = state.converter.convert(100, "ETB", "USD").unwrap();
        let view = state.view(&conversion);
        assert_eq!(view.formatted, "1.8018");
        assert_eq!(view.summary, "100.0000 ETB = 1.8018 USD");
        assert_eq!(state.config.default_pair(), ("EUR".to_string(), "GBP".to_string()));
    }

    #[test]
    fn test_default_state_uses_two_places() {
        let state = PageState::default();
        let conversion = state.converter.convert(100, "ETB", "USD").unwrap();
        assert_eq!(state.view(&conversion).summary, "100.00 ETB = 1.80 USD");
        assert_eq!(state.config.default_pair(), ("ETB".to_string(), "USD".to_string()));
    }
}
