pub mod builder;
pub mod config;
pub mod converter;
pub mod currency;
pub mod inputs;
pub mod prelude;
pub mod pricing;
pub mod rates;
pub mod traits;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::FxConfig;
pub use converter::{ConversionRequest, CurrencyConverter, convert};
pub use rates::RateTable;
pub use traits::ConvertCurrency;
pub use types::{Conversion, FxError};
