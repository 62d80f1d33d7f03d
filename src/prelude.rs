//! Prelude module for birr-fx
//!
//! This module re-exports commonly used structs, traits, and types to allow
//! for easier usage of the library.
//!
//! # Usage
//!
//! ```rust
//! use birr_fx::prelude::*;
//! ```

// Core exports
pub use crate::builder::{FxBuilder, Validate};
pub use crate::config::{FxConfig, FxConfigBuilder};
pub use crate::converter::{ConversionRequest, CurrencyConverter, convert};
pub use crate::currency::{CurrencyCode, CurrencyRate};
pub use crate::inputs::{IntoFxAmount, IntoFxDecimal};
pub use crate::rates::{RateQuote, RateTable, RateTableBuilder};
pub use crate::traits::ConvertCurrency;
pub use crate::types::{Conversion, ConversionPath, ConversionStep, FxError, Operation};

// Rate sources
pub use crate::pricing::StaticRateProvider;
#[cfg(feature = "async")]
pub use crate::pricing::RateProvider;
