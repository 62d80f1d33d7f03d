use crate::rates::RateTable;
use crate::types::{Conversion, FxError};

/// Trait implemented by anything that can be converted against a rate table.
pub trait ConvertCurrency {
    /// Convert using `table`.
    ///
    /// * `Result<Conversion, FxError>`
    fn convert(&self, table: &RateTable) -> Result<Conversion, FxError>;

    /// Returns the label of the request, if any.
    fn get_label(&self) -> Option<String> {
        None
    }
}
