use crate::types::FxError;

/// Trait for builders that produce a validated rate table or configuration.
pub trait FxBuilder<T> {
    /// Builds the final object, returning a Result.
    fn build(self) -> Result<T, FxError>;
}

/// Trait for early validation of builder state before construction.
pub trait Validate {
    fn validate(&self) -> Result<(), FxError>;
}
