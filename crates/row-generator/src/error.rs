//! Error type for generator construction.

use culvert_core::ConfigError;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Invalid column definition
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Lookup tables need at least one entry
    #[error("Lookup table size must be greater than zero")]
    EmptyLookupTable,
}
