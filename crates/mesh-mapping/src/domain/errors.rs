//! Mapping error types.

use thiserror::Error;

/// SKU mapping errors.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The remote catalog could not be listed at all.
    #[error("remote catalog error: {0}")]
    Remote(String),

    /// The mapping table could not be read or written.
    #[error("storage failure: {0}")]
    Storage(String),
}
