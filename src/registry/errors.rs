//! Registry error types

use thiserror::Error;

/// Errors raised while populating the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Descriptors are registered once and immutable thereafter.
    #[error("descriptor '{0}' is already registered")]
    Duplicate(String),
}
