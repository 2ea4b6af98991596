//! Resolution error types
//!
//! Resolution errors are fatal: they abort the pass before any emission
//! task is created.

use thiserror::Error;

/// Errors raised while computing the dependency closure and emission order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A descriptor named by the configuration is not registered.
    #[error("unknown descriptor '{0}'")]
    UnknownDescriptor(String),

    /// An auto-load target of an included descriptor is not registered.
    #[error("descriptor '{requester}' auto-loads unknown descriptor '{name}'")]
    UnknownAutoLoad { requester: String, name: String },

    /// A strict dependency is neither configured nor auto-loaded.
    #[error(
        "descriptor '{requester}' depends on '{missing}', which is not in the \
         configuration and is not auto-loaded"
    )]
    MissingDependency { requester: String, missing: String },

    /// Strict dependencies form a cycle; mutual strict dependency is
    /// unsupported.
    #[error("dependency cycle among descriptors: {}", .participants.join(", "))]
    DependencyCycle { participants: Vec<String> },
}
