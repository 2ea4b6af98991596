//! Emission error types

use thiserror::Error;

use crate::value::Ident;

/// Result type for emission procedures.
pub type EmitResult<T> = Result<T, EmitError>;

/// Errors raised during the emission phase.
///
/// Each error is scoped to one descriptor instance's task: the failing
/// task's statements are rolled back and sibling tasks continue, but the
/// overall pass is considered failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A variable was declared twice for the same identifier.
    #[error("duplicate identifier '{0}': a variable for this id already exists")]
    DuplicateIdent(Ident),

    /// A procedure failed at runtime.
    #[error("{0}")]
    Failed(String),

    /// The task awaited a variable that was never declared; detected at end
    /// of pass.
    #[error("awaited variable '{0}' was never declared")]
    UnresolvedReference(Ident),
}

impl EmitError {
    /// A procedure-level failure with a human-readable reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        EmitError::Failed(reason.into())
    }
}

/// An emission error attributed to the descriptor instance whose task
/// raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("instance '{instance}' of '{descriptor}': {error}")]
pub struct TaskError {
    /// Identifier of the failing instance
    pub instance: Ident,
    /// Descriptor the instance belongs to
    pub descriptor: String,
    /// The underlying error
    pub error: EmitError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_display() {
        let err = TaskError {
            instance: Ident::new("display_0"),
            descriptor: "st7701s".into(),
            error: EmitError::UnresolvedReference(Ident::new("spi_bus")),
        };
        let text = format!("{}", err);
        assert!(text.contains("display_0"));
        assert!(text.contains("st7701s"));
        assert!(text.contains("spi_bus"));
        assert!(text.contains("never declared"));
    }

    #[test]
    fn test_failed_constructor() {
        let err = EmitError::failed("no widget configured");
        assert_eq!(err, EmitError::Failed("no widget configured".into()));
    }
}
