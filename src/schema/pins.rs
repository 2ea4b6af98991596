//! Pin sub-schemas
//!
//! A pin is a nested node (`number`, `mode`, `inverted`, `internal`) shared
//! by many descriptor schemas, parameterized by the capabilities the
//! enclosing descriptor requires of it. A descriptor that drives a pin asks
//! for output capability; one that samples asks for input. Required
//! capabilities default on; explicitly disabling one is a validation error.

use crate::value::{Node, Value};

use super::errors::ValidationError;
use super::types::Schema;
use super::validators::Validator;

/// Capabilities a descriptor requires of a pin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinCapabilities {
    /// Pin must support input mode
    pub input: bool,
    /// Pin must support output mode
    pub output: bool,
    /// Pin must be on-chip (no expander-provided pins)
    pub internal: bool,
}

impl PinCapabilities {
    /// A pin that must support output mode.
    pub fn output() -> Self {
        Self {
            output: true,
            ..Self::default()
        }
    }

    /// A pin that must support input mode.
    pub fn input() -> Self {
        Self {
            input: true,
            ..Self::default()
        }
    }

    /// Additionally requires the pin to be on-chip.
    pub fn internal_only(mut self) -> Self {
        self.internal = true;
        self
    }
}

/// A pin validator: nested schema plus capability checks.
#[derive(Debug, Clone)]
pub struct PinSchema {
    caps: PinCapabilities,
    schema: Schema,
}

impl PinSchema {
    /// Builds the pin schema for the given capability requirements.
    ///
    /// Required capabilities become the mode defaults, so a bare
    /// `{number: N}` pin satisfies the descriptor that asked for it.
    pub fn new(caps: PinCapabilities) -> Self {
        let mode_schema = Schema::new("pin_mode")
            .optional_default("input", Validator::Bool, Value::Bool(caps.input))
            .optional_default("output", Validator::Bool, Value::Bool(caps.output));

        let mut default_mode = Node::new();
        default_mode.insert("input", Value::Bool(caps.input));
        default_mode.insert("output", Value::Bool(caps.output));

        let schema = Schema::new("pin")
            .required("number", Validator::Range { min: 0, max: 63 })
            .optional_default(
                "mode",
                Validator::nested(mode_schema),
                Value::Node(default_mode),
            )
            .optional_default("inverted", Validator::Bool, Value::Bool(false))
            .optional_default("internal", Validator::Bool, Value::Bool(caps.internal));

        Self { caps, schema }
    }

    /// Validates a pin node and checks the required capabilities.
    pub(super) fn apply(&self, value: &Value, path: &str) -> Result<Value, Vec<ValidationError>> {
        let node = self.schema.validate_at(value, path)?;

        let mut errors = Vec::new();
        let mode = node.get_node("mode").cloned().unwrap_or_default();
        if self.caps.output && mode.get_bool("output") != Some(true) {
            errors.push(ValidationError::pin_capability(path, "output"));
        }
        if self.caps.input && mode.get_bool("input") != Some(true) {
            errors.push(ValidationError::pin_capability(path, "input"));
        }
        if self.caps.internal && node.get_bool("internal") != Some(true) {
            errors.push(ValidationError::pin_capability(path, "internal"));
        }

        if errors.is_empty() {
            Ok(Value::Node(node))
        } else {
            Err(errors)
        }
    }
}
