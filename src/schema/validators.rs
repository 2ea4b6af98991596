//! Validator combinators
//!
//! A validator is a pure function from a raw [`Value`] to a normalized
//! [`Value`] or a list of field-scoped errors. Validators compose: `All`
//! chains stages (each receiving the previous stage's output), `Any` accepts
//! the first alternative that succeeds, `List` applies element-wise, and
//! `Nested` descends into a sub-schema. The closed enum keeps every
//! acceptable field shape statically known.

use crate::value::{Ident, Value};

use super::bytes::{ByteSequence, PresetTable};
use super::errors::{index_path, ValidationError};
use super::pins::{PinCapabilities, PinSchema};
use super::types::Schema;

/// A composable field validator.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Accepts a boolean.
    Bool,
    /// Accepts a 64-bit signed integer.
    Int,
    /// Accepts a float; integers are acceptable as floats.
    Float,
    /// Accepts a UTF-8 string.
    Str,
    /// Accepts an integer in `0..=255`.
    Uint8,
    /// Accepts an integer in the inclusive range.
    Range { min: i64, max: i64 },
    /// Accepts an integer from an enumerated set.
    OneOf(Vec<i64>),
    /// Constrains the length of a list or byte sequence.
    Length { min: usize, max: usize },
    /// Applies each validator in sequence; first failure short-circuits.
    All(Vec<Validator>),
    /// Tries alternatives in order; the first success wins. If all fail, the
    /// error is the concatenation of every alternative's errors.
    Any(Vec<Validator>),
    /// Applies the element validator to every list element.
    List(Box<Validator>),
    /// Validates the value as a node under a nested schema.
    Nested(Box<Schema>),
    /// Accepts a reference to another instance's identifier.
    UseId,
    /// Validates a length-prefixed byte sequence, optionally resolving a
    /// preset index first.
    Bytes(ByteSequence),
    /// Validates a pin node against capability requirements.
    Pin(PinSchema),
}

impl Validator {
    /// A byte sequence with no preset table.
    pub fn bytes() -> Self {
        Validator::Bytes(ByteSequence::plain())
    }

    /// A byte sequence resolvable through `table` by integer index.
    pub fn bytes_with_presets(table: PresetTable) -> Self {
        Validator::Bytes(ByteSequence::with_presets(table))
    }

    /// A nested schema validator.
    pub fn nested(schema: Schema) -> Self {
        Validator::Nested(Box::new(schema))
    }

    /// An element-wise list validator.
    pub fn list(element: Validator) -> Self {
        Validator::List(Box::new(element))
    }

    /// A pin validator with the given capability requirements.
    pub fn pin(caps: PinCapabilities) -> Self {
        Validator::Pin(PinSchema::new(caps))
    }

    /// An exact-length constraint.
    pub fn exactly(len: usize) -> Self {
        Validator::Length { min: len, max: len }
    }

    /// Applies the validator to `value` at `path`.
    pub fn apply(&self, value: &Value, path: &str) -> Result<Value, Vec<ValidationError>> {
        match self {
            Validator::Bool => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "bool",
                    other.type_name(),
                )]),
            },
            Validator::Int => match value {
                Value::Int(i) => Ok(Value::Int(*i)),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "int",
                    other.type_name(),
                )]),
            },
            Validator::Float => match value {
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Int(i) => Ok(Value::Int(*i)),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "float",
                    other.type_name(),
                )]),
            },
            Validator::Str => match value {
                Value::Str(s) => Ok(Value::Str(s.clone())),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "string",
                    other.type_name(),
                )]),
            },
            Validator::Uint8 => match value {
                Value::Int(i) if (0..=255).contains(i) => Ok(Value::Int(*i)),
                Value::Int(i) => Err(vec![ValidationError::out_of_range(
                    path,
                    "an integer in 0..=255",
                    i.to_string(),
                )]),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "an integer in 0..=255",
                    other.type_name(),
                )]),
            },
            Validator::Range { min, max } => match value {
                Value::Int(i) if (min..=max).contains(&i) => Ok(Value::Int(*i)),
                Value::Int(i) => Err(vec![ValidationError::out_of_range(
                    path,
                    format!("an integer in {}..={}", min, max),
                    i.to_string(),
                )]),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "int",
                    other.type_name(),
                )]),
            },
            Validator::OneOf(allowed) => match value {
                Value::Int(i) if allowed.contains(i) => Ok(Value::Int(*i)),
                Value::Int(i) => Err(vec![ValidationError::out_of_range(
                    path,
                    format!(
                        "one of {}",
                        allowed
                            .iter()
                            .map(i64::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    i.to_string(),
                )]),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "int",
                    other.type_name(),
                )]),
            },
            Validator::Length { min, max } => {
                let len = match value {
                    Value::List(items) => items.len(),
                    Value::Bytes(bytes) => bytes.len(),
                    other => {
                        return Err(vec![ValidationError::type_mismatch(
                            path,
                            "a list or byte sequence",
                            other.type_name(),
                        )])
                    }
                };
                if len < *min || len > *max {
                    let expected = if min == max {
                        format!("exactly {} entries", min)
                    } else {
                        format!("between {} and {} entries", min, max)
                    };
                    return Err(vec![ValidationError::length_violation(path, expected, len)]);
                }
                Ok(value.clone())
            }
            Validator::All(stages) => {
                let mut current = value.clone();
                for stage in stages {
                    current = stage.apply(&current, path)?;
                }
                Ok(current)
            }
            Validator::Any(alternatives) => {
                let mut collected = Vec::new();
                for alternative in alternatives {
                    match alternative.apply(value, path) {
                        Ok(normalized) => return Ok(normalized),
                        Err(errors) => collected.extend(errors),
                    }
                }
                Err(collected)
            }
            Validator::List(element) => {
                let items = match value {
                    Value::List(items) => items,
                    other => {
                        return Err(vec![ValidationError::type_mismatch(
                            path,
                            "a list",
                            other.type_name(),
                        )])
                    }
                };
                let mut normalized = Vec::with_capacity(items.len());
                let mut errors = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    match element.apply(item, &index_path(path, i)) {
                        Ok(v) => normalized.push(v),
                        Err(es) => errors.extend(es),
                    }
                }
                if errors.is_empty() {
                    Ok(Value::List(normalized))
                } else {
                    Err(errors)
                }
            }
            Validator::Nested(schema) => schema.validate_at(value, path).map(Value::Node),
            Validator::UseId => match value {
                Value::Id(id) => Ok(Value::Id(id.clone())),
                Value::Str(s) => Ok(Value::Id(Ident::new(s.clone()))),
                other => Err(vec![ValidationError::type_mismatch(
                    path,
                    "an identifier",
                    other.type_name(),
                )]),
            },
            Validator::Bytes(sequence) => sequence.apply(value, path),
            Validator::Pin(pin) => pin.apply(value, path),
        }
    }
}
