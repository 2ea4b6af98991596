//! Validation error types
//!
//! Error codes:
//! - WIRE_FIELD_MISSING
//! - WIRE_UNKNOWN_FIELD
//! - WIRE_TYPE_MISMATCH
//! - WIRE_VALUE_OUT_OF_RANGE
//! - WIRE_EXCLUSIVE_CONFLICT
//! - WIRE_LENGTH_VIOLATION
//! - WIRE_MALFORMED_BYTE_SEQUENCE
//! - WIRE_UNKNOWN_PRESET
//! - WIRE_PIN_CAPABILITY
//!
//! Validation never stops at the first problem: errors are collected across
//! the whole node (and across the whole document by the pass driver) so a
//! user sees every problem in one run. Each error is scoped to a field path
//! like `display.data_pins[3].number`.

use std::fmt;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    /// Required field absent
    FieldMissing,
    /// Field not declared by the schema
    UnknownField,
    /// Value has the wrong shape
    TypeMismatch,
    /// Integer outside the allowed range or enumeration
    OutOfRange,
    /// More than one member of an exclusive group present
    ExclusiveConflict,
    /// List or byte sequence length constraint violated
    LengthViolation,
    /// Byte sequence record structure inconsistent
    MalformedByteSequence,
    /// Preset index not in the preset table
    UnknownPreset,
    /// Pin does not support a required capability
    PinCapability,
}

impl ValidationCode {
    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationCode::FieldMissing => "WIRE_FIELD_MISSING",
            ValidationCode::UnknownField => "WIRE_UNKNOWN_FIELD",
            ValidationCode::TypeMismatch => "WIRE_TYPE_MISMATCH",
            ValidationCode::OutOfRange => "WIRE_VALUE_OUT_OF_RANGE",
            ValidationCode::ExclusiveConflict => "WIRE_EXCLUSIVE_CONFLICT",
            ValidationCode::LengthViolation => "WIRE_LENGTH_VIOLATION",
            ValidationCode::MalformedByteSequence => "WIRE_MALFORMED_BYTE_SEQUENCE",
            ValidationCode::UnknownPreset => "WIRE_UNKNOWN_PRESET",
            ValidationCode::PinCapability => "WIRE_PIN_CAPABILITY",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A field-scoped validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    code: ValidationCode,
    /// Field path, e.g. "display.data_pins[3]"
    path: String,
    /// Expected type or condition
    expected: String,
    /// Actual value or type found
    actual: String,
    /// Byte offset of the offending record, for byte-sequence errors
    offset: Option<usize>,
}

impl ValidationError {
    /// Required field absent.
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self {
            code: ValidationCode::FieldMissing,
            path: path.into(),
            expected: "field to be present".into(),
            actual: "missing".into(),
            offset: None,
        }
    }

    /// Field not declared by the schema.
    pub fn unknown_field(path: impl Into<String>) -> Self {
        Self {
            code: ValidationCode::UnknownField,
            path: path.into(),
            expected: "no undeclared fields".into(),
            actual: "unknown field present".into(),
            offset: None,
        }
    }

    /// Value has the wrong shape.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            code: ValidationCode::TypeMismatch,
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
            offset: None,
        }
    }

    /// Integer outside the allowed range or enumeration.
    pub fn out_of_range(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            code: ValidationCode::OutOfRange,
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
            offset: None,
        }
    }

    /// More than one member of an exclusive group present. Names every
    /// offending key, not just the second one seen.
    pub fn exclusive_conflict(path: impl Into<String>, group: &str, keys: &[String]) -> Self {
        Self {
            code: ValidationCode::ExclusiveConflict,
            path: path.into(),
            expected: format!("at most one member of group '{}'", group),
            actual: format!("multiple present: {}", keys.join(", ")),
            offset: None,
        }
    }

    /// List or byte-sequence length constraint violated.
    pub fn length_violation(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual_len: usize,
    ) -> Self {
        Self {
            code: ValidationCode::LengthViolation,
            path: path.into(),
            expected: expected.into(),
            actual: format!("{} entries", actual_len),
            offset: None,
        }
    }

    /// Byte sequence record structure inconsistent at `offset`.
    pub fn malformed_byte_sequence(path: impl Into<String>, offset: usize) -> Self {
        Self {
            code: ValidationCode::MalformedByteSequence,
            path: path.into(),
            expected: "consistent [tag, length, payload] records".into(),
            actual: format!("record overruns the sequence at offset {}", offset),
            offset: Some(offset),
        }
    }

    /// Preset index not in the preset table.
    pub fn unknown_preset(path: impl Into<String>, table: &str, index: i64) -> Self {
        Self {
            code: ValidationCode::UnknownPreset,
            path: path.into(),
            expected: format!("an index into preset table '{}'", table),
            actual: format!("index {}", index),
            offset: None,
        }
    }

    /// Pin does not support a required capability.
    pub fn pin_capability(path: impl Into<String>, capability: &str) -> Self {
        Self {
            code: ValidationCode::PinCapability,
            path: path.into(),
            expected: format!("pin supporting {} mode", capability),
            actual: format!("{} mode disabled", capability),
            offset: None,
        }
    }

    /// Returns the error code.
    pub fn code(&self) -> ValidationCode {
        self.code
    }

    /// Returns the field path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the expected condition.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Returns the actual value or type found.
    pub fn actual(&self) -> &str {
        &self.actual
    }

    /// Returns the byte offset for byte-sequence errors.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] field '{}': expected {}, got {}",
            self.code.code(),
            self.path,
            self.expected,
            self.actual
        )
    }
}

impl std::error::Error for ValidationError {}

/// Creates a field path from a prefix and a field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Creates a field path for a list element.
pub(crate) fn index_path(prefix: &str, index: usize) -> String {
    format!("{}[{}]", prefix, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ValidationCode::FieldMissing.code(), "WIRE_FIELD_MISSING");
        assert_eq!(ValidationCode::UnknownField.code(), "WIRE_UNKNOWN_FIELD");
        assert_eq!(ValidationCode::TypeMismatch.code(), "WIRE_TYPE_MISMATCH");
        assert_eq!(ValidationCode::OutOfRange.code(), "WIRE_VALUE_OUT_OF_RANGE");
        assert_eq!(
            ValidationCode::ExclusiveConflict.code(),
            "WIRE_EXCLUSIVE_CONFLICT"
        );
        assert_eq!(
            ValidationCode::MalformedByteSequence.code(),
            "WIRE_MALFORMED_BYTE_SEQUENCE"
        );
    }

    #[test]
    fn test_display_includes_path_and_details() {
        let err = ValidationError::type_mismatch("display.width", "int", "string");
        let text = format!("{}", err);
        assert!(text.contains("WIRE_TYPE_MISMATCH"));
        assert!(text.contains("display.width"));
        assert!(text.contains("int"));
        assert!(text.contains("string"));
    }

    #[test]
    fn test_exclusive_conflict_names_all_keys() {
        let err = ValidationError::exclusive_conflict(
            "",
            "value",
            &["arc".to_string(), "slider".to_string()],
        );
        let text = format!("{}", err);
        assert!(text.contains("arc"));
        assert!(text.contains("slider"));
    }

    #[test]
    fn test_byte_sequence_error_carries_offset() {
        let err = ValidationError::malformed_byte_sequence("init_sequence", 7);
        assert_eq!(err.offset(), Some(7));
        assert!(format!("{}", err).contains("offset 7"));
    }

    #[test]
    fn test_make_path() {
        assert_eq!(make_path("", "width"), "width");
        assert_eq!(make_path("display", "width"), "display.width");
        assert_eq!(index_path("display.data_pins", 3), "display.data_pins[3]");
    }
}
