//! Length-prefixed byte sequences
//!
//! A byte sequence is a flat run of records, each `[tag][len][len bytes of
//! payload]`. Scanning from offset 0 and consuming `2 + len` bytes per record
//! must land exactly on the end of the buffer; anything else is a validation
//! error carrying the offset of the offending record's tag byte.
//!
//! Descriptors that accept such sequences usually also ship a preset table of
//! standard sequences selectable by integer index. A raw value that is not
//! already a list is resolved through the table before structural validation.

use std::rc::Rc;

use crate::value::Value;

use super::errors::{index_path, ValidationError};

/// Scans a byte sequence for structural consistency.
///
/// Returns the byte offset of the first record whose declared payload length
/// would overrun the buffer (or whose header is truncated).
pub fn scan(bytes: &[u8]) -> Result<(), usize> {
    let total = bytes.len();
    let mut i = 0;
    while i < total {
        let remaining = total - i;
        if remaining < 2 || bytes[i + 1] as usize > remaining - 2 {
            return Err(i);
        }
        i += 2 + bytes[i + 1] as usize;
    }
    Ok(())
}

/// A named table of standard byte sequences selectable by index.
#[derive(Debug, Clone)]
pub struct PresetTable {
    name: String,
    entries: Vec<Vec<u8>>,
}

impl PresetTable {
    /// Creates an empty preset table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Appends a preset, returning the table for chaining.
    pub fn preset(mut self, bytes: Vec<u8>) -> Self {
        self.entries.push(bytes);
        self
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the preset at `index`, if any.
    pub fn get(&self, index: i64) -> Option<&[u8]> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .map(Vec::as_slice)
    }

    /// Returns the number of presets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validator core for byte-sequence fields.
#[derive(Debug, Clone)]
pub struct ByteSequence {
    presets: Option<Rc<PresetTable>>,
}

impl ByteSequence {
    /// A byte sequence with no preset table: the raw value must be a list of
    /// bytes (or an already-normalized sequence).
    pub fn plain() -> Self {
        Self { presets: None }
    }

    /// A byte sequence resolvable through `table` by integer index.
    pub fn with_presets(table: PresetTable) -> Self {
        Self {
            presets: Some(Rc::new(table)),
        }
    }

    /// Resolves presets, coerces elements to bytes, and scans the result.
    pub(super) fn apply(&self, value: &Value, path: &str) -> Result<Value, Vec<ValidationError>> {
        let bytes = match value {
            // Already normalized; rescan so validation stays idempotent.
            Value::Bytes(b) => b.clone(),
            Value::List(items) => {
                let mut bytes = Vec::with_capacity(items.len());
                let mut errors = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    match item.as_int() {
                        Some(v) if (0..=255).contains(&v) => bytes.push(v as u8),
                        Some(v) => errors.push(ValidationError::out_of_range(
                            index_path(path, i),
                            "an integer in 0..=255",
                            v.to_string(),
                        )),
                        None => errors.push(ValidationError::type_mismatch(
                            index_path(path, i),
                            "an integer in 0..=255",
                            item.type_name(),
                        )),
                    }
                }
                if !errors.is_empty() {
                    return Err(errors);
                }
                bytes
            }
            Value::Int(index) => match &self.presets {
                Some(table) => match table.get(*index) {
                    Some(preset) => preset.to_vec(),
                    None => {
                        return Err(vec![ValidationError::unknown_preset(
                            path,
                            table.name(),
                            *index,
                        )])
                    }
                },
                None => {
                    return Err(vec![ValidationError::type_mismatch(
                        path,
                        "a byte sequence",
                        value.type_name(),
                    )])
                }
            },
            other => {
                let expected = if self.presets.is_some() {
                    "a byte sequence or preset index"
                } else {
                    "a byte sequence"
                };
                return Err(vec![ValidationError::type_mismatch(
                    path,
                    expected,
                    other.type_name(),
                )]);
            }
        };

        scan(&bytes).map_err(|offset| vec![ValidationError::malformed_byte_sequence(path, offset)])?;
        Ok(Value::Bytes(bytes))
    }
}
