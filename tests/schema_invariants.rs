//! Schema Invariant Tests
//!
//! - Validation is deterministic and idempotent
//! - Every error across a node is collected before reporting
//! - Exclusive groups name every offending key
//! - Byte sequences are scanned after element coercion and preset
//!   resolution, with errors carrying byte offsets
//! - Pin lists honor exact length constraints

use wiregen::schema::{
    PinCapabilities, PresetTable, Schema, ValidationCode, Validator,
};
use wiregen::value::{Node, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn node(entries: &[(&str, Value)]) -> Value {
    let mut n = Node::new();
    for (k, v) in entries {
        n.insert(*k, v.clone());
    }
    Value::Node(n)
}

fn ints(values: &[i64]) -> Value {
    Value::List(values.iter().map(|v| Value::Int(*v)).collect())
}

fn pin(number: i64) -> Value {
    node(&[("number", Value::Int(number))])
}

fn display_schema() -> Schema {
    let presets = PresetTable::new("panel_inits")
        .preset(vec![0x01, 0x01, 0xFF])
        .preset(vec![0x02, 0x02, 0x10, 0x20]);

    Schema::new("display")
        .required(
            "data_pins",
            Validator::All(vec![
                Validator::list(Validator::pin(PinCapabilities::output().internal_only())),
                Validator::exactly(16),
            ]),
        )
        .optional_default(
            "init_sequence",
            Validator::bytes_with_presets(presets),
            Value::Int(0),
        )
        .required("width", Validator::Int)
        .required("height", Validator::Int)
}

// =============================================================================
// Determinism and Idempotency
// =============================================================================

/// The same raw node validates identically every time.
#[test]
fn test_validation_is_deterministic() {
    let schema = Schema::new("t")
        .required("a", Validator::Int)
        .optional_default("b", Validator::Int, Value::Int(5));

    let raw = node(&[("a", Value::Int(3))]);
    let first = schema.validate(&raw).unwrap();
    for _ in 0..100 {
        assert_eq!(schema.validate(&raw).unwrap(), first);
    }
}

/// Validating an already-normalized node returns it unchanged.
#[test]
fn test_validation_is_idempotent() {
    let schema = display_schema();

    let raw = node(&[
        ("data_pins", Value::List((0..16).map(pin).collect())),
        ("width", Value::Int(480)),
        ("height", Value::Int(480)),
    ]);

    let first = schema.validate(&raw).unwrap();
    let second = schema.validate(&Value::Node(first.clone())).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Required, Optional, Defaults
// =============================================================================

/// {Required(a, int), Optional(b, int, default=5)} given {a: 3} yields
/// {a: 3, b: 5}.
#[test]
fn test_defaults_fill_in() {
    let schema = Schema::new("t")
        .required("a", Validator::Int)
        .optional_default("b", Validator::Int, Value::Int(5));

    let out = schema.validate(&node(&[("a", Value::Int(3))])).unwrap();
    assert_eq!(out.get_int("a"), Some(3));
    assert_eq!(out.get_int("b"), Some(5));
    assert_eq!(out.len(), 2);
}

/// Given {} the same schema yields exactly one error citing `a`.
#[test]
fn test_missing_required_cites_field() {
    let schema = Schema::new("t")
        .required("a", Validator::Int)
        .optional_default("b", Validator::Int, Value::Int(5));

    let errors = schema.validate(&node(&[])).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ValidationCode::FieldMissing);
    assert_eq!(errors[0].path(), "a");
}

/// Every problem in a node is reported in one run.
#[test]
fn test_all_errors_collected() {
    let schema = display_schema();

    // Missing data_pins and height, mistyped width, unknown field.
    let errors = schema
        .validate(&node(&[
            ("width", Value::Str("wide".into())),
            ("rotation", Value::Int(90)),
        ]))
        .unwrap_err();
    assert_eq!(errors.len(), 4);
}

// =============================================================================
// Exclusive Groups
// =============================================================================

/// Two members of a group present: one error naming both keys.
#[test]
fn test_exclusive_group_names_all_offenders() {
    let schema = Schema::new("number")
        .exclusive("value", "arc", Validator::UseId)
        .exclusive("value", "slider", Validator::UseId);

    let errors = schema
        .validate(&node(&[
            ("arc", Value::Str("my_arc".into())),
            ("slider", Value::Str("my_slider".into())),
        ]))
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ValidationCode::ExclusiveConflict);
    let text = format!("{}", errors[0]);
    assert!(text.contains("arc"));
    assert!(text.contains("slider"));
}

/// Zero members present is not an error; the group is optional at the
/// schema level.
#[test]
fn test_exclusive_group_absent_is_legal() {
    let schema = Schema::new("number")
        .exclusive("value", "arc", Validator::UseId)
        .exclusive("value", "slider", Validator::UseId);

    assert!(schema.validate(&node(&[])).is_ok());
}

// =============================================================================
// Byte Sequences
// =============================================================================

/// [1, 2, 0xAA, 0xBB, 3, 1, 0xCC] is two consistent records.
#[test]
fn test_byte_sequence_accepts_consistent_records() {
    let schema = Schema::new("t").required("seq", Validator::bytes());

    let out = schema
        .validate(&node(&[("seq", ints(&[1, 2, 0xAA, 0xBB, 3, 1, 0xCC]))]))
        .unwrap();
    assert_eq!(out.get_bytes("seq"), Some(&[1, 2, 0xAA, 0xBB, 3, 1, 0xCC][..]));
}

/// [1, 2, 0xAA] declares two payload bytes but carries one; rejected at
/// offset 0.
#[test]
fn test_byte_sequence_overrun_rejected_at_offset() {
    let schema = Schema::new("t").required("seq", Validator::bytes());

    let errors = schema
        .validate(&node(&[("seq", ints(&[1, 2, 0xAA]))]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ValidationCode::MalformedByteSequence);
    assert_eq!(errors[0].offset(), Some(0));
    assert_eq!(errors[0].path(), "seq");
}

/// The offset names the offending record's tag byte, not the buffer end.
#[test]
fn test_byte_sequence_offset_points_at_bad_record() {
    let schema = Schema::new("t").required("seq", Validator::bytes());

    // First record [5, 1, 0x10] is fine; second overruns at offset 3.
    let errors = schema
        .validate(&node(&[("seq", ints(&[5, 1, 0x10, 6, 4, 0x20]))]))
        .unwrap_err();
    assert_eq!(errors[0].offset(), Some(3));
}

/// Element coercion failures are reported before any structural scan.
#[test]
fn test_byte_sequence_element_coercion_first() {
    let schema = Schema::new("t").required("seq", Validator::bytes());

    let errors = schema
        .validate(&node(&[("seq", ints(&[1, 300]))]))
        .unwrap_err();
    assert_eq!(errors[0].code(), ValidationCode::OutOfRange);
    assert_eq!(errors[0].path(), "seq[1]");
}

// =============================================================================
// Presets
// =============================================================================

/// An integer resolves through the preset table before structural
/// validation; the normalized value is the preset itself.
#[test]
fn test_preset_index_resolves() {
    let schema = display_schema();

    let out = schema
        .validate(&node(&[
            ("data_pins", Value::List((0..16).map(pin).collect())),
            ("init_sequence", Value::Int(1)),
            ("width", Value::Int(480)),
            ("height", Value::Int(480)),
        ]))
        .unwrap();
    assert_eq!(out.get_bytes("init_sequence"), Some(&[0x02, 0x02, 0x10, 0x20][..]));
}

/// The default preset index also lands normalized.
#[test]
fn test_default_preset_is_normalized() {
    let schema = display_schema();

    let out = schema
        .validate(&node(&[
            ("data_pins", Value::List((0..16).map(pin).collect())),
            ("width", Value::Int(480)),
            ("height", Value::Int(480)),
        ]))
        .unwrap();
    assert_eq!(out.get_bytes("init_sequence"), Some(&[0x01, 0x01, 0xFF][..]));
}

/// An index outside the table is rejected naming table and index.
#[test]
fn test_unknown_preset_index_rejected() {
    let schema = display_schema();

    let errors = schema
        .validate(&node(&[
            ("data_pins", Value::List((0..16).map(pin).collect())),
            ("init_sequence", Value::Int(9)),
            ("width", Value::Int(480)),
            ("height", Value::Int(480)),
        ]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ValidationCode::UnknownPreset);
    assert!(format!("{}", errors[0]).contains("panel_inits"));
}

/// A literal list is never treated as a preset index.
#[test]
fn test_literal_list_bypasses_presets() {
    let schema = display_schema();

    let out = schema
        .validate(&node(&[
            ("data_pins", Value::List((0..16).map(pin).collect())),
            ("init_sequence", ints(&[9, 1, 0x33])),
            ("width", Value::Int(480)),
            ("height", Value::Int(480)),
        ]))
        .unwrap();
    assert_eq!(out.get_bytes("init_sequence"), Some(&[9, 1, 0x33][..]));
}

// =============================================================================
// Pin Lists
// =============================================================================

/// Exactly sixteen data pins are required; fifteen is a length violation.
#[test]
fn test_pin_list_exact_length() {
    let schema = display_schema();

    let errors = schema
        .validate(&node(&[
            ("data_pins", Value::List((0..15).map(pin).collect())),
            ("width", Value::Int(480)),
            ("height", Value::Int(480)),
        ]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ValidationCode::LengthViolation);
    assert!(format!("{}", errors[0]).contains("exactly 16"));
}

/// Pin capability violations surface with the element's path.
#[test]
fn test_pin_capability_violation_in_list() {
    let schema = display_schema();

    let mut pins: Vec<Value> = (0..15).map(pin).collect();
    let mut mode = Node::new();
    mode.insert("output", Value::Bool(false));
    let mut bad = Node::new();
    bad.insert("number", Value::Int(15));
    bad.insert("mode", Value::Node(mode));
    pins.push(Value::Node(bad));

    let errors = schema
        .validate(&node(&[
            ("data_pins", Value::List(pins)),
            ("width", Value::Int(480)),
            ("height", Value::Int(480)),
        ]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ValidationCode::PinCapability);
    assert_eq!(errors[0].path(), "data_pins[15]");
}

// =============================================================================
// Any Alternatives
// =============================================================================

/// The first accepting alternative wins.
#[test]
fn test_any_first_success() {
    let schema = Schema::new("t").optional(
        "backlight",
        Validator::Any(vec![
            Validator::Bool,
            Validator::pin(PinCapabilities::output()),
        ]),
    );

    let out = schema
        .validate(&node(&[("backlight", Value::Bool(true))]))
        .unwrap();
    assert_eq!(out.get_bool("backlight"), Some(true));

    let out = schema.validate(&node(&[("backlight", pin(5))])).unwrap();
    assert!(out.get_node("backlight").is_some());
}

/// When every alternative fails, the error is the concatenation of each
/// alternative's errors, not just the last.
#[test]
fn test_any_concatenates_errors() {
    let schema = Schema::new("t").optional(
        "backlight",
        Validator::Any(vec![
            Validator::Bool,
            Validator::pin(PinCapabilities::output()),
        ]),
    );

    let errors = schema
        .validate(&node(&[("backlight", Value::Int(1))]))
        .unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(format!("{}", errors[0]).contains("bool"));
    assert!(format!("{}", errors[1]).contains("pin"));
}
