//! Schema engine
//!
//! Declarative validators compiled from nested rule sets. Applying a schema
//! to a raw value produces a fully normalized node (defaults filled in) or a
//! non-empty list of field-scoped errors; the input is never partially
//! mutated.
//!
//! # Design Principles
//!
//! - Collect every error across the node before reporting
//! - Defaults and coercions are explicit per-field rules, never implicit
//! - Structural byte-sequence validation runs after element coercion and
//!   reports byte offsets
//! - Preset indices resolve before structural validation
//! - Validation is deterministic and idempotent on normalized nodes

mod bytes;
mod errors;
mod pins;
mod types;
mod validators;

pub use bytes::{scan, ByteSequence, PresetTable};
pub use errors::{ValidationCode, ValidationError};
pub use pins::{PinCapabilities, PinSchema};
pub use types::{FieldRule, Requirement, Schema};
pub use validators::Validator;
