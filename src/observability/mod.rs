//! Observability subsystem
//!
//! Structured JSON logging for pass lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on validation or emission
//! 3. No async or background threads
//! 4. Deterministic output (sorted field keys, no timestamps)

mod logger;

pub use logger::{Logger, Severity};
