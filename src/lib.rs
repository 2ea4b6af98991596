//! wiregen - a strict, deterministic descriptor-to-code-graph emission core
//!
//! Validates a tree of declarative component descriptors against nested
//! schemas, resolves load-order dependencies, and drives cooperative
//! emission tasks into a dependency-ordered statement stream for an
//! external code emitter.

pub mod emit;
pub mod observability;
pub mod pass;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod value;
