//! Pass driver
//!
//! One validate-then-emit pass over a configuration document:
//!
//! 1. Validate every instance of every referenced descriptor, collecting all
//!    validation errors document-wide before reporting.
//! 2. Resolve the dependency closure and emission order; resolution errors
//!    abort before any task starts. Auto-loaded descriptors absent from the
//!    document validate an empty node so their defaults materialize.
//! 3. Assign each instance its identifier (user-declared `id` field or
//!    generated `<descriptor>_<index>`).
//! 4. Run the emission scheduler and aggregate emission errors.
//!
//! The caller always receives a single report carrying every collected
//! error, never just the first.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::emit::{Scheduler, Statement, TaskError, TaskSpec, VariableTable};
use crate::observability::Logger;
use crate::registry::Registry;
use crate::resolver::{self, ResolutionError};
use crate::schema::ValidationError;
use crate::value::{Ident, Node, Value};

/// The product of a successful pass, consumed by the external text emitter
/// and build configuration collector.
#[derive(Debug, Serialize)]
pub struct EmitOutput {
    /// Every statement in final emission order
    pub statements: Vec<Statement>,
    /// The completed variable table
    pub variables: VariableTable,
}

impl EmitOutput {
    /// Returns the statements consumed by the external build configuration
    /// collector (library, define, and build-flag requests), in emission
    /// order.
    pub fn build_requests(&self) -> Vec<&Statement> {
        self.statements
            .iter()
            .filter(|s| s.kind().is_build_request())
            .collect()
    }
}

/// Aggregated failure report for one pass.
#[derive(Debug)]
pub enum PassReport {
    /// Every validation error across the document
    Validation(Vec<ValidationError>),
    /// The fatal resolution error; no task was started
    Resolution(ResolutionError),
    /// Every per-task emission or unresolved-reference error
    Emission(Vec<TaskError>),
}

impl PassReport {
    /// Returns the number of collected errors.
    pub fn error_count(&self) -> usize {
        match self {
            PassReport::Validation(errors) => errors.len(),
            PassReport::Resolution(_) => 1,
            PassReport::Emission(errors) => errors.len(),
        }
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassReport::Validation(errors) => {
                writeln!(f, "configuration invalid ({} errors):", errors.len())?;
                for error in errors {
                    writeln!(f, "  {}", error)?;
                }
                Ok(())
            }
            PassReport::Resolution(error) => write!(f, "resolution failed: {}", error),
            PassReport::Emission(errors) => {
                writeln!(f, "emission failed ({} errors):", errors.len())?;
                for error in errors {
                    writeln!(f, "  {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PassReport {}

/// A single validate-then-emit pass against a populated registry.
pub struct Pass<'a> {
    registry: &'a Registry,
}

impl<'a> Pass<'a> {
    /// Creates a pass over `registry`.
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Runs the pass over an externally parsed configuration document whose
    /// root maps descriptor names to a single node or a list of instance
    /// nodes.
    pub fn run(&self, document: &serde_json::Value) -> Result<EmitOutput, PassReport> {
        let pass_id = Uuid::new_v4();
        let pass = pass_id.to_string();

        let root = match document.as_object() {
            Some(map) => map,
            None => {
                return Err(PassReport::Validation(vec![ValidationError::type_mismatch(
                    "$root",
                    "a mapping of descriptor names",
                    Value::from_json(document).type_name(),
                )]))
            }
        };

        let roots: Vec<String> = root.keys().cloned().collect();
        Logger::info(
            "PASS_START",
            &[("pass_id", &pass), ("descriptors", &roots.len().to_string())],
        );

        // Validation: every instance of every known descriptor, all errors
        // collected. Unknown names are left for the resolver to report.
        let mut errors: Vec<ValidationError> = Vec::new();
        let mut instances: HashMap<String, Vec<Node>> = HashMap::new();
        for (name, raw) in root {
            let descriptor = match self.registry.lookup(name) {
                Some(descriptor) => descriptor,
                None => continue,
            };
            let raw_instances: Vec<Value> = match raw {
                serde_json::Value::Array(items) => items.iter().map(Value::from_json).collect(),
                // A bare `name:` key selects the descriptor with an empty
                // configuration.
                serde_json::Value::Null => vec![Value::Node(Node::new())],
                other => vec![Value::from_json(other)],
            };
            let indexed = raw_instances.len() > 1;
            let mut nodes = Vec::with_capacity(raw_instances.len());
            for (idx, raw_instance) in raw_instances.iter().enumerate() {
                let prefix = if indexed {
                    format!("{}[{}]", name, idx)
                } else {
                    name.clone()
                };
                match descriptor.schema().validate_at(raw_instance, &prefix) {
                    Ok(node) => nodes.push(node),
                    Err(instance_errors) => errors.extend(instance_errors),
                }
            }
            instances.insert(name.clone(), nodes);
        }
        if !errors.is_empty() {
            Logger::error(
                "VALIDATION_FAILED",
                &[("pass_id", &pass), ("errors", &errors.len().to_string())],
            );
            return Err(PassReport::Validation(errors));
        }

        // Resolution: fatal before any emission task starts.
        let resolution = match resolver::resolve(self.registry, &roots) {
            Ok(resolution) => resolution,
            Err(error) => {
                Logger::error("RESOLUTION_FAILED", &[("pass_id", &pass)]);
                return Err(PassReport::Resolution(error));
            }
        };
        Logger::info(
            "RESOLUTION_COMPLETE",
            &[
                ("pass_id", &pass),
                ("closure", &resolution.order().len().to_string()),
                ("auto_loaded", &resolution.auto_loaded().len().to_string()),
            ],
        );

        // Auto-loaded descriptors validate an empty node: defaults fill in,
        // and a required field surfaces as a normal validation error.
        for name in resolution.auto_loaded() {
            let descriptor = self
                .registry
                .lookup(name)
                .expect("auto-loaded names are registered");
            match descriptor
                .schema()
                .validate_at(&Value::Node(Node::new()), name)
            {
                Ok(node) => {
                    instances.insert(name.clone(), vec![node]);
                }
                Err(instance_errors) => errors.extend(instance_errors),
            }
        }
        if !errors.is_empty() {
            Logger::error(
                "VALIDATION_FAILED",
                &[("pass_id", &pass), ("errors", &errors.len().to_string())],
            );
            return Err(PassReport::Validation(errors));
        }

        // One task per instance, in resolver order, instances in document
        // order within a descriptor.
        let mut specs: Vec<TaskSpec> = Vec::new();
        for name in resolution.order() {
            let descriptor = self
                .registry
                .lookup(name)
                .expect("ordered names are registered");
            let Some(nodes) = instances.get(name) else {
                continue;
            };
            for (idx, node) in nodes.iter().enumerate() {
                let mut config = node.clone();
                let instance = instance_ident(name, idx, &config);
                if !config.contains("id") {
                    config.insert("id", Value::Id(instance.clone()));
                }
                specs.push(TaskSpec {
                    descriptor: name.clone(),
                    instance,
                    config,
                    procedure: descriptor.procedure(),
                });
            }
        }

        let outcome = Scheduler::new(pass_id).run(specs);
        if !outcome.errors.is_empty() {
            Logger::error(
                "EMISSION_FAILED",
                &[
                    ("pass_id", &pass),
                    ("errors", &outcome.errors.len().to_string()),
                ],
            );
            return Err(PassReport::Emission(outcome.errors));
        }

        Logger::info(
            "PASS_COMPLETE",
            &[
                ("pass_id", &pass),
                ("statements", &outcome.statements.len().to_string()),
                ("variables", &outcome.variables.len().to_string()),
            ],
        );
        Ok(EmitOutput {
            statements: outcome.statements,
            variables: outcome.variables,
        })
    }
}

/// User-declared `id` field, or a generated `<descriptor>_<index>`.
fn instance_ident(name: &str, index: usize, config: &Node) -> Ident {
    match config.get("id") {
        Some(Value::Id(id)) => id.clone(),
        Some(Value::Str(s)) => Ident::new(s.clone()),
        _ => Ident::new(format!("{}_{}", name, index)),
    }
}
