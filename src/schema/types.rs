//! Schema definitions and node validation
//!
//! A schema is a named list of field rules applied to one configuration
//! node. Applying a schema either returns a fully normalized node with every
//! declared default filled in, or a non-empty list of field-scoped errors.
//! The input is never partially mutated: normalization builds a fresh node.
//!
//! Validation semantics:
//! - Required fields are checked for presence; missing ones are errors
//!   naming the field.
//! - Optional fields fill in their declared default when absent.
//! - Exclusive groups are checked after all members are visited: more than
//!   one present is an error naming every offending key; zero present is
//!   fine (the descriptor's procedure decides whether the group itself was
//!   mandatory).
//! - Undeclared fields are errors.
//! - Errors are collected across the whole node, never first-failure-only.

use std::collections::BTreeMap;

use crate::value::{Node, Value};

use super::errors::{make_path, ValidationError};
use super::validators::Validator;

/// Presence requirement for one field rule.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// Field must be present.
    Required,
    /// Field may be absent; `default` (if any) fills in.
    Optional { default: Option<Value> },
    /// Field belongs to `group`; at most one group member may be present.
    Exclusive { group: String },
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub key: String,
    pub requirement: Requirement,
    pub validator: Validator,
}

/// A named set of field rules.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    rules: Vec<FieldRule>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Returns the schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared rules in declaration order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Declares a required field.
    pub fn required(mut self, key: impl Into<String>, validator: Validator) -> Self {
        self.rules.push(FieldRule {
            key: key.into(),
            requirement: Requirement::Required,
            validator,
        });
        self
    }

    /// Declares an optional field with no default.
    pub fn optional(mut self, key: impl Into<String>, validator: Validator) -> Self {
        self.rules.push(FieldRule {
            key: key.into(),
            requirement: Requirement::Optional { default: None },
            validator,
        });
        self
    }

    /// Declares an optional field that defaults to `default` when absent.
    pub fn optional_default(
        mut self,
        key: impl Into<String>,
        validator: Validator,
        default: Value,
    ) -> Self {
        self.rules.push(FieldRule {
            key: key.into(),
            requirement: Requirement::Optional {
                default: Some(default),
            },
            validator,
        });
        self
    }

    /// Declares a field in the exclusive `group`.
    pub fn exclusive(
        mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        validator: Validator,
    ) -> Self {
        self.rules.push(FieldRule {
            key: key.into(),
            requirement: Requirement::Exclusive {
                group: group.into(),
            },
            validator,
        });
        self
    }

    /// Declares the standard optional instance `id` field. The pass driver
    /// generates an identifier for instances that leave it out.
    pub fn instance_id(self) -> Self {
        self.optional("id", Validator::UseId)
    }

    /// Appends every rule of `other`, as descriptor schemas extend shared
    /// base schemas (bus device, pollable component, widget base).
    pub fn extend(mut self, other: Schema) -> Self {
        self.rules.extend(other.rules);
        self
    }

    /// Validates a raw value as a node under this schema.
    pub fn validate(&self, value: &Value) -> Result<Node, Vec<ValidationError>> {
        self.validate_at(value, "")
    }

    /// Validates with a field-path prefix for nested/instance scoping.
    pub fn validate_at(&self, value: &Value, prefix: &str) -> Result<Node, Vec<ValidationError>> {
        let root = if prefix.is_empty() { "$root" } else { prefix };
        let node = match value.as_node() {
            Some(node) => node,
            None => {
                return Err(vec![ValidationError::type_mismatch(
                    root,
                    format!("a {} node", self.name),
                    value.type_name(),
                )])
            }
        };

        let mut errors = Vec::new();
        let mut out = Node::new();

        for key in node.keys() {
            if !self.rules.iter().any(|rule| rule.key == key) {
                errors.push(ValidationError::unknown_field(make_path(prefix, key)));
            }
        }

        for rule in &self.rules {
            let path = make_path(prefix, &rule.key);
            match node.get(&rule.key) {
                Some(raw) => match rule.validator.apply(raw, &path) {
                    Ok(normalized) => out.insert(&rule.key, normalized),
                    Err(field_errors) => errors.extend(field_errors),
                },
                None => match &rule.requirement {
                    Requirement::Required => errors.push(ValidationError::missing_field(path)),
                    // Defaults run through the validator too, so a preset
                    // index or pin default lands fully normalized.
                    Requirement::Optional {
                        default: Some(default),
                    } => match rule.validator.apply(default, &path) {
                        Ok(normalized) => out.insert(&rule.key, normalized),
                        Err(field_errors) => errors.extend(field_errors),
                    },
                    Requirement::Optional { default: None } | Requirement::Exclusive { .. } => {}
                },
            }
        }

        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for rule in &self.rules {
            if let Requirement::Exclusive { group } = &rule.requirement {
                if node.contains(&rule.key) {
                    groups.entry(group).or_default().push(rule.key.clone());
                }
            }
        }
        for (group, keys) in groups {
            if keys.len() > 1 {
                errors.push(ValidationError::exclusive_conflict(root, group, &keys));
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }
}
