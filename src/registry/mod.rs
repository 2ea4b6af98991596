//! Descriptor registry
//!
//! Maps a descriptor name to its schema, its dependency sets, its
//! attribution list, and its emission procedure. Purely data: populated once
//! before any validation or emission begins, read-only during a pass. A
//! missing descriptor is not a registry-level failure; the dependency
//! resolver reports it as a fatal configuration error.

mod errors;

pub use errors::RegistryError;

use std::collections::HashMap;
use std::rc::Rc;

use crate::emit::EmitProcedure;
use crate::schema::Schema;

/// A named, schema-bearing unit of configuration with an associated
/// emission procedure.
pub struct Descriptor {
    name: String,
    schema: Schema,
    /// Attribution list; carried for tooling, ignored by the core logic.
    codeowners: Vec<String>,
    /// Descriptors that must already be present in the configuration (or be
    /// auto-loaded by something that is).
    dependencies: Vec<String>,
    /// Descriptors loaded transitively when absent.
    auto_load: Vec<String>,
    procedure: Rc<dyn EmitProcedure>,
}

impl Descriptor {
    /// Creates a descriptor with no dependencies.
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        procedure: Rc<dyn EmitProcedure>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            codeowners: Vec::new(),
            dependencies: Vec::new(),
            auto_load: Vec::new(),
            procedure,
        }
    }

    /// Sets the attribution list.
    pub fn with_codeowners(mut self, owners: &[&str]) -> Self {
        self.codeowners = owners.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Sets the strict dependency set.
    pub fn with_dependencies(mut self, names: &[&str]) -> Self {
        self.dependencies = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Sets the auto-load set.
    pub fn with_auto_load(mut self, names: &[&str]) -> Self {
        self.auto_load = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Returns the descriptor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the validation schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the attribution list.
    pub fn codeowners(&self) -> &[String] {
        &self.codeowners
    }

    /// Returns the strict dependency set.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Returns the auto-load set.
    pub fn auto_load(&self) -> &[String] {
        &self.auto_load
    }

    /// Returns the emission procedure.
    pub fn procedure(&self) -> Rc<dyn EmitProcedure> {
        Rc::clone(&self.procedure)
    }
}

/// Register-once lookup table of descriptors.
#[derive(Default)]
pub struct Registry {
    descriptors: HashMap<String, Descriptor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor. Descriptors are immutable once registered;
    /// a second registration under the same name fails.
    pub fn register(&mut self, descriptor: Descriptor) -> Result<(), RegistryError> {
        if self.descriptors.contains_key(descriptor.name()) {
            return Err(RegistryError::Duplicate(descriptor.name().to_string()));
        }
        self.descriptors
            .insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Looks up a descriptor by name.
    pub fn lookup(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.get(name)
    }

    /// Returns whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
