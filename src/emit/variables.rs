//! Variable table
//!
//! Maps configuration identifiers to the opaque handles of to-be-constructed
//! objects. A handle is created exactly once per identifier by `declare` and
//! lives for the remainder of the pass. The table is owned by the scheduler;
//! tasks reach it only through their context handle.

use std::collections::HashMap;

use serde::Serialize;

use crate::value::Ident;

use super::errors::{EmitError, EmitResult};

/// Opaque handle to an object the emitted code will construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VariableHandle {
    id: Ident,
    ty: String,
    /// Creation index within the pass
    slot: usize,
}

impl VariableHandle {
    /// Returns the configuration identifier this handle was declared under.
    pub fn id(&self) -> &Ident {
        &self.id
    }

    /// Returns the target type name of the object to construct.
    pub fn type_name(&self) -> &str {
        &self.ty
    }

    /// Returns the creation index within the pass.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// The pass-wide identifier-to-handle table.
#[derive(Debug, Default, Serialize)]
pub struct VariableTable {
    /// Handles in creation order
    handles: Vec<VariableHandle>,
    #[serde(skip)]
    index: HashMap<Ident, usize>,
}

impl VariableTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new variable for `id`. At most one declaration per
    /// identifier; a second is a duplicate-identifier error.
    pub fn declare(&mut self, id: Ident, ty: impl Into<String>) -> EmitResult<VariableHandle> {
        if self.index.contains_key(&id) {
            return Err(EmitError::DuplicateIdent(id));
        }
        let slot = self.handles.len();
        let handle = VariableHandle {
            id: id.clone(),
            ty: ty.into(),
            slot,
        };
        self.handles.push(handle.clone());
        self.index.insert(id, slot);
        Ok(handle)
    }

    /// Returns the handle declared for `id`, if any.
    pub fn get(&self, id: &Ident) -> Option<&VariableHandle> {
        self.index.get(id).map(|&slot| &self.handles[slot])
    }

    /// Returns whether `id` has been declared.
    pub fn contains(&self, id: &Ident) -> bool {
        self.index.contains_key(id)
    }

    /// Returns every handle in creation order.
    pub fn handles(&self) -> &[VariableHandle] {
        &self.handles
    }

    /// Returns the number of declared variables.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns whether no variable has been declared.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
