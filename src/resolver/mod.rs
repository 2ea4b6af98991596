//! Dependency resolver
//!
//! Given the descriptor names directly referenced by the configuration (in
//! document order), computes the transitive closure over auto-load sets and
//! a topological emission order consistent with strict dependency edges.
//!
//! - Strict `dependencies` entries must already be in the closure; a
//!   missing one is fatal, naming the requester and the missing name.
//! - `auto_load` entries join the closure transitively and impose no
//!   ordering constraint.
//! - Cycles among strict dependencies are fatal. Auto-load cycles are
//!   harmless because they carry no ordering.
//! - Ties in the topological order break by first-seen order (document
//!   order for roots, discovery order for auto-loaded names), so identical
//!   input resolves identically across runs.

mod errors;

pub use errors::ResolutionError;

use std::collections::{HashMap, HashSet};

use crate::registry::Registry;

/// The resolved closure and emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Every included descriptor, in emission order
    order: Vec<String>,
    /// The subset of `order` that joined via auto-load
    auto_loaded: Vec<String>,
}

impl Resolution {
    /// Returns the emission order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns the names that joined the closure via auto-load, in
    /// discovery order.
    pub fn auto_loaded(&self) -> &[String] {
        &self.auto_loaded
    }

    /// Returns whether `name` joined via auto-load rather than the
    /// configuration document.
    pub fn is_auto_loaded(&self, name: &str) -> bool {
        self.auto_loaded.iter().any(|n| n == name)
    }
}

/// Computes the closure and emission order for `roots`.
pub fn resolve(registry: &Registry, roots: &[String]) -> Result<Resolution, ResolutionError> {
    // Closure in first-seen order.
    let mut closure: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut auto_loaded: Vec<String> = Vec::new();

    for root in roots {
        if !registry.contains(root) {
            return Err(ResolutionError::UnknownDescriptor(root.clone()));
        }
        if seen.insert(root.clone()) {
            closure.push(root.clone());
        }
    }

    let mut i = 0;
    while i < closure.len() {
        let name = closure[i].clone();
        let descriptor = registry.lookup(&name).expect("closure members are registered");
        for target in descriptor.auto_load() {
            if seen.contains(target) {
                continue;
            }
            if !registry.contains(target) {
                return Err(ResolutionError::UnknownAutoLoad {
                    requester: name.clone(),
                    name: target.clone(),
                });
            }
            seen.insert(target.clone());
            closure.push(target.clone());
            auto_loaded.push(target.clone());
        }
        i += 1;
    }

    // Every strict dependency must be satisfied by the closure.
    for name in &closure {
        let descriptor = registry.lookup(name).expect("closure members are registered");
        for dep in descriptor.dependencies() {
            if !seen.contains(dep) {
                return Err(ResolutionError::MissingDependency {
                    requester: name.clone(),
                    missing: dep.clone(),
                });
            }
        }
    }

    // Kahn's algorithm over strict dependency edges, picking the
    // zero-in-degree node with the smallest first-seen index each step.
    let first_seen: HashMap<&str, usize> = closure
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let mut in_degree: Vec<usize> = vec![0; closure.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); closure.len()];
    for (idx, name) in closure.iter().enumerate() {
        let descriptor = registry.lookup(name).expect("closure members are registered");
        let unique: HashSet<&str> = descriptor.dependencies().iter().map(String::as_str).collect();
        for dep in unique {
            let dep_idx = first_seen[dep];
            in_degree[idx] += 1;
            dependents[dep_idx].push(idx);
        }
    }

    let mut emitted = vec![false; closure.len()];
    let mut order = Vec::with_capacity(closure.len());
    while order.len() < closure.len() {
        let next = (0..closure.len()).find(|&idx| !emitted[idx] && in_degree[idx] == 0);
        let idx = match next {
            Some(idx) => idx,
            None => {
                let participants = (0..closure.len())
                    .filter(|&idx| !emitted[idx])
                    .map(|idx| closure[idx].clone())
                    .collect();
                return Err(ResolutionError::DependencyCycle { participants });
            }
        };
        emitted[idx] = true;
        order.push(closure[idx].clone());
        for &dependent in &dependents[idx] {
            in_degree[dependent] -= 1;
        }
    }

    Ok(Resolution { order, auto_loaded })
}
