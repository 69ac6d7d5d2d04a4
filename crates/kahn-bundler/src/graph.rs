//! Module dependency graph
//!
//! Nodes are kept in discovery order. Every module named as a dependency is
//! also a node, so the graph is closed once construction finishes.

use indexmap::IndexMap;
use std::collections::VecDeque;

use crate::module_id::ModuleId;

/// A node in the module graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    pub id: ModuleId,
    /// Modules this module requires, in first-require order
    pub dependencies: Vec<ModuleId>,
    /// Modules that require this module
    pub dependents: Vec<ModuleId>,
}

impl ModuleNode {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            dependencies: Vec::new(),
            dependents: Vec::new(),
        }
    }
}

/// Module dependency graph
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<ModuleId, ModuleNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module with no edges, if not already present.
    pub fn add_module(&mut self, id: ModuleId) {
        if !self.nodes.contains_key(&id) {
            self.nodes.insert(id.clone(), ModuleNode::new(id));
        }
    }

    /// Record that `from` requires `to`. Repeated edges are recorded once.
    pub fn add_dependency(&mut self, from: ModuleId, to: ModuleId) {
        self.add_module(from.clone());
        self.add_module(to.clone());

        if let Some(node) = self.nodes.get_mut(&from) {
            if !node.dependencies.contains(&to) {
                node.dependencies.push(to.clone());
            }
        }

        if let Some(node) = self.nodes.get_mut(&to) {
            if !node.dependents.contains(&from) {
                node.dependents.push(from);
            }
        }
    }

    pub fn get(&self, id: &ModuleId) -> Option<&ModuleNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Direct dependencies of `id`; empty for an unknown module.
    pub fn dependencies(&self, id: &ModuleId) -> &[ModuleId] {
        self.nodes
            .get(id)
            .map(|node| node.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Modules requiring `id`; empty for an unknown module.
    pub fn dependents(&self, id: &ModuleId) -> &[ModuleId] {
        self.nodes
            .get(id)
            .map(|node| node.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// All module ids, in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every module reachable from `id`, excluding `id` itself unless it
    /// lies on a cycle.
    pub fn transitive_dependencies(&self, id: &ModuleId) -> Vec<ModuleId> {
        let mut deps = Vec::new();
        let mut queue: VecDeque<&ModuleId> = self.dependencies(id).iter().collect();

        while let Some(dep) = queue.pop_front() {
            if deps.contains(dep) {
                continue;
            }
            deps.push(dep.clone());
            queue.extend(self.dependencies(dep).iter());
        }

        deps
    }
}
