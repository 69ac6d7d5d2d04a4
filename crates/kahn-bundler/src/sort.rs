//! Topological ordering (Kahn's algorithm)
//!
//! The graph is only read. Each module gets a counter of dependencies not
//! yet emitted; a module whose counter reaches zero joins the ready queue.
//! The smallest ready id is emitted first, so the order is a function of
//! the graph alone.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

use crate::graph::DependencyGraph;
use crate::module_id::ModuleId;

/// The graph holds at least one cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Circular dependency detected: {}", format_cycle(.cycle))]
pub struct CycleError {
    /// Every module left unsorted, with its unsorted dependencies
    pub residual: Vec<(ModuleId, Vec<ModuleId>)>,
    /// One concrete cycle, first module repeated at the end
    pub cycle: Vec<ModuleId>,
}

fn format_cycle(cycle: &[ModuleId]) -> String {
    cycle
        .iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Order modules so every dependency precedes its dependents.
pub fn topological_sort(graph: &DependencyGraph) -> Result<Vec<ModuleId>, CycleError> {
    let mut remaining: FxHashMap<&ModuleId, usize> = graph
        .nodes()
        .map(|node| (&node.id, node.dependencies.len()))
        .collect();

    let mut ready: BinaryHeap<Reverse<&ModuleId>> = graph
        .nodes()
        .filter(|node| node.dependencies.is_empty())
        .map(|node| Reverse(&node.id))
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id.clone());
        for dependent in graph.dependents(id) {
            if let Some(count) = remaining.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }
    }

    if order.len() == graph.len() {
        return Ok(order);
    }

    let unsorted = |id: &ModuleId| remaining.get(id).is_some_and(|&count| count > 0);
    let residual: Vec<(ModuleId, Vec<ModuleId>)> = graph
        .nodes()
        .filter(|node| unsorted(&node.id))
        .map(|node| {
            let deps = node
                .dependencies
                .iter()
                .filter(|dep| unsorted(*dep))
                .cloned()
                .collect();
            (node.id.clone(), deps)
        })
        .collect();
    let cycle = find_cycle(&residual);

    Err(CycleError { residual, cycle })
}

/// Walk first unsorted dependencies from the first residual module until a
/// module repeats. Every residual module has an unsorted dependency, so the
/// walk cannot stop short.
fn find_cycle(residual: &[(ModuleId, Vec<ModuleId>)]) -> Vec<ModuleId> {
    let edges: FxHashMap<&ModuleId, &ModuleId> = residual
        .iter()
        .filter_map(|(id, deps)| deps.first().map(|dep| (id, dep)))
        .collect();

    let mut path: Vec<&ModuleId> = Vec::new();
    let mut current = residual.first().map(|(id, _)| id);
    while let Some(id) = current {
        if let Some(start) = path.iter().position(|seen| *seen == id) {
            let mut cycle: Vec<ModuleId> = path[start..].iter().map(|id| (*id).clone()).collect();
            cycle.push(id.clone());
            return cycle;
        }
        path.push(id);
        current = edges.get(id).copied();
    }

    path.into_iter().cloned().collect()
}
