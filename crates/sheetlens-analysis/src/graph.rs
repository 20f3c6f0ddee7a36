//! Dependency graph over formula cells
//!
//! Nodes are normalized `Sheet!Coord` (or `Sheet!Coord:Coord`) strings. The
//! forward map goes from a formula cell to the references it reads; the
//! reverse map goes from a reference to the formula cells reading it. The
//! two maps are kept mutually consistent: edge (A → B) is in the forward
//! adjacency iff A is in B's reverse adjacency.
//!
//! Range references stay opaque aggregates — a range node is never expanded
//! into per-cell edges.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Forward ("depends on") and reverse ("depended by") adjacency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    /// Formula cell → references it reads
    forward: BTreeMap<String, BTreeSet<String>>,
    /// Reference → formula cells that read it
    reverse: BTreeMap<String, BTreeSet<String>>,
    /// Cells that reference themselves (trivial cycles, flagged at build time)
    self_references: BTreeSet<String>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from (formula cell, resolved reference set) pairs.
    /// Building is idempotent: the same table always yields the same graph.
    pub fn build<'a, I, R>(formula_table: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, R)>,
        R: IntoIterator<Item = &'a str>,
    {
        let mut graph = Self::new();
        for (cell, references) in formula_table {
            // Formula cells with no references still get a forward entry
            graph.forward.entry(cell.to_string()).or_default();
            for target in references {
                graph.add_edge(cell, target);
            }
        }
        graph
    }

    /// Add edge: `dependent` reads `target`. Duplicate edges collapse.
    pub fn add_edge(&mut self, dependent: &str, target: &str) {
        if dependent == target {
            self.self_references.insert(dependent.to_string());
        }
        self.forward
            .entry(dependent.to_string())
            .or_default()
            .insert(target.to_string());
        self.reverse
            .entry(target.to_string())
            .or_default()
            .insert(dependent.to_string());
    }

    /// References the given cell reads (forward adjacency)
    pub fn depends_on(&self, cell: &str) -> Option<&BTreeSet<String>> {
        self.forward.get(cell)
    }

    /// Formula cells reading the given reference (reverse adjacency)
    pub fn dependents_of(&self, target: &str) -> Option<&BTreeSet<String>> {
        self.reverse.get(target)
    }

    /// Whether any formula cell reads `target`
    pub fn has_dependents(&self, target: &str) -> bool {
        self.reverse.get(target).is_some_and(|s| !s.is_empty())
    }

    /// Cells that reference themselves
    pub fn self_references(&self) -> &BTreeSet<String> {
        &self.self_references
    }

    /// The full forward map
    pub fn forward(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.forward
    }

    /// The full reverse map
    pub fn reverse(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.reverse
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(|s| s.len()).sum()
    }
}
