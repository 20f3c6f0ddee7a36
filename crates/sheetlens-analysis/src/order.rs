//! Cycle-safe calculation ordering
//!
//! Iterative depth-first postorder over the forward adjacency with
//! three-color marking (unvisited / in-progress / done). The explicit stack
//! keeps traversal depth independent of the native call stack, so arbitrarily
//! long dependency chains cannot overflow it.
//!
//! Reaching an in-progress node means a cycle: the re-entering edge is
//! recorded as a witness, every cell on the in-progress span between the two
//! endpoints is flagged as a cycle member, and traversal backs off the edge
//! instead of recursing. Cyclic cells still appear in the output sequence.

use crate::graph::DependencyGraph;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// The edge whose traversal re-entered an in-progress cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleWitness {
    /// The dependent formula cell the traversal came from
    pub from: String,
    /// The in-progress cell it reached again
    pub to: String,
}

/// Dependency-respecting ordering of all formula cells
///
/// For every non-cyclic edge "A depends on B", B appears before A in
/// `sequence`. Only formula cells appear; literal cells are upstream leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalculationOrder {
    /// Formula cells, dependencies first
    pub sequence: Vec<String>,
    /// One witness edge per back-edge encountered
    pub cycles: Vec<CycleWitness>,
    /// Cells participating in at least one cycle
    pub cyclic_cells: BTreeSet<String>,
}

impl CalculationOrder {
    /// Whether the given cell is flagged as a cycle member
    pub fn is_cyclic(&self, cell: &str) -> bool {
        self.cyclic_cells.contains(cell)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame<'a> {
    node: &'a str,
    /// Dependencies that are themselves formula cells; everything else
    /// (literals, opaque ranges) is an upstream leaf with no ordering needs
    neighbors: Vec<&'a str>,
    idx: usize,
}

impl<'a> Frame<'a> {
    fn new(node: &'a str, graph: &'a DependencyGraph) -> Self {
        let neighbors = graph
            .depends_on(node)
            .map(|targets| {
                targets
                    .iter()
                    .map(String::as_str)
                    .filter(|t| graph.forward().contains_key(*t))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            node,
            neighbors,
            idx: 0,
        }
    }
}

/// Resolve a dependency-respecting calculation order over all formula cells
pub fn resolve_order(graph: &DependencyGraph) -> CalculationOrder {
    let mut order = CalculationOrder::default();
    let mut marks: AHashMap<&str, Mark> = AHashMap::with_capacity(graph.forward().len());

    for root in graph.forward().keys() {
        if marks.contains_key(root.as_str()) {
            continue;
        }
        marks.insert(root, Mark::InProgress);
        let mut stack = vec![Frame::new(root, graph)];

        while let Some(top) = stack.len().checked_sub(1) {
            let next = {
                let frame = &mut stack[top];
                let next = frame.neighbors.get(frame.idx).copied();
                frame.idx += 1;
                next
            };

            let Some(next) = next else {
                if let Some(frame) = stack.pop() {
                    marks.insert(frame.node, Mark::Done);
                    order.sequence.push(frame.node.to_string());
                }
                continue;
            };

            match marks.get(next).copied() {
                None => {
                    marks.insert(next, Mark::InProgress);
                    stack.push(Frame::new(next, graph));
                }
                Some(Mark::InProgress) => {
                    // Back off the re-entering edge; the in-progress span
                    // from `next` to the top of the stack is a cycle.
                    order.cycles.push(CycleWitness {
                        from: stack[top].node.to_string(),
                        to: next.to_string(),
                    });
                    let span_start = stack
                        .iter()
                        .position(|f| f.node == next)
                        .unwrap_or(top);
                    for frame in &stack[span_start..] {
                        order.cyclic_cells.insert(frame.node.to_string());
                    }
                }
                Some(Mark::Done) => {}
            }
        }
    }

    order
}
