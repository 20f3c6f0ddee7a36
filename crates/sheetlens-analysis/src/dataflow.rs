//! Input / calculation / output classification
//!
//! Every valued cell lands in exactly one bucket:
//! - `inputs`: literal cells (no formula),
//! - `calculations`: formula cells some other formula reads,
//! - `outputs`: formula cells nothing reads (sinks).
//!
//! "Reads" means an exact match in the reverse adjacency. A cell that is
//! only covered by a referenced range is not counted as read — ranges are
//! opaque aggregates by design.

use crate::graph::DependencyGraph;
use serde::Serialize;
use sheetlens_core::WorkbookSnapshot;

/// The three-way data-flow partition of all valued cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataFlowClassification {
    /// Literal cells: raw data the workbook's logic starts from
    pub inputs: Vec<String>,
    /// Formula cells that feed at least one other formula
    pub calculations: Vec<String>,
    /// Formula cells nothing depends on: the workbook's results
    pub outputs: Vec<String>,
}

/// Classify every valued cell using the graph's reverse adjacency
pub fn classify(snapshot: &WorkbookSnapshot, graph: &DependencyGraph) -> DataFlowClassification {
    let mut flow = DataFlowClassification::default();

    for sheet in snapshot.sheets() {
        for (addr, record) in sheet.cells() {
            if record.value.is_empty() {
                continue;
            }
            let cell = format!("{}!{}", sheet.name(), addr.to_a1_string());
            if record.value.is_formula() {
                if graph.has_dependents(&cell) {
                    flow.calculations.push(cell);
                } else {
                    flow.outputs.push(cell);
                }
            } else {
                flow.inputs.push(cell);
            }
        }
    }

    flow.inputs.sort_unstable();
    flow.calculations.sort_unstable();
    flow.outputs.sort_unstable();
    flow
}
