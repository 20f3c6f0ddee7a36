//! Whole-workbook analysis assembly
//!
//! [`analyze`] runs the full pipeline over a snapshot: per-formula parsing,
//! dependency graph construction, calculation ordering, data-flow
//! classification, and pattern detection, collected into one serializable
//! [`WorkbookAnalysis`]. The result is a pure function of the snapshot;
//! analyzing the same snapshot twice yields identical output.
//!
//! Every map in the export is keyed by normalized `Sheet!A1` strings so the
//! serialized form is plain maps and sequences of primitives.

use crate::complexity::Complexity;
use crate::dataflow::{self, DataFlowClassification};
use crate::graph::DependencyGraph;
use crate::order::{self, CalculationOrder};
use crate::pattern::{self, Pattern, PatternOptions};
use crate::references::ParsedFormula;
use serde::Serialize;
use sheetlens_core::WorkbookSnapshot;
use std::collections::BTreeMap;

/// Everything extracted from a single formula cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaInfo {
    /// The formula text as loaded, leading `=` included
    pub raw_formula: String,
    /// Normalized references the formula reads (cells and opaque ranges)
    pub depends_on: std::collections::BTreeSet<String>,
    /// Distinct function names, uppercased
    pub used_functions: std::collections::BTreeSet<String>,
    /// Length of the raw text in bytes
    pub length: usize,
    /// Structural complexity tier
    pub complexity: Complexity,
    /// Set when reference extraction hit malformed syntax
    pub parse_warning: bool,
}

/// One valued cell in the export table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellInfo {
    /// Value kind: "number", "string", "boolean", or "formula"
    pub value_type: String,
    /// Display rendering of the value (formula text for formula cells)
    pub value: String,
    /// Number format string, if the loader saw one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Whether this is a literal cell (raw data, not derived)
    pub is_input: bool,
}

/// Sheet-level shape of the workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbookStructure {
    /// Sheet names in workbook order
    pub sheet_names: Vec<String>,
    /// Number of sheets
    pub sheet_count: usize,
}

/// A formula referencing another workbook
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ExternalLink {
    /// The formula cell holding the reference, as `Sheet!A1`
    pub referenced_in: String,
    /// The `[Book]` workbook name as written
    pub workbook: String,
}

/// Headline counts over the whole analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub cell_count: usize,
    pub formula_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub pattern_count: usize,
    /// Formulas whose reference extraction was best-effort
    pub warning_count: usize,
}

/// The complete structural analysis of one workbook snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookAnalysis {
    pub structure: WorkbookStructure,
    /// Every valued cell, keyed by `Sheet!A1`
    pub cells: BTreeMap<String, CellInfo>,
    /// Every formula cell, keyed by `Sheet!A1`
    pub formulas: BTreeMap<String, FormulaInfo>,
    pub graph: DependencyGraph,
    pub calculation_order: CalculationOrder,
    pub data_flow: DataFlowClassification,
    pub patterns: Vec<Pattern>,
    pub external_links: Vec<ExternalLink>,
    pub summary: AnalysisSummary,
}

/// Pipeline tuning
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Pattern detection settings
    pub patterns: PatternOptions,
}

/// Run the full analysis with default options
pub fn analyze(snapshot: &WorkbookSnapshot) -> WorkbookAnalysis {
    analyze_with_options(snapshot, &AnalysisOptions::default())
}

/// Run the full analysis pipeline over a snapshot
pub fn analyze_with_options(
    snapshot: &WorkbookSnapshot,
    options: &AnalysisOptions,
) -> WorkbookAnalysis {
    let structure = WorkbookStructure {
        sheet_names: snapshot
            .sheet_names()
            .into_iter()
            .map(String::from)
            .collect(),
        sheet_count: snapshot.sheet_count(),
    };

    let mut cells = BTreeMap::new();
    for sheet in snapshot.sheets() {
        for (addr, record) in sheet.cells() {
            if record.value.is_empty() {
                continue;
            }
            cells.insert(
                format!("{}!{}", sheet.name(), addr.to_a1_string()),
                CellInfo {
                    value_type: record.value.type_name().to_string(),
                    value: record.value.to_string(),
                    format: record.format.clone(),
                    is_input: record.value.is_literal(),
                },
            );
        }
    }
    tracing::debug!(cell_count = cells.len(), "collected cell table");

    let mut formulas = BTreeMap::new();
    let mut external_links = Vec::new();
    for (sheet, addr, text) in snapshot.formula_cells() {
        let key = format!("{}!{}", sheet, addr.to_a1_string());
        let parsed = ParsedFormula::parse(text);
        for workbook in &parsed.external_links {
            external_links.push(ExternalLink {
                referenced_in: key.clone(),
                workbook: workbook.clone(),
            });
        }
        formulas.insert(
            key,
            FormulaInfo {
                raw_formula: text.to_string(),
                depends_on: parsed.resolved(sheet),
                complexity: Complexity::assess(text, parsed.functions.len()),
                used_functions: parsed.functions,
                length: text.len(),
                parse_warning: parsed.parse_warning,
            },
        );
    }
    external_links.sort_unstable();
    tracing::debug!(
        formula_count = formulas.len(),
        external_links = external_links.len(),
        "parsed formulas"
    );

    let graph = DependencyGraph::build(
        formulas
            .iter()
            .map(|(cell, info)| (cell.as_str(), info.depends_on.iter().map(String::as_str))),
    );
    tracing::debug!(edge_count = graph.edge_count(), "built dependency graph");

    let calculation_order = order::resolve_order(&graph);
    tracing::debug!(
        sequence_len = calculation_order.sequence.len(),
        cycle_count = calculation_order.cycles.len(),
        "resolved calculation order"
    );

    let data_flow = dataflow::classify(snapshot, &graph);
    let patterns = pattern::detect_patterns(snapshot, &options.patterns);
    tracing::debug!(pattern_count = patterns.len(), "detected patterns");

    let summary = AnalysisSummary {
        cell_count: cells.len(),
        formula_count: formulas.len(),
        edge_count: graph.edge_count(),
        cycle_count: calculation_order.cycles.len(),
        pattern_count: patterns.len(),
        warning_count: formulas.values().filter(|f| f.parse_warning).count(),
    };

    WorkbookAnalysis {
        structure,
        cells,
        formulas,
        graph,
        calculation_order,
        data_flow,
        patterns,
        external_links,
        summary,
    }
}
