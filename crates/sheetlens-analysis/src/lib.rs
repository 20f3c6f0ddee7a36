//! Structural analysis of spreadsheet formulas
//!
//! Given an immutable [`WorkbookSnapshot`](sheetlens_core::WorkbookSnapshot),
//! this crate extracts the workbook's computational structure without
//! evaluating anything:
//!
//! - reference extraction from formula text ([`references`]),
//! - the cell dependency graph, forward and reverse ([`graph`]),
//! - a cycle-safe calculation order ([`order`]),
//! - input / calculation / output data-flow classification ([`dataflow`]),
//! - repeated formula template detection ([`pattern`]),
//! - per-formula complexity tiers ([`complexity`]).
//!
//! [`analyze`] runs the whole pipeline and returns a serializable
//! [`WorkbookAnalysis`].
//!
//! ```
//! use sheetlens_analysis::analyze;
//! use sheetlens_core::WorkbookSnapshot;
//!
//! let mut b = WorkbookSnapshot::builder();
//! b.add_sheet("Sheet1").unwrap();
//! b.set_value("Sheet1", "A1", 10.0).unwrap();
//! b.set_value("Sheet1", "A2", 20.0).unwrap();
//! b.set_formula("Sheet1", "A3", "=A1+A2").unwrap();
//!
//! let analysis = analyze(&b.finish());
//! assert_eq!(analysis.calculation_order.sequence, vec!["Sheet1!A3"]);
//! assert_eq!(analysis.data_flow.inputs, vec!["Sheet1!A1", "Sheet1!A2"]);
//! ```

pub mod complexity;
pub mod context;
pub mod dataflow;
pub mod error;
pub mod graph;
pub mod order;
pub mod pattern;
pub mod references;

pub use complexity::Complexity;
pub use context::{
    analyze, analyze_with_options, AnalysisOptions, AnalysisSummary, CellInfo, ExternalLink,
    FormulaInfo, WorkbookAnalysis, WorkbookStructure,
};
pub use dataflow::{classify, DataFlowClassification};
pub use error::RefParseError;
pub use graph::DependencyGraph;
pub use order::{resolve_order, CalculationOrder, CycleWitness};
pub use pattern::{detect_patterns, Pattern, PatternAxis, PatternOptions};
pub use references::{parse_references, ParsedFormula, RawReference};
