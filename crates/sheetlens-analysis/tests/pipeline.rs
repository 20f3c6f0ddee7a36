//! End-to-end pipeline tests over a workbook exercising every stage at once:
//! cross-sheet references, ranges, a reference cycle, a repeated column
//! pattern, an external workbook link, and a malformed formula.

use pretty_assertions::assert_eq;
use sheetlens_analysis::{analyze, ExternalLink, PatternAxis};
use sheetlens_core::WorkbookSnapshot;

fn sample_workbook() -> WorkbookSnapshot {
    let mut b = WorkbookSnapshot::builder();
    b.add_sheet("Sheet1").unwrap();
    b.add_sheet("Data").unwrap();

    b.set_value("Sheet1", "A1", 10.0).unwrap();
    b.set_value("Sheet1", "A2", 20.0).unwrap();
    b.set_formula("Sheet1", "A3", "=A1+A2").unwrap();

    // Cross-sheet dependency
    b.set_value("Data", "B2", 5.0).unwrap();
    b.set_formula("Sheet1", "B1", "=Data!B2*2").unwrap();

    // Repeated column pattern, C2:C4
    b.set_formula("Sheet1", "C2", "=A2+1").unwrap();
    b.set_formula("Sheet1", "C3", "=A3+1").unwrap();
    b.set_formula("Sheet1", "C4", "=A4+1").unwrap();

    // A two-cell reference cycle
    b.set_formula("Sheet1", "D1", "=E1").unwrap();
    b.set_formula("Sheet1", "E1", "=D1").unwrap();

    // External workbook link and a malformed formula
    b.set_formula("Sheet1", "F1", "=[Ext.xlsx]S!A1+A1").unwrap();
    b.set_formula("Sheet1", "G1", "='Oops!A1").unwrap();

    b.finish()
}

#[test]
fn summary_counts() {
    let analysis = analyze(&sample_workbook());

    assert_eq!(analysis.structure.sheet_names, vec!["Sheet1", "Data"]);
    assert_eq!(analysis.summary.cell_count, 12);
    assert_eq!(analysis.summary.formula_count, 9);
    assert_eq!(analysis.summary.edge_count, 9);
    assert_eq!(analysis.summary.cycle_count, 1);
    assert_eq!(analysis.summary.pattern_count, 1);
    assert_eq!(analysis.summary.warning_count, 1);
}

#[test]
fn graph_and_order() {
    let analysis = analyze(&sample_workbook());

    assert!(analysis.graph.forward()["Sheet1!B1"].contains("Data!B2"));
    assert!(analysis.graph.has_dependents("Sheet1!A3"));

    // Every formula cell appears exactly once, dependencies first
    let sequence = &analysis.calculation_order.sequence;
    assert_eq!(sequence.len(), 9);
    let pos = |cell: &str| sequence.iter().position(|c| c == cell).unwrap();
    assert!(pos("Sheet1!A3") < pos("Sheet1!C3"));

    assert!(analysis.calculation_order.is_cyclic("Sheet1!D1"));
    assert!(analysis.calculation_order.is_cyclic("Sheet1!E1"));
    assert!(!analysis.calculation_order.is_cyclic("Sheet1!A3"));
}

#[test]
fn data_flow_partition() {
    let analysis = analyze(&sample_workbook());
    let flow = &analysis.data_flow;

    assert_eq!(flow.inputs, vec!["Data!B2", "Sheet1!A1", "Sheet1!A2"]);
    assert_eq!(
        flow.calculations,
        vec!["Sheet1!A3", "Sheet1!D1", "Sheet1!E1"]
    );
    assert_eq!(
        flow.outputs,
        vec![
            "Sheet1!B1",
            "Sheet1!C2",
            "Sheet1!C3",
            "Sheet1!C4",
            "Sheet1!F1",
            "Sheet1!G1"
        ]
    );
}

#[test]
fn patterns_and_external_links() {
    let analysis = analyze(&sample_workbook());

    assert_eq!(analysis.patterns.len(), 1);
    let p = &analysis.patterns[0];
    assert_eq!(p.template, "A{row}+1");
    assert_eq!(p.range, "Sheet1!C2:C4");
    assert_eq!(
        p.axis,
        PatternAxis::Column {
            letters: "C".into()
        }
    );

    assert_eq!(
        analysis.external_links,
        vec![ExternalLink {
            referenced_in: "Sheet1!F1".into(),
            workbook: "Ext.xlsx".into(),
        }]
    );
}

#[test]
fn export_is_plain_json() {
    let analysis = analyze(&sample_workbook());
    let v = serde_json::to_value(&analysis).unwrap();

    assert!(v["graph"]["forward"].is_object());
    assert!(v["graph"]["forward"]["Sheet1!A3"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("Sheet1!A1")));
    assert!(v["calculation_order"]["sequence"].is_array());
    assert_eq!(v["formulas"]["Sheet1!A3"]["complexity"], "low");
    assert_eq!(v["formulas"]["Sheet1!A3"]["raw_formula"], "=A1+A2");
    assert_eq!(v["cells"]["Sheet1!A1"]["value_type"], "number");
    assert_eq!(v["patterns"][0]["axis"], "column");
    assert_eq!(v["patterns"][0]["letters"], "C");
    assert_eq!(v["summary"]["formula_count"], 9);
}
