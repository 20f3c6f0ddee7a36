//! Repeated formula template detection
//!
//! Formulas are grouped per sheet by column (and optionally by row). Within
//! a group, each formula is reduced to a template by substituting the cell's
//! own row number (or column letters) inside coordinate-shaped tokens, and a
//! pattern is reported only when every formula in the group reduces to the
//! same template — all or nothing, no majority vote.
//!
//! Substitution is scoped strictly to `<letters><digits>` tokens outside
//! string literals, and a token followed by `(` is a function name and is
//! left alone. A bare numeric literal that happens to equal the row number
//! is never rewritten.

use ahash::AHashMap;
use serde::Serialize;
use sheetlens_core::{CellAddress, WorkbookSnapshot};

/// Which way a repeated block runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum PatternAxis {
    /// A column of formulas repeated down consecutive-ish rows
    Column {
        /// Column letters, e.g. "C"
        letters: String,
    },
    /// A row of formulas repeated across columns
    Row {
        /// 1-based row number
        number: u32,
    },
}

/// A block of formulas identical up to their own row/column index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    /// Sheet the block lives on
    pub sheet: String,
    /// Column or row orientation
    #[serde(flatten)]
    pub axis: PatternAxis,
    /// First covered index: row number for a column pattern, 1-based column
    /// number for a row pattern
    pub start: u32,
    /// Last covered index (same meaning as `start`)
    pub end: u32,
    /// Covered block in `Sheet!C2:C5` form
    pub range: String,
    /// Shared formula body with the varying index abstracted; no leading `=`
    pub template: String,
    /// Number of formulas the template covers
    pub count: usize,
}

/// Pattern detection tuning
#[derive(Debug, Clone)]
pub struct PatternOptions {
    /// Minimum formulas in a group before a template is considered
    pub min_group_size: usize,
    /// Also scan for row-oriented patterns (off by default)
    pub detect_rows: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            min_group_size: 3,
            detect_rows: false,
        }
    }
}

/// Detect repeated formula templates across the whole snapshot
pub fn detect_patterns(snapshot: &WorkbookSnapshot, options: &PatternOptions) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    for sheet in snapshot.sheets() {
        let mut by_column: AHashMap<u16, Vec<(u32, &str)>> = AHashMap::new();
        let mut by_row: AHashMap<u32, Vec<(u16, &str)>> = AHashMap::new();

        for (addr, text) in sheet.formula_cells() {
            by_column.entry(addr.col).or_default().push((addr.row, text));
            if options.detect_rows {
                by_row.entry(addr.row).or_default().push((addr.col, text));
            }
        }

        let mut columns: Vec<_> = by_column.into_iter().collect();
        columns.sort_unstable_by_key(|(col, _)| *col);
        for (col, mut group) in columns {
            if group.len() < options.min_group_size {
                continue;
            }
            group.sort_unstable_by_key(|(row, _)| *row);
            if let Some(pattern) = column_pattern(sheet.name(), col, &group) {
                patterns.push(pattern);
            }
        }

        let mut rows: Vec<_> = by_row.into_iter().collect();
        rows.sort_unstable_by_key(|(row, _)| *row);
        for (row, mut group) in rows {
            if group.len() < options.min_group_size {
                continue;
            }
            group.sort_unstable_by_key(|(col, _)| *col);
            if let Some(pattern) = row_pattern(sheet.name(), row, &group) {
                patterns.push(pattern);
            }
        }
    }

    patterns
}

fn column_pattern(sheet: &str, col: u16, group: &[(u32, &str)]) -> Option<Pattern> {
    let template = shared_template(group.iter().map(|(row, text)| {
        let own_row = (row + 1).to_string();
        substitute_coordinate_tokens(strip_marker(text), |letters, digits| {
            (digits == own_row).then(|| format!("{}{{row}}", letters))
        })
    }))?;

    let letters = CellAddress::column_to_letters(col);
    let first = group.first()?.0 + 1;
    let last = group.last()?.0 + 1;
    Some(Pattern {
        sheet: sheet.to_string(),
        axis: PatternAxis::Column {
            letters: letters.clone(),
        },
        start: first,
        end: last,
        range: format!("{}!{}{}:{}{}", sheet, letters, first, letters, last),
        template,
        count: group.len(),
    })
}

fn row_pattern(sheet: &str, row: u32, group: &[(u16, &str)]) -> Option<Pattern> {
    let template = shared_template(group.iter().map(|(col, text)| {
        let own_letters = CellAddress::column_to_letters(*col);
        substitute_coordinate_tokens(strip_marker(text), |letters, digits| {
            letters
                .eq_ignore_ascii_case(&own_letters)
                .then(|| format!("{{col}}{}", digits))
        })
    }))?;

    let number = row + 1;
    let first = group.first()?.0;
    let last = group.last()?.0;
    Some(Pattern {
        sheet: sheet.to_string(),
        axis: PatternAxis::Row { number },
        start: u32::from(first) + 1,
        end: u32::from(last) + 1,
        range: format!(
            "{}!{}{}:{}{}",
            sheet,
            CellAddress::column_to_letters(first),
            number,
            CellAddress::column_to_letters(last),
            number
        ),
        template,
        count: group.len(),
    })
}

/// All templates must agree, otherwise the group has no pattern
fn shared_template(mut templates: impl Iterator<Item = String>) -> Option<String> {
    let first = templates.next()?;
    templates.all(|t| t == first).then_some(first)
}

fn strip_marker(text: &str) -> &str {
    text.strip_prefix('=').unwrap_or(text)
}

/// Rewrite `<letters><digits>` tokens via `subst`, leaving string literals,
/// function names, and everything else untouched
fn substitute_coordinate_tokens(
    text: &str,
    subst: impl Fn(&str, &str) -> Option<String>,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if c == '"' {
                if chars.get(i + 1) == Some(&'"') {
                    out.push('"');
                    i += 2;
                    continue;
                }
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() && token_boundary(&chars, i) {
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_alphabetic() {
                j += 1;
            }
            let mut k = j;
            while k < chars.len() && chars[k].is_ascii_digit() {
                k += 1;
            }

            let next = chars.get(k).copied();
            let clean_end =
                !matches!(next, Some(n) if n.is_ascii_alphanumeric() || n == '_' || n == '.');
            let is_function = next == Some('(');

            if k > j && clean_end && !is_function {
                let letters: String = chars[i..j].iter().collect();
                let digits: String = chars[j..k].iter().collect();
                if let Some(replacement) = subst(&letters, &digits) {
                    out.push_str(&replacement);
                    i = k;
                    continue;
                }
            }

            // No substitution: emit the letters, rescan from the digits
            out.extend(chars[i..j].iter());
            i = j;
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// A coordinate token must not be glued to a preceding identifier character
fn token_boundary(chars: &[char], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    let prev = chars[i - 1];
    !(prev.is_ascii_alphanumeric() || prev == '_' || prev == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_subst(text: &str, row: u32) -> String {
        let own = row.to_string();
        substitute_coordinate_tokens(text, |letters, digits| {
            (digits == own).then(|| format!("{}{{row}}", letters))
        })
    }

    #[test]
    fn test_substitution_basics() {
        assert_eq!(row_subst("A2*B2", 2), "A{row}*B{row}");
        assert_eq!(row_subst("A2+A3", 2), "A{row}+A3");
        assert_eq!(row_subst("$A$2+B2", 2), "$A${row}+B{row}");
    }

    #[test]
    fn test_bare_number_is_never_substituted() {
        // The constant 24 on row 24 stays a constant
        assert_eq!(row_subst("A24+24", 24), "A{row}+24");
        assert_eq!(row_subst("24*2", 24), "24*2");
    }

    #[test]
    fn test_function_names_are_not_substituted() {
        assert_eq!(row_subst("LOG10(A10)", 10), "LOG10(A{row})");
    }

    #[test]
    fn test_row_number_must_match_exactly() {
        assert_eq!(row_subst("A22+A2", 2), "A22+A{row}");
    }

    #[test]
    fn test_string_literals_are_untouched() {
        assert_eq!(row_subst("IF(A2,\"A2\",0)", 2), "IF(A{row},\"A2\",0)");
    }

    #[test]
    fn test_glued_identifiers_are_untouched() {
        assert_eq!(row_subst("Tax_A2+A2", 2), "Tax_A2+A{row}");
    }

    fn snapshot(cells: &[(&str, &str)]) -> WorkbookSnapshot {
        let mut b = WorkbookSnapshot::builder();
        b.add_sheet("Sheet1").unwrap();
        for (a1, formula) in cells {
            b.set_formula("Sheet1", a1, formula).unwrap();
        }
        b.finish()
    }

    #[test]
    fn test_column_pattern_detected() {
        let snap = snapshot(&[
            ("C2", "=A2*B2"),
            ("C3", "=A3*B3"),
            ("C4", "=A4*B4"),
            ("C5", "=A5*B5"),
        ]);
        let patterns = detect_patterns(&snap, &PatternOptions::default());

        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.template, "A{row}*B{row}");
        assert_eq!(p.count, 4);
        assert_eq!((p.start, p.end), (2, 5));
        assert_eq!(p.range, "Sheet1!C2:C5");
        assert_eq!(
            p.axis,
            PatternAxis::Column {
                letters: "C".into()
            }
        );
    }

    #[test]
    fn test_one_mismatch_kills_the_pattern() {
        let snap = snapshot(&[
            ("C2", "=A2*B2"),
            ("C3", "=A3*B3"),
            ("C4", "=A4*B4"),
            ("C5", "=A5+B5"),
        ]);
        let patterns = detect_patterns(&snap, &PatternOptions::default());
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_group_below_minimum_is_ignored() {
        let snap = snapshot(&[("C2", "=A2*B2"), ("C3", "=A3*B3")]);
        assert!(detect_patterns(&snap, &PatternOptions::default()).is_empty());

        let loose = PatternOptions {
            min_group_size: 2,
            ..Default::default()
        };
        assert_eq!(detect_patterns(&snap, &loose).len(), 1);
    }

    #[test]
    fn test_sparse_rows_report_full_span() {
        let snap = snapshot(&[("C2", "=A2"), ("C3", "=A3"), ("C7", "=A7")]);
        let patterns = detect_patterns(&snap, &PatternOptions::default());

        assert_eq!(patterns.len(), 1);
        assert_eq!((patterns[0].start, patterns[0].end), (2, 7));
        assert_eq!(patterns[0].count, 3);
    }

    #[test]
    fn test_shared_constant_survives_in_template() {
        let snap = snapshot(&[("D23", "=A23+24"), ("D24", "=A24+24"), ("D25", "=A25+24")]);
        let patterns = detect_patterns(&snap, &PatternOptions::default());

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].template, "A{row}+24");
    }

    #[test]
    fn test_row_axis_pattern() {
        let snap = snapshot(&[("B4", "=B3*2"), ("C4", "=C3*2"), ("D4", "=D3*2")]);

        // Off by default
        assert!(detect_patterns(&snap, &PatternOptions::default()).is_empty());

        let opts = PatternOptions {
            detect_rows: true,
            ..Default::default()
        };
        let patterns = detect_patterns(&snap, &opts);
        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.axis, PatternAxis::Row { number: 4 });
        assert_eq!(p.template, "{col}3*2");
        assert_eq!(p.range, "Sheet1!B4:D4");
        assert_eq!((p.start, p.end), (2, 4));
    }

    #[test]
    fn test_cross_sheet_references_in_template() {
        let snap = snapshot(&[
            ("B2", "=Data!B2*C2"),
            ("B3", "=Data!B3*C3"),
            ("B4", "=Data!B4*C4"),
        ]);
        let patterns = detect_patterns(&snap, &PatternOptions::default());

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].template, "Data!B{row}*C{row}");
    }
}
