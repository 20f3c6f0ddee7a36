//! Reference extraction from formula text
//!
//! A small single-pass lexer over the formula grammar's reference-bearing
//! tokens: string literals, quoted and bare sheet qualifiers, cell
//! coordinates, ranges, function calls, and external `[Book]` prefixes.
//! Everything else (operators, numbers, named ranges) is skipped.
//!
//! The extractor is total: malformed input never raises. Anything the lexer
//! cannot make sense of sets the parse-warning flag and scanning continues
//! with whatever references could still be recovered.
//!
//! Disambiguation rules:
//! - A token immediately followed by `(` is a function name, never a cell
//!   reference (`LOG10(...)` is a function even though `LOG10` is shaped
//!   like a coordinate).
//! - `$` absolute markers are stripped during normalization.
//! - References into another workbook (`[Book.xlsx]Sheet!A1`) are reported
//!   as external links, not as dependency references.

use crate::error::RefParseError;
use sheetlens_core::{CellAddress, CellRange};
use std::collections::BTreeSet;

/// A reference as written in a formula, before sheet resolution
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawReference {
    /// Explicit sheet qualifier, if the formula had one (unquoted form)
    pub sheet: Option<String>,
    /// The referenced cell or range; a single cell is a degenerate range
    pub range: CellRange,
}

impl RawReference {
    /// Normalize to the canonical `Sheet!Coord[:Coord]` form, resolving a
    /// missing qualifier against the formula cell's own sheet
    pub fn normalized(&self, home_sheet: &str) -> String {
        let sheet = self.sheet.as_deref().unwrap_or(home_sheet);
        format!("{}!{}", sheet, self.range.to_a1_string())
    }
}

/// Everything the lexer recovered from one formula
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFormula {
    /// Distinct references, in written (unresolved) form
    pub references: BTreeSet<RawReference>,
    /// Distinct function names used, uppercased
    pub functions: BTreeSet<String>,
    /// Workbook names referenced via `[Book]` syntax
    pub external_links: BTreeSet<String>,
    /// Set when the lexer hit something it could not make sense of
    pub parse_warning: bool,
}

impl ParsedFormula {
    /// Lex a formula's text (leading `=` optional) into its reference set
    pub fn parse(text: &str) -> Self {
        let body = text.strip_prefix('=').unwrap_or(text);
        RefScanner::new(body).run()
    }

    /// Normalized reference strings, resolved against `home_sheet`
    pub fn resolved(&self, home_sheet: &str) -> BTreeSet<String> {
        self.references
            .iter()
            .map(|r| r.normalized(home_sheet))
            .collect()
    }
}

/// Parse one formula into its normalized reference set
///
/// # Example
/// ```
/// use sheetlens_analysis::parse_references;
///
/// let refs = parse_references("='My Sheet'!B2+A1", "Sheet1");
/// assert!(refs.contains("My Sheet!B2"));
/// assert!(refs.contains("Sheet1!A1"));
/// ```
pub fn parse_references(text: &str, home_sheet: &str) -> BTreeSet<String> {
    ParsedFormula::parse(text).resolved(home_sheet)
}

struct RefScanner<'a> {
    input: &'a str,
    pos: usize,
    out: ParsedFormula,
}

impl<'a> RefScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: ParsedFormula::default(),
        }
    }

    fn run(mut self) -> ParsedFormula {
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    if let Err(e) = self.skip_string_literal() {
                        self.warn(e);
                    }
                }
                '\'' => match self.scan_quoted_sheet() {
                    Ok(sheet) => {
                        if !self.handle_quoted_external(&sheet) {
                            self.scan_reference_body(Some(sheet));
                        }
                    }
                    Err(e) => self.warn(e),
                },
                '[' => {
                    if let Err(e) = self.scan_external_reference() {
                        self.warn(e);
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => self.scan_token(),
                c if c.is_ascii_digit() => self.skip_number(),
                _ => self.advance(),
            }
        }
        self.out
    }

    // === Token handlers ===

    /// Identifier-shaped token: function name, bare sheet qualifier, cell
    /// coordinate, or plain identifier (named range, TRUE/FALSE)
    fn scan_token(&mut self) {
        let token = self.scan_ident();

        // Function call: consume the name, leave '(' to the main loop
        if self.peek_char() == Some('(') {
            self.out.functions.insert(token.to_uppercase());
            return;
        }

        // Bare sheet qualifier
        if self.peek_char() == Some('!') {
            self.advance();
            self.scan_reference_body(Some(token));
            return;
        }

        // Cell coordinate, possibly the start of a range
        if let Some(start) = coordinate(&token) {
            self.finish_reference(None, start);
        }

        // Anything else is a named range or literal keyword; no reference.
    }

    /// After a sheet qualifier: a coordinate (or range) must follow
    fn scan_reference_body(&mut self, sheet: Option<String>) {
        let token = self.scan_ident();
        match coordinate(&token) {
            Some(start) => self.finish_reference(sheet, start),
            None => self.warn(RefParseError::ExpectedCoordinate(
                sheet.unwrap_or_default(),
            )),
        }
    }

    /// Emit a reference for `start`, extending it to a range if `:coord` follows
    fn finish_reference(&mut self, sheet: Option<String>, start: CellAddress) {
        let range = match self.try_scan_range_end(&start) {
            Some(end) => CellRange::new(start, end),
            None => CellRange::single(start),
        };
        self.out.references.insert(RawReference { sheet, range });
    }

    fn try_scan_range_end(&mut self, start: &CellAddress) -> Option<CellAddress> {
        if self.peek_char() != Some(':') {
            return None;
        }
        self.advance();
        let token = self.scan_ident();
        match coordinate(&token) {
            Some(end) => Some(end),
            None => {
                self.warn(RefParseError::DanglingRangeSeparator(start.to_a1_string()));
                None
            }
        }
    }

    /// `[Book.xlsx]Sheet!A1` — record the workbook name, discard the rest of
    /// the reference so it never becomes a same-workbook dependency edge
    fn scan_external_reference(&mut self) -> Result<(), RefParseError> {
        self.advance(); // '['
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == ']' {
                let book = self.input[start..self.pos].to_string();
                self.advance();
                if !book.is_empty() {
                    self.out.external_links.insert(book);
                }
                self.discard_reference_tail();
                return Ok(());
            }
            self.advance();
        }
        Err(RefParseError::UnterminatedExternalRef)
    }

    /// Consume `Sheet!A1[:B2]` without recording a reference
    fn discard_reference_tail(&mut self) {
        if self.peek_char() == Some('\'') {
            let _ = self.scan_quoted_sheet();
        } else {
            self.scan_ident();
            if self.peek_char() == Some('!') {
                self.advance();
            }
        }
        self.scan_ident();
        if self.peek_char() == Some(':') {
            self.advance();
            self.scan_ident();
        }
    }

    // === Lexing primitives ===

    /// Scan an identifier-shaped token (letters, digits, `_`, `$`, `.`)
    fn scan_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.' {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    /// Quoted sheet name: `'My Sheet'!` (doubled `''` escapes a quote).
    /// A quoted external reference (`'[Book]Sheet'!A1`) is redirected to the
    /// external-link list.
    fn scan_quoted_sheet(&mut self) -> Result<String, RefParseError> {
        self.advance(); // opening quote
        let mut name = String::new();
        loop {
            match self.peek_char() {
                None => return Err(RefParseError::UnterminatedSheetName),
                Some('\'') => {
                    if self.peek_char_at(1) == Some('\'') {
                        name.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    name.push(c);
                    self.advance();
                }
            }
        }

        if self.peek_char() == Some('!') {
            self.advance();
        } else {
            return Err(RefParseError::ExpectedCoordinate(name));
        }

        Ok(name)
    }

    /// A quoted qualifier of the form `[Book.xlsx]Sheet` names an external
    /// workbook: record the link, consume the coordinate, emit no reference.
    fn handle_quoted_external(&mut self, sheet: &str) -> bool {
        let Some(rest) = sheet.strip_prefix('[') else {
            return false;
        };
        let Some((book, _sheet)) = rest.split_once(']') else {
            return false;
        };
        if !book.is_empty() {
            self.out.external_links.insert(book.to_string());
        }
        self.scan_ident();
        if self.peek_char() == Some(':') {
            self.advance();
            self.scan_ident();
        }
        true
    }

    fn skip_string_literal(&mut self) -> Result<(), RefParseError> {
        self.advance(); // opening quote
        while let Some(c) = self.peek_char() {
            if c == '"' {
                if self.peek_char_at(1) == Some('"') {
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    return Ok(());
                }
            } else {
                self.advance();
            }
        }
        Err(RefParseError::UnterminatedString)
    }

    fn skip_number(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' {
                self.advance();
            } else {
                break;
            }
        }
        // Exponent part
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let after = self.peek_char_at(1);
            let after_sign = self.peek_char_at(2);
            if after.is_some_and(|c| c.is_ascii_digit())
                || (matches!(after, Some('+') | Some('-'))
                    && after_sign.is_some_and(|c| c.is_ascii_digit()))
            {
                self.advance();
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.advance();
                }
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
    }

    fn warn(&mut self, error: RefParseError) {
        tracing::trace!(%error, "formula lex warning");
        self.out.parse_warning = true;
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}

/// Parse a token as a cell coordinate, if it is shaped like one.
/// `$` markers are stripped; out-of-bounds "coordinates" (e.g. `Sheet1`,
/// whose letters overflow the column space) are not coordinates.
fn coordinate(token: &str) -> Option<CellAddress> {
    if token.is_empty() || token.contains('.') || token.contains('_') {
        return None;
    }
    CellAddress::parse(token).ok()
}
