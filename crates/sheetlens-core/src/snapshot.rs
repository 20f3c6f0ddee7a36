//! Immutable workbook snapshot
//!
//! The external loader walks the workbook container and feeds every cell into
//! a [`SnapshotBuilder`]; [`SnapshotBuilder::finish`] then yields a
//! [`WorkbookSnapshot`] with no mutating API. The whole analysis is a pure
//! function of this snapshot.

use crate::cell::{CellAddress, CellRecord, CellValue};
use crate::error::{Error, Result};
use crate::MAX_SHEET_NAME_LEN;
use ahash::AHashMap;

/// One sheet's cells, immutable once built
#[derive(Debug, Clone)]
pub struct SheetSnapshot {
    name: String,
    cells: AHashMap<CellAddress, CellRecord>,
}

impl SheetSnapshot {
    /// The sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of loaded (non-empty) cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Look up a cell by address
    pub fn cell(&self, addr: &CellAddress) -> Option<&CellRecord> {
        self.cells.get(addr)
    }

    /// Look up a cell by A1-notation address
    pub fn cell_at(&self, a1: &str) -> Result<Option<&CellRecord>> {
        let addr = CellAddress::parse(a1)?;
        Ok(self.cells.get(&addr))
    }

    /// Iterate all loaded cells
    pub fn cells(&self) -> impl Iterator<Item = (&CellAddress, &CellRecord)> {
        self.cells.iter()
    }

    /// Iterate formula cells as (address, formula text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (&CellAddress, &str)> {
        self.cells
            .iter()
            .filter_map(|(addr, rec)| rec.value.formula_text().map(|text| (addr, text)))
    }
}

/// The immutable cell table the analysis runs over
#[derive(Debug, Clone)]
pub struct WorkbookSnapshot {
    sheets: Vec<SheetSnapshot>,
}

impl WorkbookSnapshot {
    /// Start building a snapshot
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Iterate sheets in workbook order
    pub fn sheets(&self) -> impl Iterator<Item = &SheetSnapshot> {
        self.sheets.iter()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name()).collect()
    }

    /// Look up a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&SheetSnapshot> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Total number of loaded cells across all sheets
    pub fn cell_count(&self) -> usize {
        self.sheets.iter().map(|s| s.cell_count()).sum()
    }

    /// Iterate every formula cell as (sheet name, address, formula text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (&str, &CellAddress, &str)> {
        self.sheets.iter().flat_map(|sheet| {
            sheet
                .formula_cells()
                .map(move |(addr, text)| (sheet.name(), addr, text))
        })
    }
}

/// Builder the loader fills in; produces an immutable [`WorkbookSnapshot`]
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    sheets: Vec<SheetSnapshot>,
    index: AHashMap<String, usize>,
}

impl SnapshotBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet. Names must be unique and at most 31 characters.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        let name = name.into();
        if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(name));
        }
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateSheetName(name));
        }
        self.index.insert(name.clone(), self.sheets.len());
        self.sheets.push(SheetSnapshot {
            name,
            cells: AHashMap::new(),
        });
        Ok(self)
    }

    /// Store a full cell record at an A1-notation address
    pub fn set_cell(&mut self, sheet: &str, a1: &str, record: CellRecord) -> Result<&mut Self> {
        let addr = CellAddress::parse(a1)?;
        let idx = *self
            .index
            .get(sheet)
            .ok_or_else(|| Error::SheetNotFound(sheet.to_string()))?;
        self.sheets[idx].cells.insert(addr, record);
        Ok(self)
    }

    /// Store a literal value
    pub fn set_value(
        &mut self,
        sheet: &str,
        a1: &str,
        value: impl Into<CellValue>,
    ) -> Result<&mut Self> {
        self.set_cell(sheet, a1, CellRecord::new(value.into()))
    }

    /// Store a formula (leading `=` added if missing)
    pub fn set_formula(&mut self, sheet: &str, a1: &str, text: &str) -> Result<&mut Self> {
        self.set_cell(sheet, a1, CellRecord::new(CellValue::formula(text)))
    }

    /// Finish building; the snapshot is immutable from here on
    pub fn finish(self) -> WorkbookSnapshot {
        WorkbookSnapshot {
            sheets: self.sheets,
        }
    }
}
