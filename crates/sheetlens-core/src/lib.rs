//! # sheetlens-core
//!
//! Immutable workbook data model for the sheetlens analysis engine.
//!
//! This crate provides the types the external workbook loader produces and
//! the analysis engine consumes:
//! - [`CellAddress`] and [`CellRange`] - A1-notation addressing
//! - [`CellValue`] and [`CellRecord`] - literal-or-formula cell contents
//! - [`WorkbookSnapshot`] and [`SnapshotBuilder`] - the build-once cell table
//!
//! ## Example
//!
//! ```rust
//! use sheetlens_core::WorkbookSnapshot;
//!
//! let mut builder = WorkbookSnapshot::builder();
//! builder.add_sheet("Sheet1").unwrap();
//! builder.set_value("Sheet1", "A1", 10.0).unwrap();
//! builder.set_formula("Sheet1", "A2", "=A1*2").unwrap();
//! let snapshot = builder.finish();
//!
//! assert_eq!(snapshot.formula_cells().count(), 1);
//! ```

pub mod cell;
pub mod error;
pub mod snapshot;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellRecord, CellValue};
pub use error::{Error, Result};
pub use snapshot::{SheetSnapshot, SnapshotBuilder, WorkbookSnapshot};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
