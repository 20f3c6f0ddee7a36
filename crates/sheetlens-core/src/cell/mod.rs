//! Cell-level types: addresses, ranges, and values

mod address;
mod value;

pub use address::{CellAddress, CellRange};
pub use value::{CellRecord, CellValue};
