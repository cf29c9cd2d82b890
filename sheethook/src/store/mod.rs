//! Tabular store abstraction
//!
//! The upsert engine and the config resolver never talk to a spreadsheet
//! backend directly; they go through [`SheetStore`], which exposes the
//! handful of range operations the service needs. [`MemoryStore`] backs
//! tests, [`WorkbookStore`] persists to an `.xlsx` workbook on disk.

pub mod memory;
pub mod workbook;

pub use memory::MemoryStore;
pub use workbook::WorkbookStore;

use thiserror::Error;

use crate::upsert::CellValue;

/// Error from a store operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sheet \"{0}\" not found")]
    SheetNotFound(String),

    #[error("row {row} out of range for sheet \"{sheet}\"")]
    RowOutOfRange { sheet: String, row: usize },

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Narrow interface over a tabular store holding named sheets.
///
/// A sheet is a rectangular grid of cells; row 0 is the header row of
/// physical column names, rows 1.. are data rows. Row indices passed to
/// [`SheetStore::write_row`] address the full grid, header included.
pub trait SheetStore {
    /// Names of the sheets present in the store
    fn sheet_names(&self) -> Vec<String>;

    /// Read the full used range of a sheet, header row first
    fn read_range(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError>;

    /// Overwrite one full row at `row_index` (0 is the header row)
    fn write_row(
        &mut self,
        sheet: &str,
        row_index: usize,
        row: Vec<CellValue>,
    ) -> Result<(), StoreError>;

    /// Append one full row below the current last row
    fn append_row(&mut self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError>;

    /// The header row as plain text labels
    fn header_row(&self, sheet: &str) -> Result<Vec<String>, StoreError> {
        let rows = self.read_range(sheet)?;
        Ok(rows
            .first()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .unwrap_or_default())
    }

    /// Check whether a sheet exists
    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|n| n == name)
    }
}

/// Pad every row of a grid to a uniform width with empty cells
pub(crate) fn normalize_grid(rows: &mut Vec<Vec<CellValue>>) {
    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    for row in rows {
        row.resize(width, CellValue::empty());
    }
}
