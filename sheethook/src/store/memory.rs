//! In-memory sheet store

use super::{normalize_grid, SheetStore, StoreError};
use crate::upsert::CellValue;

/// An in-memory [`SheetStore`], used by tests and dry runs.
///
/// Sheets keep their insertion order so reads are deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: Vec<(String, Vec<Vec<CellValue>>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any existing sheet of the same name.
    /// Rows are padded to a uniform width.
    pub fn with_sheet(mut self, name: impl Into<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        normalize_grid(&mut rows);
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = rows,
            None => self.sheets.push((name, rows)),
        }
        self
    }

    /// Direct view of a sheet's rows, for assertions
    pub fn sheet(&self, name: &str) -> Option<&Vec<Vec<CellValue>>> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows)
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Vec<Vec<CellValue>>, StoreError> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows)
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))
    }
}

impl SheetStore for MemoryStore {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_range(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.sheet(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    fn write_row(
        &mut self,
        sheet: &str,
        row_index: usize,
        row: Vec<CellValue>,
    ) -> Result<(), StoreError> {
        let rows = self.sheet_mut(sheet)?;
        if row_index >= rows.len() {
            return Err(StoreError::RowOutOfRange {
                sheet: sheet.to_string(),
                row: row_index,
            });
        }
        rows[row_index] = row;
        normalize_grid(rows);
        Ok(())
    }

    fn append_row(&mut self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
        let rows = self.sheet_mut(sheet)?;
        rows.push(row);
        normalize_grid(rows);
        Ok(())
    }
}
