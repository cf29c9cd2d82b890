//! Workbook-backed sheet store
//!
//! Reads an `.xlsx` workbook into memory with `calamine` and writes the
//! whole workbook back with `rust_xlsxwriter` after every mutation. The
//! file on disk stays the canonical copy; nothing is cached across
//! requests beyond the lifetime of one store instance.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use super::{normalize_grid, SheetStore, StoreError};
use crate::upsert::CellValue;

/// A [`SheetStore`] persisted as an `.xlsx` workbook on disk
#[derive(Debug)]
pub struct WorkbookStore {
    path: PathBuf,
    sheets: Vec<(String, Vec<Vec<CellValue>>)>,
}

impl WorkbookStore {
    /// Open an existing workbook file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut workbook: Xlsx<_> = open_workbook(&path)
            .map_err(|e| StoreError::Workbook(format!("{}: {}", path.display(), e)))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names().to_vec() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| StoreError::Workbook(format!("sheet {}: {}", name, e)))?;

            // The used range may not start at A1; re-anchor so column
            // indices line up with the physical sheet.
            let (row_offset, col_offset) = match range.start() {
                Some((r, c)) => (r as usize, c as usize),
                None => (0, 0),
            };

            let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
            for row in range.rows() {
                let mut cells = vec![CellValue::empty(); col_offset];
                cells.extend(row.iter().map(cell_from_data));
                rows.push(cells);
            }
            normalize_grid(&mut rows);
            sheets.push((name, rows));
        }

        log::debug!(
            "Opened workbook {} with {} sheets",
            path.display(),
            sheets.len()
        );
        Ok(WorkbookStore { path, sheets })
    }

    /// Create a new workbook file with the given sheets, overwriting any
    /// existing file at the path
    pub fn create(
        path: impl AsRef<Path>,
        sheets: Vec<(String, Vec<Vec<CellValue>>)>,
    ) -> Result<Self, StoreError> {
        let mut sheets = sheets;
        for (_, rows) in &mut sheets {
            normalize_grid(rows);
        }
        let store = WorkbookStore {
            path: path.as_ref().to_path_buf(),
            sheets,
        };
        store.save()?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the in-memory sheets back to disk
    fn save(&self) -> Result<(), StoreError> {
        let mut workbook = Workbook::new();
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (name, rows) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(name)
                .map_err(|e| StoreError::Workbook(e.to_string()))?;

            for (r, row) in rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let (r, c) = (r as u32, c as u16);
                    let result = match cell {
                        CellValue::Text(s) if s.is_empty() => continue,
                        CellValue::Text(s) => worksheet.write_string(r, c, s.as_str()),
                        CellValue::Number(n) => worksheet.write_number(r, c, *n),
                        CellValue::Bool(b) => worksheet.write_boolean(r, c, *b),
                        CellValue::DateTime(dt) => worksheet.write_datetime_with_format(
                            r,
                            c,
                            &dt.naive_utc(),
                            &datetime_format,
                        ),
                    };
                    result.map_err(|e| StoreError::Workbook(e.to_string()))?;
                }
            }
        }

        workbook
            .save(&self.path)
            .map_err(|e| StoreError::Workbook(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Vec<Vec<CellValue>>, StoreError> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows)
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))
    }
}

/// Convert a calamine cell into a [`CellValue`].
///
/// Date cells become UTC instants; the workbook itself carries no zone, so
/// the stored wall time is taken as UTC.
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::empty(),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive.and_utc()),
            None => CellValue::Text(dt.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::empty(),
    }
}

impl SheetStore for WorkbookStore {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_range(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.sheets
            .iter()
            .find(|(n, _)| n == sheet)
            .map(|(_, rows)| rows.clone())
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
        self.save()
    }

    fn append_row(&mut self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
        let rows = self.sheet_mut(sheet)?;
        rows.push(row);
        normalize_grid(rows);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_create_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.xlsx");

        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        WorkbookStore::create(
            &path,
            vec![(
                "scores".to_string(),
                vec![
                    vec![text("id"), text("name"), text("when")],
                    vec![text("1"), text("Alice"), CellValue::DateTime(instant)],
                ],
            )],
        )
        .unwrap();

        let store = WorkbookStore::open(&path).unwrap();
        assert_eq!(store.sheet_names(), vec!["scores"]);
        assert_eq!(
            store.header_row("scores").unwrap(),
            vec!["id", "name", "when"]
        );

        let rows = store.read_range("scores").unwrap();
        assert_eq!(rows[1][0], text("1"));
        assert_eq!(rows[1][2], CellValue::DateTime(instant));
    }

    #[test]
    fn test_mutations_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.xlsx");

        let mut store = WorkbookStore::create(
            &path,
            vec![(
                "s".to_string(),
                vec![vec![text("id"), text("v")], vec![text("1"), text("a")]],
            )],
        )
        .unwrap();

        store.write_row("s", 1, vec![text("1"), text("b")]).unwrap();
        store.append_row("s", vec![text("2"), text("c")]).unwrap();

        let reopened = WorkbookStore::open(&path).unwrap();
        let rows = reopened.read_range("s").unwrap();
        assert_eq!(rows[1], vec![text("1"), text("b")]);
        assert_eq!(rows[2], vec![text("2"), text("c")]);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            WorkbookStore::open("/nonexistent/store.xlsx"),
            Err(StoreError::Workbook(_))
        ));
    }

    #[test]
    fn test_numbers_survive_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.xlsx");

        WorkbookStore::create(
            &path,
            vec![(
                "s".to_string(),
                vec![
                    vec![text("id"), text("score")],
                    vec![text("1"), CellValue::Number(99.5)],
                ],
            )],
        )
        .unwrap();

        let store = WorkbookStore::open(&path).unwrap();
        let rows = store.read_range("s").unwrap();
        assert_eq!(rows[1][1], CellValue::Number(99.5));
    }
}
