//! Row upsert engine
//!
//! Applies a batch of key/value records to one sheet: each record either
//! overwrites the first data row whose key cells match, or is appended as
//! a new row. The sheet is mutated record by record, so a row appended for
//! one record is matchable by the next.

use std::collections::HashMap;

use crate::mapping::ColumnNameMap;
use crate::store::SheetStore;

use super::error::UpsertError;
use super::record::{BatchSummary, UpsertRecord};
use super::value::{value_equals, CellValue};

/// Apply a batch of records to `sheet`, matching rows by key columns.
///
/// The header is validated up front: every physical column name in
/// `columns` must exist in the header row, otherwise the batch fails with
/// [`UpsertError::ColumnNotFound`] before any data row is touched.
///
/// Key columns are derived once, from the first record; all records in a
/// batch are assumed to share the same key shape. Records are processed
/// strictly in input order and the data range is re-read for each one, so
/// the scan is O(records x rows) against the store's current contents.
pub fn upsert_batch(
    store: &mut dyn SheetStore,
    sheet: &str,
    columns: &ColumnNameMap,
    records: &[UpsertRecord],
) -> Result<BatchSummary, UpsertError> {
    let first = records.first().ok_or(UpsertError::EmptyBatch)?;

    let header = store.header_row(sheet)?;
    for col_name in columns.values() {
        if !header.iter().any(|h| h == col_name) {
            return Err(UpsertError::ColumnNotFound(col_name.clone()));
        }
    }

    let header_index: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    // Key columns come from the first record; ids the map does not know
    // are skipped, like everywhere else.
    let key_columns: Vec<(String, usize)> = first
        .keys
        .keys()
        .filter_map(|col_id| {
            columns
                .get(col_id)
                .map(|name| (col_id.clone(), header_index[name.as_str()]))
        })
        .collect();
    if key_columns.is_empty() {
        return Err(UpsertError::NoKeyColumns);
    }

    let mut summary = BatchSummary::default();
    let empty = CellValue::empty();

    for record in records {
        let rows = store.read_range(sheet)?;

        let matched = (1..rows.len()).find(|&i| {
            key_columns.iter().all(|(col_id, col)| {
                let stored = rows[i].get(*col).unwrap_or(&empty);
                let incoming = record.keys.get(col_id).unwrap_or(&empty);
                value_equals(stored, incoming)
            })
        });

        match matched {
            Some(row_index) => {
                let mut row = rows[row_index].clone();
                row.resize(header.len(), CellValue::empty());
                place_cells(&mut row, &record.keys, columns, &header_index);
                place_cells(&mut row, &record.values, columns, &header_index);
                store.write_row(sheet, row_index, row)?;
                summary.updated += 1;
                log::debug!("Updated row {} in sheet \"{}\"", row_index, sheet);
            }
            None => {
                let mut row = vec![CellValue::empty(); header.len()];
                place_cells(&mut row, &record.keys, columns, &header_index);
                place_cells(&mut row, &record.values, columns, &header_index);
                store.append_row(sheet, row)?;
                summary.appended += 1;
                log::debug!("Appended row to sheet \"{}\"", sheet);
            }
        }
    }

    Ok(summary)
}

/// Write record cells into a row at their physical positions.
/// Column ids absent from the map are silently skipped.
fn place_cells(
    row: &mut [CellValue],
    cells: &std::collections::BTreeMap<String, CellValue>,
    columns: &ColumnNameMap,
    header_index: &HashMap<&str, usize>,
) {
    for (col_id, value) in cells {
        if let Some(col) = columns.get(col_id).map(|name| header_index[name.as_str()]) {
            row[col] = value.clone();
        }
    }
}
