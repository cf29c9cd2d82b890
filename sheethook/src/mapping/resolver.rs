//! Destination and column name resolution
//!
//! The config sheet maps opaque logical ids to the physical sheet and
//! column names callers should never have to know. Two block shapes are
//! recognized: destination blocks (`sheet_id`, `sheet_name`) and column
//! blocks (`sheet_id`, `col_id`, `col_name`). Anything else is ignored.

use std::collections::HashMap;

use crate::store::{SheetStore, StoreError};
use crate::upsert::CellValue;

use super::blocks::{segment_blocks, Block};

/// Maps a logical destination id to a physical sheet name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub sheet_id: String,
    pub sheet_name: String,
}

/// Maps a logical column id to a physical column name within one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    pub sheet_id: String,
    pub col_id: String,
    pub col_name: String,
}

/// Lookup table from logical column id to physical column name,
/// scoped to one destination
pub type ColumnNameMap = HashMap<String, String>;

/// Parsed name mappings from a config sheet.
///
/// Rebuilt from the store on every request; nothing is cached across
/// requests, so edits to the config sheet take effect immediately.
#[derive(Debug, Default)]
pub struct MappingConfig {
    sheets: Vec<SheetEntry>,
    columns: Vec<ColumnEntry>,
}

impl MappingConfig {
    /// Load and parse the config sheet from a store
    pub fn load(store: &dyn SheetStore, config_sheet: &str) -> Result<Self, StoreError> {
        let rows = store.read_range(config_sheet)?;
        let config = Self::from_rows(&rows);
        log::debug!(
            "Loaded mapping config from \"{}\": {} destinations, {} columns",
            config_sheet,
            config.sheets.len(),
            config.columns.len()
        );
        Ok(config)
    }

    /// Parse name mappings out of a raw cell grid.
    ///
    /// Blocks matching neither shape are skipped; a grid with no matching
    /// blocks yields empty mappings, which only surfaces later as a failed
    /// destination lookup.
    pub fn from_rows(rows: &[Vec<CellValue>]) -> Self {
        let mut config = MappingConfig::default();

        for block in segment_blocks(rows) {
            // Destination shape is checked first; a block carrying both
            // label sets counts as a destination block only.
            if let Some(mut entries) = destination_block(&block) {
                config.sheets.append(&mut entries);
            } else if let Some(mut entries) = column_block(&block) {
                config.columns.append(&mut entries);
            }
        }

        config
    }

    /// Resolve a destination id to its physical sheet name
    pub fn sheet_name(&self, sheet_id: &str) -> Option<&str> {
        self.sheets
            .iter()
            .find(|entry| entry.sheet_id == sheet_id)
            .map(|entry| entry.sheet_name.as_str())
    }

    /// Build the column id -> column name lookup for one destination.
    ///
    /// Duplicate ids keep the last entry; that is a config-sheet defect,
    /// not something callers should lean on.
    pub fn column_map(&self, sheet_id: &str) -> ColumnNameMap {
        self.columns
            .iter()
            .filter(|entry| entry.sheet_id == sheet_id)
            .map(|entry| (entry.col_id.clone(), entry.col_name.clone()))
            .collect()
    }

    /// All destination entries, in sheet order
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// All column entries, in sheet order
    pub fn columns(&self) -> &[ColumnEntry] {
        &self.columns
    }
}

/// Parse a block as a destination block, if its header qualifies
fn destination_block(block: &Block) -> Option<Vec<SheetEntry>> {
    let header = block.first()?;
    let id_col = label_index(header, "sheet_id")?;
    let name_col = label_index(header, "sheet_name")?;

    let entries = data_rows(block)
        .map(|row| SheetEntry {
            sheet_id: cell(row, id_col),
            sheet_name: cell(row, name_col),
        })
        .collect();
    Some(entries)
}

/// Parse a block as a column block, if its header qualifies
fn column_block(block: &Block) -> Option<Vec<ColumnEntry>> {
    let header = block.first()?;
    let id_col = label_index(header, "sheet_id")?;
    let col_id_col = label_index(header, "col_id")?;
    let col_name_col = label_index(header, "col_name")?;

    let entries = data_rows(block)
        .map(|row| ColumnEntry {
            sheet_id: cell(row, id_col),
            col_id: cell(row, col_id_col),
            col_name: cell(row, col_name_col),
        })
        .collect();
    Some(entries)
}

fn label_index(header: &[String], label: &str) -> Option<usize> {
    header.iter().position(|h| h == label)
}

/// Data rows of a block: header skipped, fully empty rows skipped.
/// Rows with some empty fields are kept as-is.
fn data_rows(block: &Block) -> impl Iterator<Item = &Vec<String>> {
    block
        .iter()
        .skip(1)
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upsert::CellValue;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<CellValue>> {
        rows.iter()
            .map(|row| row.iter().map(|c| CellValue::Text(c.to_string())).collect())
            .collect()
    }

    #[test]
    fn test_parse_side_by_side_blocks() {
        let config = MappingConfig::from_rows(&grid(&[
            &["sheet_id", "sheet_name", "", "sheet_id", "col_id", "col_name"],
            &["kv1", "destination", "", "kv1", "k1", "key"],
            &["kv2", "other", "", "kv1", "v1", "value"],
            &["", "", "", "kv2", "k1", "id"],
        ]));

        assert_eq!(config.sheets().len(), 2);
        assert_eq!(config.columns().len(), 3);
        assert_eq!(config.sheet_name("kv1"), Some("destination"));
        assert_eq!(config.sheet_name("kv2"), Some("other"));
        assert_eq!(config.sheet_name("kv3"), None);
    }

    #[test]
    fn test_column_map_scoped_to_destination() {
        let config = MappingConfig::from_rows(&grid(&[
            &["sheet_id", "col_id", "col_name"],
            &["kv1", "k1", "key"],
            &["kv1", "v1", "value"],
            &["kv2", "k1", "id"],
        ]));

        let map = config.column_map("kv1");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("k1").map(String::as_str), Some("key"));
        assert_eq!(map.get("v1").map(String::as_str), Some("value"));
        assert!(config.column_map("kv3").is_empty());
    }

    #[test]
    fn test_duplicate_col_id_last_wins() {
        let config = MappingConfig::from_rows(&grid(&[
            &["sheet_id", "col_id", "col_name"],
            &["kv1", "k1", "old"],
            &["kv1", "k1", "new"],
        ]));

        assert_eq!(config.column_map("kv1").get("k1").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_block_matching_both_shapes_is_a_destination_block() {
        // Header carries all five labels; destination classification wins.
        let config = MappingConfig::from_rows(&grid(&[
            &["sheet_id", "sheet_name", "col_id", "col_name"],
            &["kv1", "destination", "k1", "key"],
        ]));

        assert_eq!(config.sheets().len(), 1);
        assert!(config.columns().is_empty());
    }

    #[test]
    fn test_empty_rows_skipped_partial_rows_kept() {
        let config = MappingConfig::from_rows(&grid(&[
            &["sheet_id", "sheet_name"],
            &["", ""],
            &["kv1", ""],
            &["", "orphan"],
        ]));

        assert_eq!(
            config.sheets(),
            &[
                SheetEntry {
                    sheet_id: "kv1".to_string(),
                    sheet_name: String::new(),
                },
                SheetEntry {
                    sheet_id: String::new(),
                    sheet_name: "orphan".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_unrecognized_blocks_ignored() {
        let config = MappingConfig::from_rows(&grid(&[
            &["foo", "bar", "", "sheet_id", "sheet_name"],
            &["1", "2", "", "kv1", "destination"],
        ]));

        assert_eq!(config.sheets().len(), 1);
        assert!(config.columns().is_empty());
    }

    #[test]
    fn test_no_blocks_is_not_an_error() {
        let config = MappingConfig::from_rows(&grid(&[]));
        assert!(config.sheets().is_empty());
        assert!(config.columns().is_empty());
        assert_eq!(config.sheet_name("kv1"), None);
    }

    #[test]
    fn test_extra_header_columns_ignored() {
        let config = MappingConfig::from_rows(&grid(&[
            &["notes", "sheet_id", "sheet_name"],
            &["x", "kv1", "destination"],
        ]));

        assert_eq!(config.sheet_name("kv1"), Some("destination"));
    }

    #[test]
    fn test_load_from_store() {
        use crate::store::MemoryStore;

        let store = MemoryStore::new().with_sheet(
            "kv_config",
            grid(&[
                &["sheet_id", "sheet_name"],
                &["kv1", "destination"],
            ]),
        );

        let config = MappingConfig::load(&store, "kv_config").unwrap();
        assert_eq!(config.sheet_name("kv1"), Some("destination"));

        assert!(matches!(
            MappingConfig::load(&store, "missing"),
            Err(StoreError::SheetNotFound(_))
        ));
    }
}
