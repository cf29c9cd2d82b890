//! Block segmentation of the config sheet
//!
//! A config sheet can hold several unrelated tables side by side, separated
//! by fully empty columns. A block is a maximal run of consecutive columns
//! in which at least one cell is non-empty; empty columns terminate the
//! current block and are skipped.

use crate::upsert::CellValue;

/// One segmented block: rows restricted to the block's column run,
/// cells flattened to their text form
pub type Block = Vec<Vec<String>>;

/// Split a cell grid into blocks of consecutive non-empty columns
pub fn segment_blocks(rows: &[Vec<CellValue>]) -> Vec<Block> {
    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);

    let mut blocks = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for col in 0..width {
        let has_content = rows
            .iter()
            .any(|row| row.get(col).map(|c| !c.is_empty()).unwrap_or(false));

        if has_content {
            current.push(col);
        } else if !current.is_empty() {
            blocks.push(collect_block(rows, &current));
            current.clear();
        }
    }
    if !current.is_empty() {
        blocks.push(collect_block(rows, &current));
    }

    blocks
}

fn collect_block(rows: &[Vec<CellValue>], cols: &[usize]) -> Block {
    rows.iter()
        .map(|row| {
            cols.iter()
                .map(|&col| {
                    row.get(col)
                        .map(|c| c.to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}
