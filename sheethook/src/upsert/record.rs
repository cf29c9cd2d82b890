//! Upsert record types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::CellValue;

/// One key/value record of an upsert batch.
///
/// `keys` select the row to update (all key cells must match), `values` are
/// written into the matched or appended row. Both maps are keyed by logical
/// column id; the ordered map keeps key-column derivation deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertRecord {
    pub keys: BTreeMap<String, CellValue>,
    pub values: BTreeMap<String, CellValue>,
}

/// Outcome counts of one applied batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Rows overwritten in place
    pub updated: usize,
    /// Rows appended because no key match was found
    pub appended: usize,
}

impl BatchSummary {
    /// Total records applied
    pub fn total(&self) -> usize {
        self.updated + self.appended
    }
}
