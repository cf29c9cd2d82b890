//! Logical-to-physical name mapping
//!
//! Callers address sheets and columns by stable logical ids; the config
//! sheet translates those ids into the display names that may be renamed
//! at any time.

pub mod blocks;
pub mod resolver;

pub use resolver::{ColumnEntry, ColumnNameMap, MappingConfig, SheetEntry};
