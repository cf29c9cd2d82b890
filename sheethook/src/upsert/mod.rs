//! Key/value row upsert
//!
//! The core of the service: match rows by key-column equality and update
//! them in place, or append a new row when nothing matches.

pub mod engine;
pub mod error;
pub mod record;
pub mod value;

pub use engine::upsert_batch;
pub use error::UpsertError;
pub use record::{BatchSummary, UpsertRecord};
pub use value::{loose_eq, value_equals, CellValue};
