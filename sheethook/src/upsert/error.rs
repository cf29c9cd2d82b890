//! Error types for the upsert pipeline

use thiserror::Error;

use crate::store::StoreError;

/// Error from resolving a destination or applying a batch.
///
/// Every variant is fatal to the request that triggered it; nothing is
/// retried and nothing is downgraded on the way up to the HTTP layer.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// The request named a destination id the config sheet does not map
    #[error("destination \"{0}\" is not configured")]
    UnknownDestination(String),

    /// A mapped physical column name is missing from the sheet header row.
    /// Raised before any data row is read or written.
    #[error("column \"{0}\" not found in sheet header row")]
    ColumnNotFound(String),

    /// The batch contained no records
    #[error("upsert batch is empty")]
    EmptyBatch,

    /// No key column id of the first record resolved to a physical column
    #[error("no key columns could be derived from the first record")]
    NoKeyColumns,

    /// Failure from the underlying tabular store
    #[error(transparent)]
    Store(#[from] StoreError),
}
