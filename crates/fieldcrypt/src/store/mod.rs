//! Record store contract and backends.
//!
//! The encryption core only ever needs two operations from the backing store:
//! read a projection of every record, and update named fields of one record.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** Stores move opaque strings; they never import
//!   anything from `crate::crypto`.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use common::{FieldMap, Record, RecordId};
use thiserror::Error;

/// Errors surfaced by a [`RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// No record with the given id exists.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The store answered with an error status.
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The store answered with a body that could not be interpreted.
    #[error("unexpected store response: {0}")]
    Decode(String),
}

/// Generic record store collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return every record's id plus the requested field subset.
    async fn fetch_all(&self, fields: &[String]) -> Result<Vec<Record>, StoreError>;

    /// Update the given fields of exactly one record.
    async fn update_by_id(&self, id: &RecordId, fields: FieldMap) -> Result<(), StoreError>;
}
