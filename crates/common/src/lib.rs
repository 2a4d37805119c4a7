//! Common types, protocol definitions, and errors shared across `fieldcrypt` crates.

pub mod error;
pub mod protocol;
pub mod record;

pub use error::ServiceError;
pub use record::{FieldMap, Record, RecordId};
