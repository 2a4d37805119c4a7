//! Axum HTTP surface exposing the credential core to the dashboard.
//!
//! # Responsibilities
//! - Derive the caller's identity from the configured header on every request.
//! - Route single-value encrypt/decrypt/classify calls and the record
//!   read/write paths to [`crate::credentials`].
//! - Trigger the once-per-session migration sweep.

pub mod handlers;
pub mod router;
pub mod state;
