//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::migration::Coordinator;
use crate::store::{MemoryStore, RecordStore};

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-backed so Axum can clone the state per request cheaply.
#[derive(Clone)]
pub struct AppState {
    /// Backing record store.
    pub store: Arc<dyn RecordStore>,
    /// Once-per-session migration trigger over the same store.
    pub coordinator: Coordinator,
    /// Column holding the credential.
    pub credential_field: Arc<str>,
    /// Name of the HTTP header carrying the caller's user id.
    pub identity_header_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] over `store`.
    pub fn new(
        store: Arc<dyn RecordStore>,
        credential_field: String,
        identity_header_name: String,
    ) -> Self {
        let credential_field: Arc<str> = credential_field.into();
        Self {
            coordinator: Coordinator::new(Arc::clone(&store), Arc::clone(&credential_field)),
            store,
            credential_field,
            identity_header_name: Arc::new(identity_header_name),
        }
    }
}

impl Default for AppState {
    /// Creates an [`AppState`] over an empty in-memory store, suitable for tests.
    fn default() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            "owner_password".into(),
            "X-User-Id".into(),
        )
    }
}
