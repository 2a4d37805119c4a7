//! Encrypt-before-write and decrypt-after-read paths for the credential field.
//!
//! # Lifecycle
//!
//! 1. On every write the plaintext typed into the form is encrypted with the
//!    current passphrase, then the single credential column is updated.
//! 2. On every read each stored value is decrypted for display. Values that
//!    cannot be decrypted (legacy plaintext, foreign key) are shown as stored.
//! 3. Without an identity both paths pass values through untouched.
//!
//! Key derivation is deliberately slow, so all cipher work runs on the blocking
//! pool instead of the async workers.

use common::{protocol::DisplayRecord, FieldMap, RecordId};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::crypto::{self, CipherError};
use crate::identity::{current_passphrase, passphrase_str, IdentityProvider};
use crate::store::{RecordStore, StoreError};

/// Structured failure of a user-initiated save.
///
/// The caller keeps the plaintext form value and can offer a retry.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The value could not be encrypted; nothing was written.
    #[error("credential could not be encrypted: {0}")]
    Encryption(#[from] CipherError),

    /// The store rejected or failed the update.
    #[error("credential could not be saved: {0}")]
    Store(#[from] StoreError),

    /// The blocking cipher task was cancelled or panicked.
    #[error("credential worker failed: {0}")]
    Worker(String),
}

/// Encrypt `plaintext` for storage with the caller's current identity.
///
/// Passes the value through unchanged when nobody is signed in.
///
/// # Errors
///
/// Returns [`SaveError::Encryption`] if the cipher fails and
/// [`SaveError::Worker`] if the blocking task does not complete.
pub async fn seal_for_write(
    plaintext: &str,
    identity: &dyn IdentityProvider,
) -> Result<String, SaveError> {
    let passphrase = current_passphrase(identity);
    if passphrase.is_none() {
        debug!("no identity; credential written as plaintext");
    }
    let plaintext = plaintext.to_owned();
    tokio::task::spawn_blocking(move || {
        crypto::try_encrypt(&plaintext, passphrase_str(passphrase.as_ref()))
    })
    .await
    .map_err(|e| SaveError::Worker(e.to_string()))?
    .map_err(SaveError::from)
}

/// Decrypt a stored value for display; returns it unchanged on any failure.
pub async fn open_for_display(stored: &str, identity: &dyn IdentityProvider) -> String {
    let passphrase = current_passphrase(identity);
    let stored = stored.to_owned();
    let fallback = stored.clone();
    tokio::task::spawn_blocking(move || {
        crypto::decrypt(&stored, passphrase_str(passphrase.as_ref()))
    })
    .await
    .unwrap_or(fallback)
}

/// Encrypt `plaintext` and write it to the credential field of record `id`.
///
/// # Errors
///
/// See [`SaveError`]. Store failures are returned as-is so the caller can
/// surface a retry prompt.
pub async fn save_credential(
    store: &dyn RecordStore,
    id: &RecordId,
    field: &str,
    plaintext: &str,
    identity: &dyn IdentityProvider,
) -> Result<(), SaveError> {
    let sealed = seal_for_write(plaintext, identity).await?;

    let mut fields = FieldMap::new();
    fields.insert(field.to_owned(), Value::String(sealed));
    store.update_by_id(id, fields).await?;

    info!(record_id = %id, "credential saved");
    Ok(())
}

/// Fetch `{id, field}` for every record and decrypt the credential for display.
///
/// # Errors
///
/// Returns the store's error if the read fails.
pub async fn load_for_display(
    store: &dyn RecordStore,
    field: &str,
    identity: &dyn IdentityProvider,
) -> Result<Vec<DisplayRecord>, StoreError> {
    let records = store.fetch_all(&[field.to_owned()]).await?;

    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let credential = match record.str_field(field) {
            Some(stored) if !stored.is_empty() => {
                Some(open_for_display(stored, identity).await)
            }
            other => other.map(str::to_owned),
        };
        out.push(DisplayRecord {
            id: record.id,
            credential,
        });
    }
    Ok(out)
}
