//! Lazy, best-effort migration of legacy plaintext credentials.
//!
//! Records written before encryption was introduced still hold plaintext. A
//! sweep runs once per session, alongside the primary data load and never
//! awaited by it:
//!
//! 1. Fetch `{id, credential}` for every record (not the full row).
//! 2. Read the current passphrase; without one, stop silently.
//! 3. Classify each value; skip empty and already-encrypted ones.
//! 4. Encrypt each plaintext value and update that one field of that one record.
//!
//! # Sweep invariants
//!
//! - A failure for one record is logged and never stops the others.
//! - No retries and no backoff; the next session's sweep picks up leftovers.
//! - No migration state is stored. A second sweep reclassifies migrated values
//!   as encrypted and writes nothing.
//! - Concurrent user edits win. Migration only re-encodes the value it read, so
//!   losing a race costs at most one re-encryption.

pub mod gate;

pub use gate::SweepGate;

use std::sync::Arc;

use common::{FieldMap, RecordId};
use serde_json::Value;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::crypto::{self, CredentialState};
use crate::identity::{current_passphrase, IdentityProvider, Passphrase};
use crate::store::RecordStore;

/// Upper bound on records being encrypted and written at the same time.
pub const MAX_IN_FLIGHT: usize = 4;

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records returned by the store.
    pub scanned: usize,
    /// Records whose credential already classified as encrypted.
    pub already_encrypted: usize,
    /// Records with no credential value.
    pub empty: usize,
    /// Records re-written with an encrypted credential.
    pub migrated: usize,
    /// Records whose migration failed, sorted by id.
    pub failed: Vec<RecordId>,
    /// `true` if the sweep stopped before classifying anything.
    pub aborted: bool,
}

impl MigrationReport {
    fn aborted() -> Self {
        Self {
            aborted: true,
            ..Self::default()
        }
    }
}

/// Run one sweep to completion over every record in `store`.
///
/// Never returns an error: a failed read aborts the sweep and is reported in
/// the returned [`MigrationReport`]; per-record failures are collected.
pub async fn run_sweep(
    store: Arc<dyn RecordStore>,
    identity: &dyn IdentityProvider,
    field: &str,
) -> MigrationReport {
    let records = match store.fetch_all(&[field.to_owned()]).await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "migration sweep could not read records");
            return MigrationReport::aborted();
        }
    };

    let Some(passphrase) = current_passphrase(identity) else {
        debug!("no identity; skipping migration sweep");
        return MigrationReport::aborted();
    };

    let mut report = MigrationReport {
        scanned: records.len(),
        ..MigrationReport::default()
    };

    let limiter = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut tasks = JoinSet::new();

    for record in records {
        let plaintext = match record.str_field(field) {
            None | Some("") => {
                report.empty += 1;
                continue;
            }
            Some(value) => match crypto::classify(value) {
                CredentialState::Encrypted => {
                    report.already_encrypted += 1;
                    continue;
                }
                CredentialState::Plaintext => value.to_owned(),
            },
        };

        let store = Arc::clone(&store);
        let limiter = Arc::clone(&limiter);
        let passphrase = passphrase.clone();
        let field = field.to_owned();
        let id = record.id;
        tasks.spawn(async move {
            // The semaphore is never closed, so acquire cannot fail.
            let _permit = limiter.acquire_owned().await.ok();
            let outcome = migrate_one(store.as_ref(), &id, &field, plaintext, passphrase).await;
            (id, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => report.migrated += 1,
            Ok((id, Err(reason))) => {
                warn!(record_id = %id, error = %reason, "credential migration failed");
                report.failed.push(id);
            }
            Err(e) => warn!(error = %e, "credential migration task did not complete"),
        }
    }
    report.failed.sort();

    info!(
        scanned = report.scanned,
        migrated = report.migrated,
        already_encrypted = report.already_encrypted,
        empty = report.empty,
        failed = report.failed.len(),
        "migration sweep finished"
    );
    report
}

async fn migrate_one(
    store: &dyn RecordStore,
    id: &RecordId,
    field: &str,
    plaintext: String,
    passphrase: Passphrase,
) -> Result<(), String> {
    let sealed = tokio::task::spawn_blocking(move || {
        crypto::try_encrypt(&plaintext, passphrase.expose())
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| e.to_string())?;

    let mut fields = FieldMap::new();
    fields.insert(field.to_owned(), Value::String(sealed));
    store
        .update_by_id(id, fields)
        .await
        .map_err(|e| e.to_string())?;

    debug!(record_id = %id, "credential migrated");
    Ok(())
}

/// Start a sweep in the background and return immediately.
///
/// The sweep is not cancellable and outlives its caller.
pub fn spawn_sweep(
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    field: String,
) -> tokio::task::JoinHandle<MigrationReport> {
    tokio::spawn(async move { run_sweep(store, identity.as_ref(), &field).await })
}

/// Session-scoped entry point: starts at most one sweep per identity.
#[derive(Clone)]
pub struct Coordinator {
    store: Arc<dyn RecordStore>,
    field: Arc<str>,
    gate: SweepGate,
}

impl Coordinator {
    pub fn new(store: Arc<dyn RecordStore>, field: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            field: field.into(),
            gate: SweepGate::new(),
        }
    }

    /// Fire-and-forget trigger, called right after the primary data load is
    /// kicked off.
    ///
    /// Returns `None` without an identity or when this identity already swept
    /// during the current session.
    pub fn trigger(
        &self,
        identity: Arc<dyn IdentityProvider>,
    ) -> Option<tokio::task::JoinHandle<MigrationReport>> {
        let user_id = identity
            .current_user_id()
            .filter(|id| !id.trim().is_empty())?;
        if !self.gate.try_begin(&user_id) {
            debug!("migration sweep already ran this session");
            return None;
        }
        Some(spawn_sweep(
            Arc::clone(&self.store),
            identity,
            self.field.to_string(),
        ))
    }

    /// Number of sweeps started since this coordinator was created.
    pub fn sweeps_started(&self) -> usize {
        self.gate.started()
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("field", &self.field)
            .field("sweeps_started", &self.gate.started())
            .finish()
    }
}
