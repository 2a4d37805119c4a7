//! Axum request handlers for all service endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ClassifyResponse, ErrorResponse, HealthResponse, MigrateResponse, SaveCredentialRequest,
        ValueRequest, ValueResponse,
    },
    RecordId, ServiceError,
};
use tracing::{info, warn};

use super::state::AppState;
use crate::credentials::{self, SaveError};
use crate::crypto::is_likely_encrypted;
use crate::identity::{IdentityProvider, StaticIdentity};
use crate::store::StoreError;

/// Render a [`ServiceError`] as a JSON error response.
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}

/// Read the caller's identity from the configured header.
///
/// A missing or blank header yields an anonymous identity; a header that is
/// not visible ASCII is rejected.
fn request_identity(state: &AppState, headers: &HeaderMap) -> Result<StaticIdentity, Response> {
    match headers.get(state.identity_header_name.as_str()) {
        Some(v) => match v.to_str() {
            Ok(s) if s.trim().is_empty() => Ok(StaticIdentity::anonymous()),
            Ok(s) => Ok(StaticIdentity::new(s)),
            Err(_) => Err(error_response(ServiceError::BadRequest(format!(
                "{} header contains non-ASCII characters",
                state.identity_header_name
            )))),
        },
        None => Ok(StaticIdentity::anonymous()),
    }
}

/// `POST /encrypt` — encrypt one value with the caller's identity.
pub async fn encrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ValueRequest>,
) -> Response {
    let identity = match request_identity(&state, &headers) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    match credentials::seal_for_write(&req.value, &identity).await {
        Ok(value) => (StatusCode::OK, Json(ValueResponse { value })).into_response(),
        Err(e) => {
            warn!(error = %e, "encryption failed");
            error_response(ServiceError::Internal("encryption failed".into()))
        }
    }
}

/// `POST /decrypt` — decrypt one value; undecryptable input comes back as-is.
pub async fn decrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ValueRequest>,
) -> Response {
    let identity = match request_identity(&state, &headers) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    let value = credentials::open_for_display(&req.value, &identity).await;
    (StatusCode::OK, Json(ValueResponse { value })).into_response()
}

/// `POST /classify` — report whether a value looks like an envelope.
pub async fn classify(Json(req): Json<ValueRequest>) -> Response {
    let encrypted = is_likely_encrypted(&req.value);
    (StatusCode::OK, Json(ClassifyResponse { encrypted })).into_response()
}

/// `GET /records` — every record's credential, decrypted for display.
pub async fn list_records(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identity = match request_identity(&state, &headers) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    match credentials::load_for_display(state.store.as_ref(), &state.credential_field, &identity)
        .await
    {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            warn!(error = %e, "record read failed");
            error_response(ServiceError::StoreRead(e.to_string()))
        }
    }
}

/// `PUT /records/{id}/credential` — encrypt then save one credential.
///
/// A store failure is returned as `502 store_write_failed` so the dashboard can
/// keep the form value and offer a retry.
pub async fn save_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<SaveCredentialRequest>,
) -> Response {
    let identity = match request_identity(&state, &headers) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    let id = RecordId(id);
    let result = credentials::save_credential(
        state.store.as_ref(),
        &id,
        &state.credential_field,
        &req.value,
        &identity,
    )
    .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(SaveError::Store(StoreError::NotFound(id))) => {
            error_response(ServiceError::NotFound(format!("record {id}")))
        }
        Err(SaveError::Store(e)) => {
            warn!(record_id = %id, error = %e, "credential save failed");
            error_response(ServiceError::StoreWrite(e.to_string()))
        }
        Err(e) => {
            warn!(record_id = %id, error = %e, "credential save failed");
            error_response(ServiceError::Internal("credential could not be encrypted".into()))
        }
    }
}

/// `POST /migrate` — start the caller's once-per-session migration sweep.
///
/// Returns `202` immediately; the sweep runs in the background.
pub async fn migrate(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identity = match request_identity(&state, &headers) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    if identity.current_user_id().is_none() {
        return error_response(ServiceError::Unauthenticated(format!(
            "missing {} header",
            state.identity_header_name
        )));
    }

    let started = state.coordinator.trigger(Arc::new(identity)).is_some();
    if started {
        info!("migration sweep started");
    }
    (StatusCode::ACCEPTED, Json(MigrateResponse { started })).into_response()
}

/// `GET /health` — liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        sweeps_started: state.coordinator.sweeps_started(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
