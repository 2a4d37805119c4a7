//! Request and response types exchanged with the dashboard over HTTP.
//!
//! Every credential value on the wire is a plain string: either raw plaintext
//! or a Base64 envelope. Neither needs escaping beyond normal JSON.

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

// ---------------------------------------------------------------------------
// Single-value endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt`, `POST /decrypt` and `POST /classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRequest {
    pub value: String,
}

/// Response body for `POST /encrypt` and `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: String,
}

/// Response body for `POST /classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    /// `true` when the value looks like an encrypted envelope.
    pub encrypted: bool,
}

// ---------------------------------------------------------------------------
// Record endpoints
// ---------------------------------------------------------------------------

/// One entry of the `GET /records` response.
///
/// `credential` holds the decrypted value, or the stored value unchanged when
/// it could not be decrypted with the caller's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: RecordId,
    pub credential: Option<String>,
}

/// Request body for `PUT /records/{id}/credential`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCredentialRequest {
    /// Plaintext credential as typed into the form.
    pub value: String,
}

/// Response body for `POST /migrate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateResponse {
    /// `false` when a sweep already ran for this identity in this session.
    pub started: bool,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"store_write_failed"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(e: &crate::ServiceError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` while the process is serving.
    pub status: String,
    /// Number of migration sweeps started since process start.
    pub sweeps_started: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_record_serialises_null_credential() {
        let rec = DisplayRecord {
            id: RecordId::from("9"),
            credential: None,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"id":"9","credential":null}"#);
    }

    #[test]
    fn error_response_from_service_error() {
        let e = crate::ServiceError::StoreWrite("backend down".into());
        let body = ErrorResponse::from(&e);
        assert_eq!(body.code, "store_write_failed");
        assert!(body.message.contains("backend down"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            sweeps_started: 2,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.sweeps_started, 2);
    }
}
