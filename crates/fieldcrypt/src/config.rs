//! Configuration loading and validation for the fieldcrypt service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is invalid.

use anyhow::{Context, Result};
use axum::http::HeaderName;
use serde::Deserialize;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the PostgREST-compatible record store. When unset, an
    /// in-memory store is used.
    #[serde(default)]
    pub store_url: Option<String>,

    /// API key sent to the record store. **Required** when `STORE_URL` is set.
    #[serde(default)]
    pub store_api_key: Option<String>,

    /// Table holding the records with the credential column.
    #[serde(default = "default_store_table")]
    pub store_table: String,

    /// Primary key column of `store_table`.
    #[serde(default = "default_store_id_column")]
    pub store_id_column: String,

    /// Column holding the encrypted credential.
    #[serde(default = "default_credential_field")]
    pub credential_field: String,

    /// HTTP header carrying the authenticated user's stable id.
    #[serde(default = "default_identity_header")]
    pub identity_header_name: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for trace export. Traces are not exported when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_table() -> String {
    "family_plans".into()
}
fn default_store_id_column() -> String {
    "id".into()
}
fn default_credential_field() -> String {
    "owner_password".into()
}
fn default_identity_header() -> String {
    "X-User-Id".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.store_url {
            ensure_non_empty(url, "STORE_URL")?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("STORE_URL must be an http(s) URL");
            }
            ensure_non_empty(
                self.store_api_key.as_deref().unwrap_or_default(),
                "STORE_API_KEY",
            )?;
        }
        ensure_non_empty(&self.store_table, "STORE_TABLE")?;
        ensure_non_empty(&self.store_id_column, "STORE_ID_COLUMN")?;
        ensure_non_empty(&self.credential_field, "CREDENTIAL_FIELD")?;

        HeaderName::try_from(self.identity_header_name.as_str())
            .context("IDENTITY_HEADER_NAME is not a valid HTTP header name")?;
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
