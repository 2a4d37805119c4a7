//! Structured logging and optional OpenTelemetry trace export.
//!
//! # Telemetry invariants
//!
//! - **No credentials, envelopes or passphrases** may appear in any span
//!   attribute or log field. Record ids and failure kinds are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
