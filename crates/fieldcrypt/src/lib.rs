//! Client-side encryption of owner credentials for the Family Manager dashboard.
//!
//! Credentials are encrypted under a key derived from the signed-in user's
//! stable id before they reach the record store, and decrypted again after
//! every read. Plaintext left over from before encryption existed is found by
//! its shape and re-encrypted by a best-effort background sweep.
//!
//! # Layers
//!
//! - [`crypto`]: key derivation, envelope encrypt/decrypt, plaintext detection.
//! - [`identity`]: where the passphrase comes from.
//! - [`store`]: the record store collaborator and its backends.
//! - [`credentials`]: encrypt-before-write and decrypt-after-read.
//! - [`migration`]: the plaintext sweep.
//! - [`server`]: the HTTP surface used by the dashboard.

pub mod config;
pub mod credentials;
pub mod crypto;
pub mod identity;
pub mod migration;
pub mod server;
pub mod store;
pub mod telemetry;
