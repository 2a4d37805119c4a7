//! Passphrase-keyed AES-256-GCM encryption of single credential fields.
//!
//! This module is intentionally free of store, identity and HTTP dependencies.
//! Every function is a pure transformation over explicit inputs.
//!
//! # Envelope format
//!
//! ```text
//! base64(salt[16] || iv[12] || ciphertext+tag)
//! ```
//!
//! The key is re-derived from the passphrase and the embedded salt with
//! PBKDF2-HMAC-SHA256 on every call. Standard Base64 alphabet, padded.

pub mod cipher;
pub mod classify;
pub mod kdf;

pub use cipher::{decrypt, encrypt, try_decrypt, try_encrypt, CipherError, DecryptError};
pub use classify::{classify, is_likely_encrypted, CredentialState};
pub use kdf::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
