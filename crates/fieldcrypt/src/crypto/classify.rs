//! Structural detection of encrypted envelopes versus legacy plaintext.
//!
//! This is a heuristic, not a proof: a long plaintext that happens to be valid
//! Base64 is classified as encrypted. Stored credentials are short, human-typed
//! passwords, so that case does not arise in practice.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Shortest string that can plausibly be an envelope.
pub const ENVELOPE_MIN_CHARS: usize = 40;

/// Computed state of a stored credential. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Encrypted,
    Plaintext,
}

/// Returns `true` iff `value` is at least [`ENVELOPE_MIN_CHARS`] long and
/// decodes as standard Base64.
pub fn is_likely_encrypted(value: &str) -> bool {
    if value.len() < ENVELOPE_MIN_CHARS {
        return false;
    }
    STANDARD.decode(value).is_ok()
}

/// Classify a stored credential value.
pub fn classify(value: &str) -> CredentialState {
    if is_likely_encrypted(value) {
        CredentialState::Encrypted
    } else {
        CredentialState::Plaintext
    }
}
