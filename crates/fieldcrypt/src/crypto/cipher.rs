//! AES-256-GCM encryption and decryption of individual string fields.
//!
//! Each call draws a fresh salt and IV, so encrypting the same value twice
//! never yields the same envelope. Equality of stored ciphertexts therefore
//! reveals nothing about equality of the underlying credentials.
//!
//! The infallible [`encrypt`] / [`decrypt`] pair never fails a caller: missing
//! inputs pass through, and any decryption failure returns the input unchanged
//! so legacy plaintext reads back as itself. Use [`try_encrypt`] /
//! [`try_decrypt`] where the difference matters.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::{debug, warn};

use super::kdf::{derive_key, generate_salt, DerivedKey, SALT_LEN};

/// Byte length of an AES-GCM initialisation vector (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Smallest decoded envelope: salt, IV and at least one ciphertext byte.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + IV_LEN + 1;

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the 16-byte GCM tag appended.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode as `base64(salt || iv || ciphertext)`.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(SALT_LEN + IV_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.salt);
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    /// Parse an envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`DecryptError::Malformed`] if `s` is not valid Base64 and
    /// [`DecryptError::TooShort`] if it decodes to fewer than
    /// [`MIN_ENVELOPE_LEN`] bytes.
    pub fn decode(s: &str) -> Result<Self, DecryptError> {
        let raw = STANDARD.decode(s).map_err(|_| DecryptError::Malformed)?;
        if raw.len() < MIN_ENVELOPE_LEN {
            return Err(DecryptError::TooShort);
        }
        let (salt_bytes, rest) = raw.split_at(SALT_LEN);
        let (iv_bytes, ciphertext) = rest.split_at(IV_LEN);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);

        Ok(Self {
            salt,
            iv,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Errors produced while encrypting.
#[derive(Debug, Error)]
pub enum CipherError {
    /// AES-GCM encryption failed.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Reasons a value could not be decrypted.
///
/// None of these carry the value itself, so they are safe to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptError {
    /// The value or the passphrase was empty.
    #[error("missing value or passphrase")]
    MissingInput,

    /// The value is not valid Base64.
    #[error("value is not base64")]
    Malformed,

    /// The decoded value is too short to hold salt, IV and ciphertext.
    #[error("value too short to be an envelope")]
    TooShort,

    /// Tag verification failed: wrong passphrase or tampered ciphertext.
    #[error("authentication failed")]
    Authentication,

    /// Decryption succeeded but the plaintext is not UTF-8.
    #[error("plaintext is not valid utf-8")]
    InvalidUtf8,
}

/// Encrypt `plaintext` under a key derived from `passphrase`.
///
/// If either input is empty, `plaintext` is returned unchanged.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (unreachable
/// with a well-formed key and IV).
pub fn try_encrypt(plaintext: &str, passphrase: &str) -> Result<String, CipherError> {
    if plaintext.is_empty() || passphrase.is_empty() {
        return Ok(plaintext.to_owned());
    }

    let salt = generate_salt();
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(passphrase.as_bytes(), &salt);
    let ciphertext = build_cipher(&key)
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|_| CipherError::AeadFailure)?;

    Ok(Envelope {
        salt,
        iv,
        ciphertext,
    }
    .encode())
}

/// Encrypt `plaintext`, falling back to the plaintext itself on failure.
///
/// A failed encryption is logged and the value is left for the migration sweep
/// to pick up later.
pub fn encrypt(plaintext: &str, passphrase: &str) -> String {
    match try_encrypt(plaintext, passphrase) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "credential encryption failed; value left unencrypted");
            plaintext.to_owned()
        }
    }
}

/// Decrypt an envelope produced by [`try_encrypt`].
///
/// # Errors
///
/// See [`DecryptError`] for the individual failure kinds.
pub fn try_decrypt(envelope: &str, passphrase: &str) -> Result<String, DecryptError> {
    if envelope.is_empty() || passphrase.is_empty() {
        return Err(DecryptError::MissingInput);
    }

    let parsed = Envelope::decode(envelope)?;
    let key = derive_key(passphrase.as_bytes(), &parsed.salt);
    let plaintext = build_cipher(&key)
        .decrypt(Nonce::from_slice(&parsed.iv), parsed.ciphertext.as_ref())
        .map_err(|_| DecryptError::Authentication)?;

    String::from_utf8(plaintext).map_err(|_| DecryptError::InvalidUtf8)
}

/// Decrypt `envelope`, returning it unchanged on any failure.
///
/// Legacy plaintext, a wrong passphrase and tampered data all come back as the
/// original input. Never panics and never returns a partial result.
pub fn decrypt(envelope: &str, passphrase: &str) -> String {
    if envelope.is_empty() || passphrase.is_empty() {
        return envelope.to_owned();
    }
    match try_decrypt(envelope, passphrase) {
        Ok(plaintext) => plaintext,
        Err(reason) => {
            debug!(%reason, "value not decrypted; returning it as stored");
            envelope.to_owned()
        }
    }
}

fn build_cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let envelope = encrypt("hunter2", "user-123");
        assert_ne!(envelope, "hunter2");
        assert_eq!(decrypt(&envelope, "user-123"), "hunter2");
    }

    #[test]
    fn round_trip_multibyte_unicode() {
        let plaintext = "пароль-密码-🔐-contraseña";
        let envelope = encrypt(plaintext, "uid-ñ");
        assert_eq!(decrypt(&envelope, "uid-ñ"), plaintext);
    }

    #[test]
    fn encrypt_is_non_deterministic() {
        let a = encrypt("same", "user");
        let b = encrypt("same", "user");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_inputs_pass_through() {
        assert_eq!(encrypt("x", ""), "x");
        assert_eq!(encrypt("", "p"), "");
        assert_eq!(decrypt("x", ""), "x");
        assert_eq!(decrypt("", "p"), "");
    }

    #[test]
    fn wrong_key_returns_envelope_unchanged() {
        let envelope = encrypt("secret", "keyA");
        assert_eq!(decrypt(&envelope, "keyB"), envelope);
        assert_eq!(
            try_decrypt(&envelope, "keyB"),
            Err(DecryptError::Authentication)
        );
    }

    #[test]
    fn legacy_plaintext_round_trips_as_itself() {
        assert_eq!(
            decrypt("plain-legacy-password", "anyone"),
            "plain-legacy-password"
        );
        assert_eq!(
            try_decrypt("plain-legacy-password", "anyone"),
            Err(DecryptError::Malformed)
        );
    }

    #[test]
    fn short_base64_is_too_short() {
        let short = STANDARD.encode([0u8; SALT_LEN + IV_LEN]);
        assert_eq!(try_decrypt(&short, "p"), Err(DecryptError::TooShort));
        assert_eq!(decrypt(&short, "p"), short);
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let envelope = encrypt("tamper me", "user");
        let mut parsed = Envelope::decode(&envelope).unwrap();
        parsed.ciphertext[0] ^= 0xFF;
        let tampered = parsed.encode();
        assert_eq!(
            try_decrypt(&tampered, "user"),
            Err(DecryptError::Authentication)
        );
        assert_eq!(decrypt(&tampered, "user"), tampered);
    }

    #[test]
    fn envelope_layout() {
        let envelope = encrypt("abc", "user");
        let raw = STANDARD.decode(&envelope).unwrap();
        // salt + iv + 3 plaintext bytes + 16-byte tag
        assert_eq!(raw.len(), SALT_LEN + IV_LEN + 3 + 16);
    }

    #[test]
    fn try_decrypt_reports_missing_input() {
        assert_eq!(try_decrypt("", "p"), Err(DecryptError::MissingInput));
        assert_eq!(try_decrypt("x", ""), Err(DecryptError::MissingInput));
    }

    #[test]
    fn try_encrypt_passes_through_without_passphrase() {
        assert_eq!(try_encrypt("plain", "").unwrap(), "plain");
    }
}
