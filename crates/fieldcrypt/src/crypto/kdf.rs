//! PBKDF2-HMAC-SHA256 key derivation.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// Byte length of the derived AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the per-envelope random salt.
pub const SALT_LEN: usize = 16;

/// PBKDF2 round count. Not recorded in the envelope; changing it makes every
/// existing envelope undecryptable.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// A derived key that lives only for the duration of one encrypt/decrypt call.
///
/// The buffer is overwritten with zeroes on drop.
pub struct DerivedKey(Box<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 256-bit key from `passphrase` and `salt`.
pub fn derive_key(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> DerivedKey {
    let mut key = Box::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(passphrase, salt, PBKDF2_ITERATIONS, key.as_mut_slice());
    DerivedKey(key)
}

/// Generate a fresh random salt from the OS CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"user-123", &salt);
        let b = derive_key(b"user-123", &salt);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salt_changes_key() {
        let a = derive_key(b"user-123", &[1u8; SALT_LEN]);
        let b = derive_key(b"user-123", &[2u8; SALT_LEN]);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_passphrase_changes_key() {
        let salt = [3u8; SALT_LEN];
        let a = derive_key(b"keyA", &salt);
        let b = derive_key(b"keyB", &salt);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn derived_key_redacted_in_debug() {
        let key = derive_key(b"p", &[0u8; SALT_LEN]);
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }
}
