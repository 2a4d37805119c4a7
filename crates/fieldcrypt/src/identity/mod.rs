//! Identity provider contract and the passphrase derived from it.
//!
//! The passphrase is the authenticated user's durable identifier, never a
//! session token: tokens rotate, and anything encrypted under one would become
//! unreadable after the next refresh.
//!
//! # Module invariants
//!
//! - The passphrase is read fresh from the provider on every operation and is
//!   never cached, persisted or logged.
//! - No identity means no passphrase; callers degrade to plaintext passthrough.

pub mod provider;

pub use provider::{SessionIdentity, StaticIdentity};

/// Source of the current actor's stable user id.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated user's id, or `None` when nobody is signed in.
    fn current_user_id(&self) -> Option<String>;
}

/// A non-empty passphrase taken from the current identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(String);

impl Passphrase {
    /// Wrap a user id, rejecting empty or whitespace-only values.
    pub fn new(user_id: impl Into<String>) -> Option<Self> {
        let id = user_id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Borrow the passphrase for a single encrypt/decrypt call.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

/// Read the current passphrase from `provider`.
pub fn current_passphrase(provider: &dyn IdentityProvider) -> Option<Passphrase> {
    provider.current_user_id().and_then(Passphrase::new)
}

/// Passphrase string for a cipher call; empty when there is no identity, which
/// selects the passthrough branch of the cipher.
pub(crate) fn passphrase_str(passphrase: Option<&Passphrase>) -> &str {
    passphrase.map(Passphrase::expose).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_yield_no_passphrase() {
        assert!(Passphrase::new("").is_none());
        assert!(Passphrase::new("   ").is_none());
        assert!(Passphrase::new("uid-1").is_some());
    }

    #[test]
    fn passphrase_redacted_in_debug() {
        let p = Passphrase::new("very-secret-id").unwrap();
        let printed = format!("{p:?}");
        assert!(!printed.contains("very-secret-id"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn current_passphrase_reads_provider() {
        let none = StaticIdentity::anonymous();
        assert!(current_passphrase(&none).is_none());

        let some = StaticIdentity::new("uid-7");
        assert_eq!(current_passphrase(&some).unwrap().expose(), "uid-7");
    }

    #[test]
    fn passphrase_str_defaults_to_empty() {
        assert_eq!(passphrase_str(None), "");
        let p = Passphrase::new("x").unwrap();
        assert_eq!(passphrase_str(Some(&p)), "x");
    }
}
