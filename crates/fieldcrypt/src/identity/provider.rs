//! Concrete [`IdentityProvider`] implementations.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::IdentityProvider;

/// Identity that follows the application's auth session.
///
/// Sign-in and sign-out swap the current id atomically; readers never block.
/// Clones share the same underlying session.
#[derive(Clone, Debug, Default)]
pub struct SessionIdentity {
    current: Arc<ArcSwapOption<String>>,
}

impl SessionIdentity {
    /// Create a session with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, user_id: impl Into<String>) {
        self.current.store(Some(Arc::new(user_id.into())));
    }

    /// Clear the current identity.
    pub fn sign_out(&self) {
        self.current.store(None);
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.current.load_full().map(|id| (*id).clone())
    }
}

/// Fixed identity, for explicit injection (e.g. one per HTTP request).
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_signed_out() {
        assert_eq!(SessionIdentity::new().current_user_id(), None);
    }

    #[test]
    fn sign_in_and_out() {
        let session = SessionIdentity::new();
        session.sign_in("uid-1");
        assert_eq!(session.current_user_id().as_deref(), Some("uid-1"));
        session.sign_out();
        assert_eq!(session.current_user_id(), None);
    }

    #[test]
    fn clones_observe_identity_changes() {
        let session = SessionIdentity::new();
        let observer = session.clone();
        session.sign_in("uid-a");
        assert_eq!(observer.current_user_id().as_deref(), Some("uid-a"));
        session.sign_in("uid-b");
        assert_eq!(observer.current_user_id().as_deref(), Some("uid-b"));
    }
}
