//! [`SweepGate`]: at most one migration sweep per identity per session.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

/// Records which identities have already started a sweep.
///
/// Only a SHA-256 digest of each user id is kept, never the id itself.
#[derive(Clone, Debug, Default)]
pub struct SweepGate {
    started: Arc<Mutex<HashSet<[u8; 32]>>>,
}

impl SweepGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per distinct `user_id`.
    pub fn try_begin(&self, user_id: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(user_id.as_bytes()).into();
        let mut started = match self.started.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        started.insert(digest)
    }

    /// Number of sweeps started so far.
    pub fn started(&self) -> usize {
        match self.started.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_once_per_identity() {
        let gate = SweepGate::new();
        assert!(gate.try_begin("uid-1"));
        assert!(!gate.try_begin("uid-1"));
        assert!(gate.try_begin("uid-2"));
        assert_eq!(gate.started(), 2);
    }

    #[test]
    fn clones_share_state() {
        let gate = SweepGate::new();
        let other = gate.clone();
        assert!(gate.try_begin("uid"));
        assert!(!other.try_begin("uid"));
    }
}
