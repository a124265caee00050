//! Admin access gate.
//!
//! A single compiled-in secret unlocks the admin commands. On success a
//! session flag is persisted so later invocations stay unlocked until
//! [`AccessGate::logout`]. This only hides the admin surface; the key ships
//! in the binary and is not a security boundary.

use crate::kv::{KeyValueStore, KvError, keys};
use std::sync::Arc;
use thiserror::Error;

pub const MASTER_KEY: &str = "SHIELD-ADMIN-2025";

const SESSION_FLAG: &str = "true";

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Invalid Access Key")]
    InvalidKey,
    #[error("Admin session required. Run `shield-cms login <KEY>` first.")]
    NotAuthenticated,
    #[error("Storage error: {0}")]
    Kv(#[from] KvError),
}

pub struct AccessGate {
    kv: Arc<dyn KeyValueStore>,
}

impl AccessGate {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Unlock the admin surface if `candidate` is exactly the master key.
    ///
    /// A wrong key leaves the stored session untouched.
    pub fn authenticate(&self, candidate: &str) -> Result<(), GateError> {
        if candidate != MASTER_KEY {
            tracing::warn!("rejected admin access key");
            return Err(GateError::InvalidKey);
        }
        self.kv.set(keys::SESSION_ACTIVE, SESSION_FLAG)?;
        tracing::info!("admin session started");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), GateError> {
        self.kv.remove(keys::SESSION_ACTIVE)?;
        Ok(())
    }

    /// Reads the persisted flag on every call.
    pub fn is_authenticated(&self) -> bool {
        self.kv.get(keys::SESSION_ACTIVE).as_deref() == Some(SESSION_FLAG)
    }

    /// Fail with [`GateError::NotAuthenticated`] unless a session is active.
    pub fn require(&self) -> Result<(), GateError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(GateError::NotAuthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::memory_kv;

    fn gate() -> AccessGate {
        AccessGate::new(memory_kv())
    }

    #[test]
    fn exact_key_authenticates() {
        let gate = gate();
        gate.authenticate(MASTER_KEY).unwrap();
        assert!(gate.is_authenticated());
        assert!(gate.require().is_ok());
    }

    #[test]
    fn near_misses_are_rejected() {
        let gate = gate();
        for candidate in ["", "shield-admin-2025", "SHIELD-ADMIN-2025 ", "SHIELD-ADMIN-2024"] {
            let err = gate.authenticate(candidate).unwrap_err();
            assert_eq!(err.to_string(), "Invalid Access Key");
        }
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn wrong_key_keeps_existing_session() {
        let gate = gate();
        gate.authenticate(MASTER_KEY).unwrap();
        assert!(gate.authenticate("nope").is_err());
        assert!(gate.is_authenticated());
    }

    #[test]
    fn logout_clears_session() {
        let gate = gate();
        gate.authenticate(MASTER_KEY).unwrap();
        gate.logout().unwrap();
        assert!(!gate.is_authenticated());
        assert!(matches!(gate.require(), Err(GateError::NotAuthenticated)));
    }

    #[test]
    fn session_survives_a_new_gate_on_same_store() {
        let kv = memory_kv();
        AccessGate::new(kv.clone()).authenticate(MASTER_KEY).unwrap();
        assert!(AccessGate::new(kv).is_authenticated());
    }

    #[test]
    fn only_literal_true_counts_as_session() {
        let kv = memory_kv();
        kv.set(keys::SESSION_ACTIVE, "yes").unwrap();
        assert!(!AccessGate::new(kv).is_authenticated());
    }
}
