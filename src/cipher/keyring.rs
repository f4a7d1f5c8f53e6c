use std::sync::{Arc, Mutex, PoisonError};

use hashbrown::HashMap;
use tracing::debug;

use super::derive::{Argon2Params, Derive, KdfSpec};
use crate::error::Result;
use crate::secret::{Password, SecretKey};

/// Per-run password holder with a cache of derived keys.
///
/// Encryption uses one session descriptor (random salt, fixed at
/// construction) for every file of the run. Decryption asks for whatever
/// descriptor the container records; each distinct descriptor is derived at
/// most once. Each descriptor has its own slot: the slot lock is held across
/// a derivation so workers needing the same key wait for it, while lookups of
/// other descriptors only touch the map lock.
pub struct Keyring {
    derive: Derive,
    session: KdfSpec,
    cache: Mutex<HashMap<KdfSpec, Slot>>,
}

type Slot = Arc<Mutex<Option<Arc<SecretKey>>>>;

impl Keyring {
    pub fn new(password: Password) -> Result<Self> {
        Self::with_params(password, Argon2Params::default())
    }

    /// Builds a keyring whose session key uses the given Argon2 costs.
    pub fn with_params(password: Password, params: Argon2Params) -> Result<Self> {
        let derive = Derive::new(password)?;
        let session = KdfSpec::generate(params)?;
        Ok(Self { derive, session, cache: Mutex::new(HashMap::new()) })
    }

    /// Descriptor written into every binary trailer of this run.
    pub const fn session_spec(&self) -> &KdfSpec {
        &self.session
    }

    /// Returns the key for `spec`, deriving it on first use.
    pub fn key_for(&self, spec: &KdfSpec) -> Result<Arc<SecretKey>> {
        let slot = self.slot(spec);
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = cached.as_ref() {
            return Ok(Arc::clone(key));
        }

        debug!(?spec, "deriving key");
        let key = Arc::new(self.derive.derive(spec)?);
        *cached = Some(Arc::clone(&key));
        Ok(key)
    }

    /// Number of distinct keys derived so far.
    pub fn derived_count(&self) -> usize {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.values().filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some()).count()
    }

    /// Fetches or creates the slot for `spec`. The map lock is released on return.
    fn slot(&self, spec: &KdfSpec) -> Slot {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(*spec).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ARGON_SALT_LEN;
    use crate::error::Error;

    const FAST: Argon2Params = Argon2Params { memory: 1024, passes: 1, parallelism: 1 };

    #[test]
    fn test_rejects_empty_password() {
        assert!(matches!(Keyring::with_params(Password::new(""), FAST), Err(Error::EmptyPassword)));
    }

    #[test]
    fn test_derives_once_per_descriptor() {
        let keyring = Keyring::with_params(Password::new("pw"), FAST).unwrap();
        let session = *keyring.session_spec();

        let a = keyring.key_for(&session).unwrap();
        let b = keyring.key_for(&session).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(keyring.derived_count(), 1);

        let other = KdfSpec::Argon2id { salt: [1; ARGON_SALT_LEN], params: FAST };
        let c = keyring.key_for(&other).unwrap();
        assert_ne!(a.expose_secret(), c.expose_secret());
        assert_eq!(keyring.derived_count(), 2);
    }

    #[test]
    fn test_session_salt_is_random() {
        let a = Keyring::with_params(Password::new("pw"), FAST).unwrap();
        let b = Keyring::with_params(Password::new("pw"), FAST).unwrap();
        assert_ne!(a.session_spec(), b.session_spec());
    }

    #[test]
    fn test_concurrent_lookups_share_one_key() {
        let keyring = Keyring::with_params(Password::new("pw"), FAST).unwrap();
        let session = *keyring.session_spec();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| keyring.key_for(&session).unwrap());
            }
        });

        assert_eq!(keyring.derived_count(), 1);
    }

    #[test]
    fn test_pending_derivation_does_not_block_other_descriptors() {
        let keyring = Keyring::with_params(Password::new("pw"), FAST).unwrap();
        let session = *keyring.session_spec();
        let cached = keyring.key_for(&session).unwrap();

        // Hold the slot of a descriptor as a slow derivation would.
        let slow = KdfSpec::Argon2id { salt: [2; ARGON_SALT_LEN], params: FAST };
        let pending = keyring.slot(&slow);
        let guard = pending.lock().unwrap();

        assert!(Arc::ptr_eq(&cached, &keyring.key_for(&session).unwrap()));
        let other = KdfSpec::Argon2id { salt: [3; ARGON_SALT_LEN], params: FAST };
        assert!(keyring.key_for(&other).is_ok());

        drop(guard);
        assert_eq!(keyring.derived_count(), 2);
        keyring.key_for(&slow).unwrap();
        assert_eq!(keyring.derived_count(), 3);
    }

    #[test]
    fn test_failed_derivation_is_not_cached() {
        let keyring = Keyring::with_params(Password::new("pw"), FAST).unwrap();
        let invalid = KdfSpec::Argon2id { salt: [4; ARGON_SALT_LEN], params: Argon2Params { memory: 1, passes: 1, parallelism: 1 } };

        assert!(matches!(keyring.key_for(&invalid), Err(Error::KeyDerivation(_))));
        assert_eq!(keyring.derived_count(), 0);
    }
}
