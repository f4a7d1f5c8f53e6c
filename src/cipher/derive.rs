//! # Password Key Derivation
//!
//! Turns a password into a 32-byte key. New containers use Argon2id with a
//! random per-run salt and record the salt and cost parameters in their
//! trailer. Legacy containers use PBKDF2-HMAC-SHA256 over a fixed salt.

use argon2::Algorithm::Argon2id;
use argon2::Version::V0x13;
use argon2::{Argon2, Params};
use pbkdf2::pbkdf2_hmac;
use rand::rand_core::{OsRng, TryRngCore};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::config::{ARGON_MEMORY, ARGON_SALT_LEN, ARGON_THREADS, ARGON_TIME, KEY_SIZE, LEGACY_PBKDF2_ITERATIONS, LEGACY_SALT};
use crate::error::{Error, Result};
use crate::secret::{Password, SecretKey};

/// Argon2id cost parameters as stored in a binary trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argon2Params {
    /// Memory cost in KiB.
    pub memory: u32,
    pub passes: u8,
    pub parallelism: u8,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self { memory: ARGON_MEMORY, passes: ARGON_TIME, parallelism: ARGON_THREADS }
    }
}

/// Everything besides the password needed to re-derive a container's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KdfSpec {
    Argon2id { salt: [u8; ARGON_SALT_LEN], params: Argon2Params },
    /// Fixed-salt PBKDF2 used by legacy containers.
    Pbkdf2Legacy,
}

impl KdfSpec {
    /// A fresh Argon2id descriptor with a random salt.
    pub fn generate(params: Argon2Params) -> Result<Self> {
        Ok(Self::Argon2id { salt: Derive::generate_salt()?, params })
    }
}

/// Password-based key derivation.
pub struct Derive {
    password: Password,
}

impl Derive {
    /// Wraps a password for repeated derivation. Empty passwords are rejected.
    pub fn new(password: Password) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::EmptyPassword);
        }
        Ok(Self { password })
    }

    /// Derives the key described by `spec`.
    pub fn derive(&self, spec: &KdfSpec) -> Result<SecretKey> {
        match spec {
            KdfSpec::Argon2id { salt, params } => self.argon2id(salt, *params),
            KdfSpec::Pbkdf2Legacy => Ok(self.pbkdf2(LEGACY_SALT, LEGACY_PBKDF2_ITERATIONS)),
        }
    }

    fn argon2id(&self, salt: &[u8], params: Argon2Params) -> Result<SecretKey> {
        let params = Params::new(params.memory, u32::from(params.passes), u32::from(params.parallelism), Some(KEY_SIZE))
            .map_err(|e| Error::KeyDerivation(format!("invalid argon2 parameter: {e}")))?;
        let argon2 = Argon2::new(Argon2id, V0x13, params);

        let mut key = [0u8; KEY_SIZE];
        argon2.hash_password_into(self.password.expose_secret().as_bytes(), salt, &mut key).map_err(|e| Error::KeyDerivation(e.to_string()))?;

        Ok(SecretKey::new(key))
    }

    fn pbkdf2(&self, salt: &[u8], iterations: u32) -> SecretKey {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(self.password.expose_secret().as_bytes(), salt, iterations, &mut key);

        let secret = SecretKey::new(key);
        key.zeroize();
        secret
    }

    /// Fills an `N`-byte array from the OS random number generator.
    pub fn generate_salt<const N: usize>() -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| Error::Rng(e.to_string()))?;
        Ok(bytes)
    }
}
