//! ChaCha20-Poly1305 AEAD (RFC 8439 §2.8).
//!
//! The Poly1305 one-time key is the first half of keystream block 0; data
//! uses blocks 1 onward. The tag covers
//! `pad16(aad) || pad16(ciphertext) || len(aad) || len(ciphertext)` with both
//! lengths as little-endian u64.

use rand::rand_core::{OsRng, TryRngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::chacha;
use super::poly1305::{Poly1305, Tag};
use crate::config::{FIRST_DATA_COUNTER, KEY_SIZE, NONCE_SIZE};
use crate::error::{Error, Result};
use crate::secret::SecretKey;

/// 12-byte IETF nonce.
pub type Nonce = [u8; NONCE_SIZE];

/// Authenticated cipher bound to one key. Holds a borrow, never a copy.
pub struct ChaCha20Poly1305<'k> {
    key: &'k [u8; KEY_SIZE],
}

impl<'k> ChaCha20Poly1305<'k> {
    pub fn new(key: &'k SecretKey) -> Self {
        Self { key: key.expose_secret() }
    }

    /// Binds raw key bytes, checking the length.
    pub fn from_slice(key: &'k [u8]) -> Result<Self> {
        let key: &[u8; KEY_SIZE] = key.try_into().map_err(|_| Error::InvalidKeyLength { expected: KEY_SIZE, got: key.len() })?;
        Ok(Self { key })
    }

    /// Encrypts `plaintext`, returning the ciphertext and its tag.
    pub fn seal(&self, nonce: &Nonce, aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Tag)> {
        let mut buffer = plaintext.to_vec();
        let tag = self.seal_in_place(nonce, aad, &mut buffer)?;
        Ok((buffer, tag))
    }

    /// Encrypts `buffer` in place and returns the tag.
    pub fn seal_in_place(&self, nonce: &Nonce, aad: &[u8], buffer: &mut [u8]) -> Result<Tag> {
        chacha::apply_keystream(self.key, nonce, FIRST_DATA_COUNTER, buffer)?;
        Ok(self.compute_tag(nonce, aad, buffer))
    }

    /// Verifies `tag` and returns the plaintext. No bytes are produced on failure.
    pub fn open(&self, nonce: &Nonce, aad: &[u8], ciphertext: &[u8], tag: &Tag) -> Result<Vec<u8>> {
        let mut buffer = ciphertext.to_vec();
        self.open_in_place(nonce, aad, &mut buffer, tag)?;
        Ok(buffer)
    }

    /// Verifies `tag`, then decrypts `buffer` in place.
    ///
    /// The buffer is left untouched when verification fails.
    pub fn open_in_place(&self, nonce: &Nonce, aad: &[u8], buffer: &mut [u8], tag: &Tag) -> Result<()> {
        let expected = self.compute_tag(nonce, aad, buffer);
        if !bool::from(expected.ct_eq(tag)) {
            return Err(Error::AuthenticationFailure);
        }
        chacha::apply_keystream(self.key, nonce, FIRST_DATA_COUNTER, buffer)
    }

    fn one_time_key(&self, nonce: &Nonce) -> Zeroizing<[u8; KEY_SIZE]> {
        let block = Zeroizing::new(chacha::block(self.key, 0, nonce));
        let mut otk = Zeroizing::new([0u8; KEY_SIZE]);
        otk.copy_from_slice(&block[..KEY_SIZE]);
        otk
    }

    fn compute_tag(&self, nonce: &Nonce, aad: &[u8], ciphertext: &[u8]) -> Tag {
        let otk = self.one_time_key(nonce);
        let mut poly = Poly1305::new(&otk);

        poly.update(aad);
        poly.pad_to_chunk();
        poly.update(ciphertext);
        poly.pad_to_chunk();
        poly.update(&(aad.len() as u64).to_le_bytes());
        poly.update(&(ciphertext.len() as u64).to_le_bytes());

        poly.finalize()
    }
}

/// A fresh random nonce from the OS generator.
pub fn generate_nonce() -> Result<Nonce> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.try_fill_bytes(&mut nonce).map_err(|e| Error::Rng(e.to_string()))?;
    Ok(nonce)
}

pub fn nonce_from_slice(bytes: &[u8]) -> Result<Nonce> {
    bytes.try_into().map_err(|_| Error::InvalidNonceLength { expected: NONCE_SIZE, got: bytes.len() })
}
