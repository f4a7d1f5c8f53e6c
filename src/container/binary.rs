//! Fixed-size binary trailer.
//!
//! ```text
//! version(1) kdf(1) memory(4, BE) passes(1) lanes(1) salt(16) nonce(12) tag(16) marker(8)
//! ```
//!
//! The first 24 bytes plus the marker are authenticated as associated data.

use super::Trailer;
use crate::cipher::{Argon2Params, KdfSpec, Nonce, Tag};
use crate::config::{ARGON_MAX_MEMORY, ARGON_MAX_TIME, ARGON_SALT_LEN, BINARY_END_MARKER, KDF_ARGON2ID, NONCE_SIZE, TAG_SIZE, TRAILER_VERSION};
use crate::error::{Error, Result};

/// Bytes describing the key derivation.
pub const HEADER_LEN: usize = 8 + ARGON_SALT_LEN;

/// Total trailer length.
pub const TRAILER_LEN: usize = HEADER_LEN + NONCE_SIZE + TAG_SIZE + BINARY_END_MARKER.len();

const NONCE_OFFSET: usize = HEADER_LEN;
const TAG_OFFSET: usize = NONCE_OFFSET + NONCE_SIZE;
const MARKER_OFFSET: usize = TAG_OFFSET + TAG_SIZE;

/// Serializes the version, KDF id, Argon2 costs and salt.
pub fn header(salt: &[u8; ARGON_SALT_LEN], params: Argon2Params) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[0] = TRAILER_VERSION;
    out[1] = KDF_ARGON2ID;
    out[2..6].copy_from_slice(&params.memory.to_be_bytes());
    out[6] = params.passes;
    out[7] = params.parallelism;
    out[8..].copy_from_slice(salt);
    out
}

/// `header || marker`, the associated data bound into the tag.
pub fn associated_data(salt: &[u8; ARGON_SALT_LEN], params: Argon2Params) -> Vec<u8> {
    let mut aad = Vec::with_capacity(HEADER_LEN + BINARY_END_MARKER.len());
    aad.extend_from_slice(&header(salt, params));
    aad.extend_from_slice(BINARY_END_MARKER);
    aad
}

/// Builds the full 60-byte trailer.
pub fn encode(salt: &[u8; ARGON_SALT_LEN], params: Argon2Params, nonce: &Nonce, tag: &Tag) -> [u8; TRAILER_LEN] {
    let mut out = [0u8; TRAILER_LEN];
    out[..HEADER_LEN].copy_from_slice(&header(salt, params));
    out[NONCE_OFFSET..TAG_OFFSET].copy_from_slice(nonce);
    out[TAG_OFFSET..MARKER_OFFSET].copy_from_slice(tag);
    out[MARKER_OFFSET..].copy_from_slice(BINARY_END_MARKER);
    out
}

/// Returns true when `bytes` ends with a complete binary trailer candidate.
pub fn matches(bytes: &[u8]) -> bool {
    bytes.len() >= TRAILER_LEN && bytes.ends_with(BINARY_END_MARKER)
}

/// Parses the trailer at the end of `bytes`. Returns it with the ciphertext length.
pub fn decode(bytes: &[u8]) -> Result<(Trailer, usize)> {
    if !matches(bytes) {
        return Err(Error::TrailerNotFound);
    }

    let start = bytes.len() - TRAILER_LEN;
    let record = &bytes[start..];

    if record[0] != TRAILER_VERSION {
        return Err(Error::TrailerParse(format!("unsupported trailer version {}", record[0])));
    }
    if record[1] != KDF_ARGON2ID {
        return Err(Error::TrailerParse(format!("unknown key derivation id {}", record[1])));
    }

    let params = Argon2Params { memory: u32::from_be_bytes([record[2], record[3], record[4], record[5]]), passes: record[6], parallelism: record[7] };
    if params.memory > ARGON_MAX_MEMORY || params.passes == 0 || params.passes > ARGON_MAX_TIME || params.parallelism == 0 {
        return Err(Error::TrailerParse(format!("key derivation parameters out of range: {params:?}")));
    }

    let mut salt = [0u8; ARGON_SALT_LEN];
    salt.copy_from_slice(&record[8..HEADER_LEN]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&record[NONCE_OFFSET..TAG_OFFSET]);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&record[TAG_OFFSET..MARKER_OFFSET]);

    Ok((Trailer { kdf: KdfSpec::Argon2id { salt, params }, nonce, tag }, start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(TRAILER_LEN, 60);

        let params = Argon2Params { memory: 0x0001_0000, passes: 3, parallelism: 4 };
        let bytes = encode(&[0xAA; ARGON_SALT_LEN], params, &[0xBB; NONCE_SIZE], &[0xCC; TAG_SIZE]);

        assert_eq!(&bytes[..8], &[0x01, 0x01, 0x00, 0x01, 0x00, 0x00, 0x03, 0x04]);
        assert_eq!(&bytes[8..24], &[0xAA; 16]);
        assert_eq!(&bytes[24..36], &[0xBB; 12]);
        assert_eq!(&bytes[36..52], &[0xCC; 16]);
        assert_eq!(&bytes[52..], b"SEALDIR\x01");
    }

    #[test]
    fn test_rejects_unknown_version_and_kdf() {
        let params = Argon2Params::default();
        let mut bytes = encode(&[0; ARGON_SALT_LEN], params, &[0; NONCE_SIZE], &[0; TAG_SIZE]);
        bytes[0] = 2;
        assert!(matches!(decode(&bytes), Err(Error::TrailerParse(_))));

        bytes[0] = TRAILER_VERSION;
        bytes[1] = 9;
        assert!(matches!(decode(&bytes), Err(Error::TrailerParse(_))));
    }

    #[test]
    fn test_rejects_excessive_costs() {
        let params = Argon2Params { memory: ARGON_MAX_MEMORY + 1, passes: 1, parallelism: 1 };
        let bytes = encode(&[0; ARGON_SALT_LEN], params, &[0; NONCE_SIZE], &[0; TAG_SIZE]);
        assert!(matches!(decode(&bytes), Err(Error::TrailerParse(_))));

        let params = Argon2Params { memory: 1024, passes: 0, parallelism: 1 };
        let bytes = encode(&[0; ARGON_SALT_LEN], params, &[0; NONCE_SIZE], &[0; TAG_SIZE]);
        assert!(matches!(decode(&bytes), Err(Error::TrailerParse(_))));
    }

    #[test]
    fn test_short_input_does_not_match() {
        assert!(!matches(BINARY_END_MARKER));
        assert!(matches!(decode(b"SEALDIR\x01"), Err(Error::TrailerNotFound)));
    }
}
