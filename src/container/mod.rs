//! # Container Codec
//!
//! An encrypted file is `ciphertext || trailer`. The trailer carries the
//! nonce, the tag and what is needed to re-derive the key, and ends with a
//! fixed marker so it can be found from the end of the file.
//!
//! Two formats exist. [`binary`] is fixed-size and authenticated as AAD; it is
//! what new files get. [`legacy`] is the marker-terminated JSON record of the
//! earlier tool and is still decoded, and written on request.

pub mod binary;
pub mod legacy;

use crate::cipher::{KdfSpec, Nonce, Tag};
use crate::error::Result;

/// Which trailer encoding to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailerFormat {
    #[default]
    Binary,
    Legacy,
}

/// Decoded trailer contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trailer {
    pub kdf: KdfSpec,
    pub nonce: Nonce,
    pub tag: Tag,
}

/// A located container: its trailer and where the ciphertext ends.
#[derive(Debug)]
pub struct Container {
    pub trailer: Trailer,
    pub ciphertext_len: usize,
}

impl TrailerFormat {
    /// The key-derivation descriptor files of this format are written with.
    pub const fn kdf(self, session: &KdfSpec) -> KdfSpec {
        match self {
            Self::Binary => *session,
            Self::Legacy => KdfSpec::Pbkdf2Legacy,
        }
    }
}

/// Associated data authenticated alongside the ciphertext.
///
/// Binary trailers bind their header and marker; legacy trailers bind nothing.
pub fn associated_data(kdf: &KdfSpec) -> Vec<u8> {
    match kdf {
        KdfSpec::Argon2id { salt, params } => binary::associated_data(salt, *params),
        KdfSpec::Pbkdf2Legacy => Vec::new(),
    }
}

/// Serializes a trailer. The format follows from the key-derivation scheme.
pub fn encode(trailer: &Trailer) -> Result<Vec<u8>> {
    match &trailer.kdf {
        KdfSpec::Argon2id { salt, params } => Ok(binary::encode(salt, *params, &trailer.nonce, &trailer.tag).to_vec()),
        KdfSpec::Pbkdf2Legacy => legacy::encode(&trailer.nonce, &trailer.tag),
    }
}

/// Locates and parses the trailer at the end of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Container> {
    let (trailer, ciphertext_len) = if binary::matches(bytes) { binary::decode(bytes)? } else { legacy::decode(bytes)? };
    Ok(Container { trailer, ciphertext_len })
}
