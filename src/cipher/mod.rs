//! # Cryptographic Core
//!
//! A self-contained ChaCha20-Poly1305 AEAD built from its primitives, plus
//! password key derivation.
//!
//! - [`chacha`]: the ChaCha20 block function and keystream XOR
//! - [`poly1305`]: the one-time authenticator
//! - [`ChaCha20Poly1305`]: `seal`/`open` composing the two
//! - [`Derive`] and [`Keyring`]: password to key, cached per run

pub mod aead;
pub mod chacha;
pub mod derive;
pub mod keyring;
pub mod poly1305;

pub use aead::{ChaCha20Poly1305, Nonce, generate_nonce, nonce_from_slice};
pub use derive::{Argon2Params, Derive, KdfSpec};
pub use keyring::Keyring;
pub use poly1305::Tag;
