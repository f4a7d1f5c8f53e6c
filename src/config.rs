//! Global Configuration Constants
//!
//! Every size, marker and tuning knob used by sealdir lives here. The
//! cryptographic sizes are fixed by the ChaCha20-Poly1305 construction; the
//! container markers define the on-disk format and must never change for a
//! given format version.

/// Application name used in user interfaces and log headers.
pub const APP_NAME: &str = "sealdir";

// === Cipher Sizes ===

/// Size of a symmetric key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a ChaCha20 nonce in bytes (IETF variant, 96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of a Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Size of one ChaCha20 keystream block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Size of one Poly1305 input chunk in bytes.
pub const POLY1305_CHUNK_SIZE: usize = 16;

/// Keystream counter of the first data block.
///
/// Block 0 of every (key, nonce) pair is consumed by the Poly1305 one-time key.
pub const FIRST_DATA_COUNTER: u32 = 1;

// === Argon2 Key Derivation Parameters ===
// These are the defaults written into new containers. Decryption always uses
// the parameters recorded in the container trailer.

/// Argon2 memory cost in KiB (64 MiB).
pub const ARGON_MEMORY: u32 = 64 * 1024;

/// Argon2 time cost (number of passes over memory).
pub const ARGON_TIME: u8 = 3;

/// Argon2 parallelism (number of lanes).
pub const ARGON_THREADS: u8 = 4;

/// Length of the random salt generated once per encryption run.
pub const ARGON_SALT_LEN: usize = 16;

/// Upper bound accepted for the memory cost read from a trailer (1 GiB).
///
/// A forged trailer must not be able to make decryption allocate without limit.
pub const ARGON_MAX_MEMORY: u32 = 1024 * 1024;

/// Upper bound accepted for the time cost read from a trailer.
pub const ARGON_MAX_TIME: u8 = 16;

// === Legacy Key Derivation ===
// Containers with the JSON trailer derive their key with
// PBKDF2-HMAC-SHA256 over a fixed salt. Only legacy containers use this.

/// Fixed salt of the legacy key derivation.
pub const LEGACY_SALT: &[u8] = b"ChaCha20Poly1305Salt";

/// Iteration count of the legacy key derivation.
pub const LEGACY_PBKDF2_ITERATIONS: u32 = 100_000;

// === Container Format ===

/// Current binary trailer version.
pub const TRAILER_VERSION: u8 = 0x01;

/// KDF identifier for Argon2id in the binary trailer.
pub const KDF_ARGON2ID: u8 = 0x01;

/// End-marker closing every binary trailer.
pub const BINARY_END_MARKER: &[u8; 8] = b"SEALDIR\x01";

/// End-marker closing every legacy (JSON) trailer.
pub const LEGACY_END_MARKER: &[u8] = b"###END###";

/// How far before the legacy end-marker the decoder searches for the record.
pub const LEGACY_SCAN_WINDOW: usize = 1024;

// === Worker Pool ===

/// Hard ceiling for the worker pool size.
pub const MAX_WORKERS: usize = 64;

/// Ceiling for the automatically chosen pool size.
pub const DEFAULT_WORKERS_CAP: usize = 32;

/// Default pool size multiplier over the available hardware threads.
pub const DEFAULT_WORKERS_PER_CPU: usize = 2;

// === Filesystem ===

/// Prefix of the temporary file written next to the file being rewritten.
pub const TEMP_PREFIX: &str = ".sealdir-";

/// Suffix of the temporary file written next to the file being rewritten.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Environment variable consulted for the password when none is given.
pub const PASSWORD_ENV: &str = "SEALDIR_PASSWORD";
