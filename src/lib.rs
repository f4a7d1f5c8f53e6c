//! sealdir - in-place authenticated encryption of directory trees.
//!
//! The cryptographic core is a self-contained ChaCha20-Poly1305 AEAD
//! ([`cipher`]) with a self-describing trailer ([`container`]). Files are
//! rewritten atomically with their timestamps and permission bits preserved
//! ([`file`]), many at a time on a bounded worker pool ([`worker`]).

pub mod app;
pub mod cipher;
pub mod config;
pub mod container;
pub mod error;
pub mod file;
pub mod report;
pub mod secret;
pub mod types;
pub mod ui;
pub mod worker;

pub use error::{Error, Result};
