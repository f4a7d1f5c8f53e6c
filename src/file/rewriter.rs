//! In-place file rewriting.
//!
//! A file is either fully replaced by its transformed content, with its
//! timestamps and permission bits carried over, or left exactly as it was.
//! The new content goes to a temporary file in the same directory, is synced
//! and checked, and is then renamed over the original.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;
use tracing::{debug, warn};

use super::attributes::Attributes;
use crate::cipher::{ChaCha20Poly1305, Keyring, generate_nonce};
use crate::config::{TEMP_PREFIX, TEMP_SUFFIX};
use crate::container::{self, Container, Trailer, TrailerFormat};
use crate::error::{Error, Result};
use crate::types::{FileReport, FileTask, ProcessorMode, Warning};

/// Rewrites files in place with the run's keyring.
pub struct Rewriter<'a> {
    keyring: &'a Keyring,
    format: TrailerFormat,
}

impl<'a> Rewriter<'a> {
    /// `format` only affects encryption; decryption follows each file's trailer.
    pub const fn new(keyring: &'a Keyring, format: TrailerFormat) -> Self {
        Self { keyring, format }
    }

    pub fn rewrite(&self, task: &FileTask) -> Result<FileReport> {
        let metadata = fs::symlink_metadata(&task.path).map_err(Error::IoRead)?;
        if !metadata.file_type().is_file() {
            return Err(Error::NotRegularFile);
        }
        let attributes = Attributes::capture(&metadata);

        let mut data = fs::read(&task.path).map_err(Error::IoRead)?;
        let bytes_in = data.len() as u64;

        match task.mode {
            ProcessorMode::Encrypt => self.encrypt(&mut data)?,
            ProcessorMode::Decrypt => self.decrypt(&mut data)?,
        }

        let warnings = Self::replace(&task.path, &data, &attributes)?;
        for warning in &warnings {
            warn!(path = %task.path.display(), "{warning}");
        }

        debug!(path = %task.path.display(), mode = task.mode.name(), bytes_in, bytes_out = data.len(), "rewrote file");
        Ok(FileReport { bytes_in, bytes_out: data.len() as u64, warnings })
    }

    fn encrypt(&self, data: &mut Vec<u8>) -> Result<()> {
        let kdf = self.format.kdf(self.keyring.session_spec());
        let key = self.keyring.key_for(&kdf)?;
        let nonce = generate_nonce()?;
        let aad = container::associated_data(&kdf);

        let tag = ChaCha20Poly1305::new(&key).seal_in_place(&nonce, &aad, data)?;
        data.extend_from_slice(&container::encode(&Trailer { kdf, nonce, tag })?);
        Ok(())
    }

    fn decrypt(&self, data: &mut Vec<u8>) -> Result<()> {
        let Container { trailer, ciphertext_len } = container::decode(data)?;
        let key = self.keyring.key_for(&trailer.kdf)?;
        let aad = container::associated_data(&trailer.kdf);

        ChaCha20Poly1305::new(&key).open_in_place(&trailer.nonce, &aad, &mut data[..ciphertext_len], &trailer.tag)?;
        data.truncate(ciphertext_len);
        Ok(())
    }

    /// Atomically replaces `path` with `data`. The temp file is removed on any error.
    fn replace(path: &Path, data: &[u8], attributes: &Attributes) -> Result<Vec<Warning>> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let mut temp = Builder::new().prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX).tempfile_in(dir).map_err(Error::IoWrite)?;

        temp.write_all(data).map_err(Error::IoWrite)?;
        temp.flush().map_err(Error::IoWrite)?;
        temp.as_file().sync_all().map_err(Error::IoWrite)?;

        let written = temp.as_file().metadata().map_err(Error::IoWrite)?.len();
        if written != data.len() as u64 {
            return Err(Error::IoWrite(io::Error::other(format!("short write: {written} of {} bytes", data.len()))));
        }

        let warnings = attributes.apply(temp.as_file()).into_iter().collect();
        temp.persist(path).map_err(|e| Error::IoWrite(e.error))?;
        Ok(warnings)
    }
}
